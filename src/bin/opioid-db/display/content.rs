//! Fixed page text. The same for every compound.

pub struct Link {
    pub title: &'static str,
    pub url: &'static str,
}

pub const TITLE: &str = "Opioid Drugs Database";

pub const OPIOID_CLASSES: &[&str] = &[
    "Natural opioid analgesics (e.g., morphine, codeine)",
    "Semi-synthetic opioids (e.g., oxycodone, hydrocodone)",
    "Fully synthetic opioids (e.g., fentanyl, methadone)",
];

pub const MEDICAL_USES: &[&str] = &[
    "Management of acute and chronic pain",
    "Anesthesia adjuncts",
    "Cough suppression",
    "Treatment of opioid use disorder",
];

pub const RISKS: &[&str] = &[
    "High potential for addiction and dependence",
    "Respiratory depression (can be fatal)",
    "Increasing rates of overdose deaths",
    "Diversion and misuse",
];

pub const CALL_TO_ACTION: &str =
    "Use this database to access scientific information about opioid medications.";

pub const DISCLAIMER: &str = "This information is for educational purposes only. \
                              Never use prescription medications without medical supervision.";

pub const MECHANISM_INTRO: &str =
    "Opioids work by binding to specific receptors in the brain and spinal cord:";

pub const RECEPTORS: &[&str] = &[
    "μ-opioid receptors (MOR) - primary analgesic effect",
    "δ-opioid receptors (DOR)",
    "κ-opioid receptors (KOR)",
];

pub const BINDING_EFFECTS: &[&str] = &[
    "Inhibits neurotransmitter release",
    "Hyperpolarizes neurons",
    "Modulates pain transmission",
];

pub const PHARMACOKINETICS: &[(&str, &str)] = &[
    ("Onset of action", "5-30 minutes (IV) to 30-90 minutes (oral)"),
    ("Duration of effect", "3-6 hours for most opioids"),
    ("Metabolism", "Primarily hepatic (CYP450 system)"),
    ("Excretion", "Renal"),
];

pub const PHARMACOKINETICS_NOTE: &str =
    "Actual parameters vary significantly between specific opioids.";

pub const DOSAGE_WARNING: &str =
    "Dosage must be determined by a qualified medical professional based on:";

pub const DOSAGE_FACTORS: &[&str] = &[
    "Patient's pain level",
    "Previous opioid exposure",
    "Medical condition",
    "Other medications",
    "Risk factors for respiratory depression",
];

pub const OVERDOSE_MANAGEMENT: &[&str] = &[
    "Call emergency services immediately",
    "Administer naloxone if available",
    "Provide respiratory support",
    "Monitor vital signs continuously",
];

pub const CONTRAINDICATIONS: &[&str] = &[
    "Significant respiratory depression",
    "Acute or severe bronchial asthma",
    "Known or suspected gastrointestinal obstruction",
    "Hypersensitivity to specific opioid",
];

pub const INTERACTIONS: &[(&str, &str)] = &[
    ("CNS depressants", "Alcohol, benzodiazepines (increased sedation)"),
    ("MAO inhibitors", "Risk of serotonin syndrome"),
    ("Anticholinergics", "Increased risk of constipation"),
];

pub const CLINICAL_GUIDELINES: &[Link] = &[
    Link {
        title: "CDC Guideline for Prescribing Opioids for Chronic Pain",
        url: "https://www.cdc.gov/opioids/providers/prescribing/guideline.html",
    },
    Link {
        title: "WHO Guidelines for the Pharmacological Treatment of Persisting Pain in Children",
        url: "https://www.who.int/publications/i/item/9789241548120",
    },
    Link {
        title: "ASAM National Practice Guideline for the Treatment of Opioid Use Disorder",
        url: "https://www.asam.org/quality-care/clinical-guidelines/national-practice-guideline",
    },
];

pub const LITERATURE: &[Link] = &[
    Link {
        title: "Opioid Pharmacology Review - Nature Reviews Drug Discovery",
        url: "https://www.nature.com/articles/nrd3438",
    },
    Link {
        title: "Opioid Overdose Crisis - New England Journal of Medicine",
        url: "https://www.nejm.org/doi/full/10.1056/nejmra1508491",
    },
    Link {
        title: "Molecular Mechanisms of Opioid Action - Pharmacological Reviews",
        url: "https://pharmrev.aspetjournals.org/content/73/4/1638",
    },
];

pub const RESOURCES: &[Link] = &[
    Link {
        title: "National Institute on Drug Abuse (NIDA) - Opioids",
        url: "https://www.drugabuse.gov/drug-topics/opioids",
    },
    Link {
        title: "SAMHSA Opioid Overdose Prevention Toolkit",
        url: "https://store.samhsa.gov/product/Opioid-Overdose-Prevention-Toolkit/SMA18-4742",
    },
    Link {
        title: "FDA Opioid Medications Information",
        url: "https://www.fda.gov/drugs/information-drug-class/opioid-medications",
    },
];
