use std::io::{self, Write};

use opioid_db::{CompoundProfile, PropertyMap};

use super::{
    content::{self, Link},
    text::wrap,
};
use crate::cli::Tab;

const WIDTH: usize = 78;

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))
}

fn subheading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

fn paragraph(out: &mut impl Write, text: &str) -> io::Result<()> {
    for line in wrap(text, WIDTH) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// A list item with a hanging indent under `marker`.
fn item(out: &mut impl Write, marker: &str, text: &str) -> io::Result<()> {
    let pad = " ".repeat(marker.chars().count() + 3);
    let lines = wrap(text, WIDTH - pad.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            writeln!(out, "  {marker} {line}")?;
        } else {
            writeln!(out, "{pad}{line}")?;
        }
    }
    Ok(())
}

fn bullets<S: AsRef<str>>(out: &mut impl Write, items: &[S]) -> io::Result<()> {
    for v in items {
        item(out, "-", v.as_ref())?;
    }
    Ok(())
}

fn numbered(out: &mut impl Write, items: &[&str]) -> io::Result<()> {
    for (i, v) in items.iter().enumerate() {
        item(out, &format!("{}.", i + 1), v)?;
    }
    Ok(())
}

fn links(out: &mut impl Write, links: &[Link]) -> io::Result<()> {
    for link in links {
        item(out, "-", &format!("{}: {}", link.title, link.url))?;
    }
    Ok(())
}

fn key_values(out: &mut impl Write, rows: &[(&str, String)]) -> io::Result<()> {
    let key_w = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (k, v) in rows {
        writeln!(out, "  {k:<key_w$}  {v}")?;
    }
    Ok(())
}

pub fn print_home(out: &mut impl Write, names: &[&str]) -> io::Result<()> {
    heading(out, content::TITLE)?;

    subheading(out, "Understanding Opioid Drugs")?;
    writeln!(out, "Opioids are a class of drugs that include:")?;
    bullets(out, content::OPIOID_CLASSES)?;

    subheading(out, "Medical Uses")?;
    bullets(out, content::MEDICAL_USES)?;

    subheading(out, "Risks and Concerns")?;
    bullets(out, content::RISKS)?;

    writeln!(out)?;
    paragraph(out, content::CALL_TO_ACTION)?;
    writeln!(out)?;
    paragraph(out, &format!("IMPORTANT: {}", content::DISCLAIMER))?;

    subheading(out, "Compounds")?;
    bullets(out, names)?;
    writeln!(out)?;
    writeln!(out, "Run `opioid-db show <NAME>` to view a compound's profile.")
}

pub fn print_detail(out: &mut impl Write, profile: &CompoundProfile, tab: Tab) -> io::Result<()> {
    let rec = &profile.record;
    heading(out, &format!("{} - Opioid Drug Profile", rec.name))?;
    writeln!(out, "Category: {}", rec.category)?;

    match tab {
        Tab::All => {
            overview(out, profile)?;
            structure(out, profile)?;
            pharmacology(out, profile)?;
            safety(out, profile)?;
            references(out, profile)
        }
        Tab::Overview => overview(out, profile),
        Tab::Structure => structure(out, profile),
        Tab::Pharmacology => pharmacology(out, profile),
        Tab::Safety => safety(out, profile),
        Tab::References => references(out, profile),
    }
}

fn overview(out: &mut impl Write, profile: &CompoundProfile) -> io::Result<()> {
    let rec = &profile.record;
    heading(out, "Overview")?;

    subheading(out, "Molecular Properties")?;
    key_values(
        out,
        &[
            ("IUPAC Name", rec.iupac_name.clone()),
            ("Molecular Formula", rec.molecular_formula.clone()),
            ("Molecular Weight", format!("{} g/mol", rec.molecular_weight)),
        ],
    )?;

    match &profile.image_png {
        Some(png) => writeln!(
            out,
            "\n2D structure: PNG available ({} bytes); `opioid-db render {}` saves it.",
            png.len(),
            rec.name
        )?,
        None => writeln!(out, "\nStructure image not available.")?,
    }

    subheading(out, "External References")?;
    writeln!(out, "PubChem Entry: {}", profile.pubchem_url)?;

    subheading(out, "Medical Uses")?;
    bullets(out, &rec.therapeutic_uses)?;

    subheading(out, "Precautions")?;
    for p in &rec.precautions {
        item(out, "!", p)?;
    }
    Ok(())
}

fn structure(out: &mut impl Write, profile: &CompoundProfile) -> io::Result<()> {
    let rec = &profile.record;
    heading(out, "Chemical Structure Information")?;

    subheading(out, "SMILES Notation")?;
    writeln!(out, "    {}", rec.structure_encoding)?;

    if let Some(formula) = &profile.computed_formula {
        writeln!(out)?;
        if *formula == rec.molecular_formula {
            writeln!(out, "Formula from structure: {formula}")?;
        } else {
            writeln!(
                out,
                "Formula from structure: {formula} (declared: {})",
                rec.molecular_formula
            )?;
        }
    }

    subheading(out, "Physicochemical Properties")?;
    property_rows(out, &profile.properties)?;

    subheading(out, "3D Molecular Structure")?;
    writeln!(out, "For full 3D visualization, visit the PubChem entry:")?;
    writeln!(out, "  {}", profile.pubchem_url)?;
    writeln!(out, "PubChem CID: {}", rec.external_database_id)?;
    writeln!(
        out,
        "Run `opioid-db sdf {}` to download the 3D structure (SDF).",
        rec.name
    )
}

fn pharmacology(out: &mut impl Write, profile: &CompoundProfile) -> io::Result<()> {
    heading(out, "Pharmacology and Clinical Use")?;

    subheading(out, "Therapeutic Uses")?;
    bullets(out, &profile.record.therapeutic_uses)?;

    subheading(out, "Mechanism of Action")?;
    paragraph(out, content::MECHANISM_INTRO)?;
    bullets(out, content::RECEPTORS)?;
    writeln!(out, "This binding:")?;
    bullets(out, content::BINDING_EFFECTS)?;

    subheading(out, "Pharmacokinetics")?;
    writeln!(out, "Typical pharmacokinetic properties:")?;
    for (k, v) in content::PHARMACOKINETICS {
        item(out, "-", &format!("{k}: {v}"))?;
    }
    writeln!(out, "Note: {}", content::PHARMACOKINETICS_NOTE)?;

    subheading(out, "Dosage Information")?;
    paragraph(out, content::DOSAGE_WARNING)?;
    bullets(out, content::DOSAGE_FACTORS)
}

fn safety(out: &mut impl Write, profile: &CompoundProfile) -> io::Result<()> {
    let rec = &profile.record;
    heading(out, "Safety and Toxicity Profile")?;

    subheading(out, "Toxicity Information")?;
    paragraph(out, &format!("Toxicity Level: {}", rec.toxicity_summary))?;

    subheading(out, "Overdose Symptoms")?;
    bullets(out, &rec.overdose_symptoms)?;

    subheading(out, "Management of Overdose")?;
    numbered(out, content::OVERDOSE_MANAGEMENT)?;

    subheading(out, "Side Effects")?;
    writeln!(out, "Common side effects include:")?;
    bullets(out, &rec.side_effects)?;

    subheading(out, "Contraindications")?;
    bullets(out, content::CONTRAINDICATIONS)?;

    subheading(out, "Drug Interactions")?;
    for (k, v) in content::INTERACTIONS {
        item(out, "-", &format!("{k}: {v}"))?;
    }
    Ok(())
}

fn references(out: &mut impl Write, profile: &CompoundProfile) -> io::Result<()> {
    let rec = &profile.record;
    heading(out, "References and Further Reading")?;

    subheading(out, "Primary Reference")?;
    item(
        out,
        "-",
        &format!(
            "PubChem Entry: {} (CID: {}): {}",
            rec.name, rec.external_database_id, profile.pubchem_url
        ),
    )?;

    subheading(out, "Clinical Guidelines")?;
    links(out, content::CLINICAL_GUIDELINES)?;

    subheading(out, "Scientific Literature")?;
    links(out, content::LITERATURE)?;

    subheading(out, "Additional Resources")?;
    links(out, content::RESOURCES)
}

fn property_rows(out: &mut impl Write, props: &PropertyMap) -> io::Result<()> {
    if props.is_empty() {
        return writeln!(out, "Properties not available: the structure could not be parsed.");
    }
    let rows: Vec<(&str, String)> = props
        .iter()
        .map(|(p, v)| (p.label(), v.to_owned()))
        .collect();
    key_values(out, &rows)
}

pub fn print_properties(out: &mut impl Write, title: &str, props: &PropertyMap) -> io::Result<()> {
    subheading(out, &format!("Physicochemical Properties: {title}"))?;
    property_rows(out, props)
}

pub fn print_sdf_status(out: &mut impl Write, name: &str, sdf: Option<&[u8]>) -> io::Result<()> {
    subheading(out, "3D Structure (SDF)")?;
    match sdf {
        Some(data) => writeln!(
            out,
            "Fetched {} bytes from PubChem. `opioid-db sdf {name}` saves it as {name}_3d_structure.sdf.",
            data.len()
        ),
        None => writeln!(out, "3D structure data not available for download."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opioid_db::Registry;

    fn render(tab: Tab) -> String {
        let reg = Registry::builtin().unwrap();
        let profile = CompoundProfile::build(reg.find_by_name("Morphine").unwrap(), (80, 60));
        let mut buf = Vec::new();
        print_detail(&mut buf, &profile, tab).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn home_lists_names_and_disclaimer() {
        let mut buf = Vec::new();
        print_home(&mut buf, &["Codeine", "Fentanyl"]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("  - Codeine\n  - Fentanyl\n"));
        assert!(text.contains("educational purposes only"));
    }

    #[test]
    fn single_tab_only() {
        let text = render(Tab::Safety);
        assert!(text.contains("Morphine - Opioid Drug Profile"));
        assert!(text.contains("Administer naloxone"));
        assert!(!text.contains("SMILES Notation"));
    }

    #[test]
    fn structure_tab_shows_properties() {
        let text = render(Tab::Structure);
        assert!(text.contains("Polar Surface Area"));
        assert!(text.contains("52.93 Å²"));
        assert!(text.contains("Formula from structure: C17H19NO3\n"));
    }

    #[test]
    fn all_tabs() {
        let text = render(Tab::All);
        for title in [
            "Overview",
            "Chemical Structure Information",
            "Pharmacology and Clinical Use",
            "Safety and Toxicity Profile",
            "References and Further Reading",
        ] {
            assert!(text.contains(title), "missing {title}");
        }
    }

    #[test]
    fn empty_properties_are_informational() {
        let mut buf = Vec::new();
        print_properties(&mut buf, "junk", &PropertyMap::default()).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("not available"));
    }

    #[test]
    fn missing_sdf() {
        let mut buf = Vec::new();
        print_sdf_status(&mut buf, "Morphine", None).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("not available"));
    }
}
