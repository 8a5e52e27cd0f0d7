//! The compound record: the only domain entity served by this crate.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Pharmacological classification. The label set is open; unknown labels are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Natural,
    SemiSynthetic,
    Synthetic,
    Other(String),
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Self::Natural => "Natural Opioid",
            Self::SemiSynthetic => "Semi-Synthetic Opioid",
            Self::Synthetic => "Synthetic Opioid",
            Self::Other(v) => v,
        }
    }
}

impl From<String> for Category {
    fn from(v: String) -> Self {
        match v.as_str() {
            "Natural Opioid" => Self::Natural,
            "Semi-Synthetic Opioid" => Self::SemiSynthetic,
            "Synthetic Opioid" => Self::Synthetic,
            _ => Self::Other(v),
        }
    }
}

impl From<Category> for String {
    fn from(v: Category) -> Self {
        v.label().to_owned()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reference data for one compound. Every field is required when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompoundRecord {
    /// Unique, case-sensitive lookup key.
    pub name: String,
    pub iupac_name: String,
    /// SMILES.
    pub structure_encoding: String,
    pub molecular_formula: String,
    /// Declared value in g/mol. Not reconciled with the computed descriptor.
    pub molecular_weight: f64,
    pub category: Category,
    pub therapeutic_uses: Vec<String>,
    pub overdose_symptoms: Vec<String>,
    pub side_effects: Vec<String>,
    pub precautions: Vec<String>,
    pub toxicity_summary: String,
    /// PubChem CID.
    pub external_database_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for label in ["Natural Opioid", "Semi-Synthetic Opioid", "Synthetic Opioid"] {
            let cat = Category::from(label.to_owned());
            assert!(!matches!(cat, Category::Other(_)));
            assert_eq!(cat.label(), label);
        }
    }

    #[test]
    fn unknown_category_is_kept() {
        let cat = Category::from("Opioid Antagonist".to_owned());
        assert_eq!(cat, Category::Other("Opioid Antagonist".to_owned()));
        assert_eq!(cat.to_string(), "Opioid Antagonist");
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{
            "name": "Test",
            "iupac_name": "x",
            "structure_encoding": "C",
            "molecular_formula": "CH4",
            "molecular_weight": 16.04,
            "category": "Other",
            "therapeutic_uses": [],
            "overdose_symptoms": [],
            "side_effects": [],
            "precautions": [],
            "toxicity_summary": "none"
        }"#;

        let err = serde_json::from_str::<CompoundRecord>(json).unwrap_err();
        assert!(err.to_string().contains("external_database_id"), "{err}");
    }
}
