//! The compound registry: an immutable, ordered list of records seeded once at startup.

use std::collections::HashSet;

use thiserror::Error;

use crate::compound::CompoundRecord;

const BUILTIN_DATA: &str = include_str!("../data/compounds.json");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to parse compound data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("compound '{name}' has an empty '{field}' field")]
    EmptyField { name: String, field: &'static str },

    #[error("duplicate compound name '{0}'")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no compound named '{0}'")]
pub struct NotFound(pub String);

#[derive(Debug)]
pub struct Registry {
    records: Vec<CompoundRecord>,
}

impl Registry {
    /// The six compounds shipped with the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_json(BUILTIN_DATA)
    }

    /// Build a registry from a JSON array of records. Records keep their source order.
    pub fn from_json(data: &str) -> Result<Self, RegistryError> {
        let records: Vec<CompoundRecord> = serde_json::from_str(data)?;

        let mut seen = HashSet::new();
        for rec in &records {
            check_non_empty(rec, "name", &rec.name)?;
            check_non_empty(rec, "structure_encoding", &rec.structure_encoding)?;
            check_non_empty(rec, "external_database_id", &rec.external_database_id)?;

            if !seen.insert(rec.name.as_str()) {
                return Err(RegistryError::DuplicateName(rec.name.clone()));
            }
        }

        Ok(Self { records })
    }

    /// Case-exact lookup. The set is small and fixed, so this is a linear scan.
    pub fn find_by_name(&self, name: &str) -> Result<&CompoundRecord, NotFound> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| NotFound(name.to_owned()))
    }

    /// Compound names, sorted ascending for display.
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.records.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn records(&self) -> &[CompoundRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn check_non_empty(
    rec: &CompoundRecord,
    field: &'static str,
    value: &str,
) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::EmptyField {
            name: rec.name.clone(),
            field,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(name: &str, smiles: &str) -> String {
        format!(
            r#"{{
                "name": "{name}",
                "iupac_name": "x",
                "structure_encoding": "{smiles}",
                "molecular_formula": "x",
                "molecular_weight": 1.0,
                "category": "Synthetic Opioid",
                "therapeutic_uses": [],
                "overdose_symptoms": [],
                "side_effects": [],
                "precautions": [],
                "toxicity_summary": "x",
                "external_database_id": "1"
            }}"#
        )
    }

    #[test]
    fn builtin_has_six_sorted_names() {
        let reg = Registry::builtin().unwrap();
        assert_eq!(reg.len(), 6);
        assert_eq!(
            reg.list_names(),
            vec![
                "Codeine",
                "Fentanyl",
                "Hydrocodone",
                "Methadone",
                "Morphine",
                "Oxycodone"
            ]
        );
    }

    #[test]
    fn builtin_keeps_source_order() {
        let reg = Registry::builtin().unwrap();
        assert_eq!(reg.records()[0].name, "Morphine");
        assert_eq!(reg.records()[5].name, "Methadone");
    }

    #[test]
    fn find_fentanyl() {
        let reg = Registry::builtin().unwrap();
        let rec = reg.find_by_name("Fentanyl").unwrap();
        assert_eq!(rec.external_database_id, "3345");
        assert_eq!(rec.molecular_formula, "C22H28N2O");
    }

    #[test]
    fn lookup_is_case_exact() {
        let reg = Registry::builtin().unwrap();
        assert_eq!(
            reg.find_by_name("fentanyl"),
            Err(NotFound("fentanyl".to_owned()))
        );
        assert!(reg.find_by_name("Heroin").is_err());
        assert!(reg.find_by_name("").is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let json = format!("[{}, {}]", record_json("A", "C"), record_json("A", "CC"));
        let err = Registry::from_json(&json).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(n) if n == "A"));
    }

    #[test]
    fn empty_structure_rejected() {
        let json = format!("[{}]", record_json("A", " "));
        let err = Registry::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::EmptyField { field: "structure_encoding", .. }
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            Registry::from_json("[{\"name\": \"A\"}]"),
            Err(RegistryError::Parse(_))
        ));
    }
}
