//! Everything shown for one compound: its record plus what's computed from the record.
//! Nothing here touches the network; 3D structures are fetched separately, on request.

use serde::{Serialize, Serializer};

use crate::{
    compound::CompoundRecord,
    depict,
    descriptors::{Descriptors, PropertyMap},
    pubchem, smiles,
};

#[derive(Clone, Debug, Serialize)]
pub struct CompoundProfile {
    pub record: CompoundRecord,
    /// Empty if the record's SMILES couldn't be parsed.
    pub properties: PropertyMap,
    /// Hill formula of the parsed structure. May differ from the declared one.
    pub computed_formula: Option<String>,
    #[serde(rename = "structure_image", serialize_with = "image_as_data_uri")]
    pub image_png: Option<Vec<u8>>,
    pub pubchem_url: String,
}

impl CompoundProfile {
    /// Parse the structure once, and derive properties and a depiction from it.
    pub fn build(record: &CompoundRecord, image_size: (u32, u32)) -> Self {
        let pubchem_url = pubchem::compound_url(&record.external_database_id);

        let mol = match smiles::parse(&record.structure_encoding) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Unable to parse the structure of {}: {e}", record.name);
                return Self {
                    record: record.clone(),
                    properties: PropertyMap::default(),
                    computed_formula: None,
                    image_png: None,
                    pubchem_url,
                };
            }
        };

        let image_png = if image_size.0 == 0 || image_size.1 == 0 {
            None
        } else {
            match depict::encode_png(&depict::draw_molecule(&mol, image_size)) {
                Ok(png) => Some(png),
                Err(e) => {
                    log::debug!("Unable to render {}: {e}", record.name);
                    None
                }
            }
        };

        Self {
            record: record.clone(),
            properties: Descriptors::compute(&mol).to_property_map(),
            computed_formula: Some(mol.molecular_formula()),
            image_png,
            pubchem_url,
        }
    }
}

fn image_as_data_uri<S>(png: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match png {
        Some(p) => serializer.serialize_some(&depict::to_data_uri(p)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Registry, descriptors::Property};

    #[test]
    fn morphine_profile() {
        let reg = Registry::builtin().unwrap();
        let rec = reg.find_by_name("Morphine").unwrap();
        let profile = CompoundProfile::build(rec, (200, 150));

        assert_eq!(profile.properties.len(), 6);
        assert_eq!(
            profile.properties.get(Property::MolecularWeight),
            Some("285.34 g/mol")
        );
        assert_eq!(profile.computed_formula.as_deref(), Some("C17H19NO3"));
        assert!(profile.image_png.is_some());
        assert_eq!(
            profile.pubchem_url,
            "https://pubchem.ncbi.nlm.nih.gov/compound/5288826"
        );
    }

    #[test]
    fn broken_structure_degrades() {
        let reg = Registry::builtin().unwrap();
        let mut rec = reg.find_by_name("Codeine").unwrap().clone();
        rec.structure_encoding = "C1CC(".to_owned();

        let profile = CompoundProfile::build(&rec, (200, 150));
        assert!(profile.properties.is_empty());
        assert!(profile.image_png.is_none());
        assert!(profile.computed_formula.is_none());
        assert_eq!(profile.record.name, "Codeine");
    }

    #[test]
    fn json_embeds_image_as_data_uri() {
        let reg = Registry::builtin().unwrap();
        let profile = CompoundProfile::build(reg.find_by_name("Methadone").unwrap(), (100, 80));
        let json = serde_json::to_value(&profile).unwrap();

        let img = json["structure_image"].as_str().unwrap();
        assert!(img.starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(json["properties"]["Rotatable Bonds"], "7");
        assert_eq!(json["record"]["category"], "Synthetic Opioid");
    }
}
