use opioid_db::{
    Category, CompoundProfile, Property, Registry, depict, descriptors,
    registry::RegistryError,
};

#[test]
fn builtin_has_six_sorted_compounds() {
    let reg = Registry::builtin().unwrap();
    assert_eq!(
        reg.list_names(),
        vec!["Codeine", "Fentanyl", "Hydrocodone", "Methadone", "Morphine", "Oxycodone"]
    );
}

#[test]
fn lookup_is_exact() {
    let reg = Registry::builtin().unwrap();
    let fentanyl = reg.find_by_name("Fentanyl").unwrap();
    assert_eq!(fentanyl.category, Category::Synthetic);
    assert_eq!(fentanyl.external_database_id, "3345");

    assert!(reg.find_by_name("fentanyl").is_err());
    assert!(reg.find_by_name("Heroin").is_err());
    assert!(reg.find_by_name("").is_err());
}

#[test]
fn every_record_parses_and_renders() {
    let reg = Registry::builtin().unwrap();
    for rec in reg.records() {
        let props = descriptors::derive(&rec.structure_encoding);
        assert_eq!(props.len(), Property::ALL.len(), "{}", rec.name);

        let png = depict::render_2d(&rec.structure_encoding, (200, 150))
            .unwrap_or_else(|| panic!("no image for {}", rec.name));
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (200, 150));
    }
}

#[test]
fn profile_json_carries_image_and_properties() {
    let reg = Registry::builtin().unwrap();
    let profile = CompoundProfile::build(reg.find_by_name("Codeine").unwrap(), (120, 90));
    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["record"]["name"], "Codeine");
    assert_eq!(json["record"]["category"], "Natural Opioid");
    assert_eq!(
        json["pubchem_url"],
        "https://pubchem.ncbi.nlm.nih.gov/compound/5284371"
    );
    assert!(
        json["structure_image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert_eq!(json["properties"].as_object().unwrap().len(), 6);
}

#[test]
fn custom_data_must_be_complete() {
    let err = Registry::from_json(r#"[{"name": "Morphine"}]"#).unwrap_err();
    assert!(matches!(err, RegistryError::Parse(_)));
}
