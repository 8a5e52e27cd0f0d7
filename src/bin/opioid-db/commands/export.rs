use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result, bail};
use opioid_db::{Config, Registry, depict, descriptors};

use crate::{
    cli::{PropertiesArgs, RenderArgs, SdfArgs},
    display,
};

pub fn run_properties(registry: &Registry, args: PropertiesArgs) -> Result<()> {
    let (title, smiles) = match (&args.smiles, &args.name) {
        (Some(smiles), _) => (smiles.clone(), smiles.clone()),
        (None, Some(name)) => {
            let record = registry.find_by_name(name)?;
            (record.name.clone(), record.structure_encoding.clone())
        }
        (None, None) => bail!("a compound name or --smiles is required"),
    };

    let props = descriptors::derive(&smiles);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&props)?);
    } else {
        display::print_properties(&mut io::stdout().lock(), &title, &props)?;
    }
    Ok(())
}

pub fn run_render(registry: &Registry, config: &Config, args: RenderArgs) -> Result<()> {
    let record = registry.find_by_name(&args.name)?;

    let Some(png) = depict::render_2d(&record.structure_encoding, config.image_size) else {
        println!("Structure image not available for {}", record.name);
        return Ok(());
    };

    if args.data_uri {
        println!("{}", depict::to_data_uri(&png));
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}_2d_structure.png", record.name)));
    fs::write(&path, &png).with_context(|| format!("failed to write {}", path.display()))?;

    let (w, h) = config.image_size;
    println!("Wrote {} ({w}x{h} PNG, {} bytes)", path.display(), png.len());
    Ok(())
}

pub fn run_sdf(registry: &Registry, config: &Config, args: SdfArgs) -> Result<()> {
    let record = registry.find_by_name(&args.name)?;

    let Some(sdf) = config
        .pubchem_client()
        .fetch_3d_structure(&record.external_database_id)
    else {
        println!("3D structure data not available for download");
        return Ok(());
    };

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}_3d_structure.sdf", record.name)));
    fs::write(&path, &sdf).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} ({} bytes)", path.display(), sdf.len());
    Ok(())
}
