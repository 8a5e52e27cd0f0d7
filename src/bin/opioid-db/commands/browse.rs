use std::{io, thread};

use anyhow::{Result, anyhow};
use opioid_db::{CompoundProfile, Config, Registry, pubchem};

use crate::{cli::ShowArgs, display};

pub fn run_list(registry: &Registry) -> Result<()> {
    let mut out = io::stdout().lock();
    display::print_home(&mut out, &registry.list_names())?;
    Ok(())
}

pub fn run_show(registry: &Registry, config: &Config, args: ShowArgs) -> Result<()> {
    let record = registry.find_by_name(&args.name)?;

    // Start the download before the local work, so the two overlap.
    let download = args.fetch_3d.then(|| {
        let client = config.pubchem_client();
        let cid = record.external_database_id.clone();
        thread::spawn(move || client.fetch_3d_structure(&cid))
    });

    let profile = CompoundProfile::build(record, config.image_size);

    if args.json {
        let mut value = serde_json::to_value(&profile)?;
        if let Some(handle) = download {
            let sdf = handle
                .join()
                .map_err(|_| anyhow!("3D structure download panicked"))?;
            value["sdf_3d_bytes"] = sdf.map(|s| s.len()).into();
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    display::print_detail(&mut out, &profile, args.tab)?;

    if let Some(handle) = download {
        let sdf = handle
            .join()
            .map_err(|_| anyhow!("3D structure download panicked"))?;
        display::print_sdf_status(&mut out, &record.name, sdf.as_deref())?;
    }
    Ok(())
}

pub fn run_open(registry: &Registry, name: &str) -> Result<()> {
    let record = registry.find_by_name(name)?;
    let url = pubchem::compound_url(&record.external_database_id);
    println!("Opening {url}");
    pubchem::open_overview(&record.external_database_id);
    Ok(())
}
