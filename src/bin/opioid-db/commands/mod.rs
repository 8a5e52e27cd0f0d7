mod browse;
mod export;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use opioid_db::Registry;

use crate::cli::{Cli, Command};

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.global.config();
    let registry = load_registry(cli.global.data.as_deref())?;

    match cli.command {
        Command::List => browse::run_list(&registry),
        Command::Show(args) => browse::run_show(&registry, &config, args),
        Command::Open(args) => browse::run_open(&registry, &args.name),
        Command::Properties(args) => export::run_properties(&registry, args),
        Command::Render(args) => export::run_render(&registry, &config, args),
        Command::Sdf(args) => export::run_sdf(&registry, &config, args),
    }
}

fn load_registry(path: Option<&Path>) -> Result<Registry> {
    match path {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed to read compound data from {}", path.display()))?;
            Registry::from_json(&data)
                .with_context(|| format!("invalid compound data in {}", path.display()))
        }
        None => Registry::builtin().context("built-in compound data is invalid"),
    }
}
