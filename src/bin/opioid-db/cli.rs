use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use opioid_db::{Config, HTTP_TIMEOUT, depict::DEFAULT_IMAGE_SIZE};

#[derive(Parser)]
#[command(
    name = "opioid-db",
    about = "Reference data, properties, and structures for common opioid drugs",
    long_about = "Reference data, properties, and structures for common opioid drugs.\n\n\
                  For educational purposes only. Never use prescription medications \
                  without medical supervision.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Introduction, and the list of compounds
    #[command(visible_alias = "ls")]
    List,

    /// Show a compound's profile
    Show(ShowArgs),

    /// Print properties derived from a compound's structure, or from any SMILES
    #[command(visible_alias = "props")]
    Properties(PropertiesArgs),

    /// Write a 2D structure depiction (PNG)
    Render(RenderArgs),

    /// Download the 3D structure (SDF) from PubChem
    Sdf(SdfArgs),

    /// Open the compound's PubChem entry in a web browser
    Open(NameArgs),
}

/// Options shared by all commands.
#[derive(Args)]
pub struct GlobalOptions {
    /// Timeout for each PubChem request, in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = HTTP_TIMEOUT)]
    pub timeout: u64,

    /// Depiction width, in pixels
    #[arg(long, global = true, value_name = "PX", default_value_t = DEFAULT_IMAGE_SIZE.0)]
    pub width: u32,

    /// Depiction height, in pixels
    #[arg(long, global = true, value_name = "PX", default_value_t = DEFAULT_IMAGE_SIZE.1)]
    pub height: u32,

    /// Load compound records from this JSON file instead of the built-in set
    #[arg(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOptions {
    pub fn config(&self) -> Config {
        Config {
            http_timeout: Duration::from_secs(self.timeout),
            image_size: (self.width, self.height),
        }
    }
}

#[derive(Args)]
pub struct NameArgs {
    /// Compound name, as listed by `opioid-db list` (case-sensitive)
    pub name: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Compound name, as listed by `opioid-db list` (case-sensitive)
    pub name: String,

    /// Section of the profile to show
    #[arg(long, value_enum, default_value_t = Tab::All)]
    pub tab: Tab,

    /// Also fetch the 3D structure from PubChem, in the background
    #[arg(long)]
    pub fetch_3d: bool,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum Tab {
    #[default]
    All,
    Overview,
    Structure,
    Pharmacology,
    Safety,
    References,
}

#[derive(Args)]
pub struct PropertiesArgs {
    /// Compound name
    #[arg(required_unless_present = "smiles", conflicts_with = "smiles")]
    pub name: Option<String>,

    /// Derive properties for this SMILES instead of a listed compound
    #[arg(long, value_name = "SMILES")]
    pub smiles: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Compound name
    pub name: String,

    /// Output file [default: <NAME>_2d_structure.png]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a data URI to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub data_uri: bool,
}

#[derive(Args)]
pub struct SdfArgs {
    /// Compound name
    pub name: String,

    /// Output file [default: <NAME>_3d_structure.sdf]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "opioid-db", "show", "Morphine", "--tab", "safety", "--timeout", "3", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.timeout, 3);
        assert_eq!(cli.global.verbose, 2);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.tab, Tab::Safety);
        assert!(!args.fetch_3d);
    }

    #[test]
    fn defaults_match_library_config() {
        let cli = Cli::try_parse_from(["opioid-db", "list"]).unwrap();
        assert_eq!(cli.global.config(), Config::default());
    }

    #[test]
    fn properties_needs_name_or_smiles() {
        assert!(Cli::try_parse_from(["opioid-db", "properties"]).is_err());
        assert!(Cli::try_parse_from(["opioid-db", "properties", "--smiles", "CCO"]).is_ok());
        assert!(
            Cli::try_parse_from(["opioid-db", "properties", "Morphine", "--smiles", "CCO"])
                .is_err()
        );
    }
}
