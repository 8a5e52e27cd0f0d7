use log::LevelFilter;

const CRATES: &[&str] = &["opioid_db"];

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Log to stderr. `-v` / `-vv` pick the level for our own crate; `RUST_LOG`, if set,
/// replaces the filter entirely.
pub fn init(verbosity: u8) {
    let level = match level_for(verbosity) {
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        _ => "debug",
    };

    let filter = CRATES
        .iter()
        .map(|pkg| format!("{pkg}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}
