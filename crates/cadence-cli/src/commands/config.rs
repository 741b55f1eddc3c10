use cadence_core::storage::Config;
use cadence_core::ConfigError;
use clap::Subcommand;

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration
    Show,
    /// Get a value by dot-separated key (e.g. clock.day_start_hour)
    Get { key: String },
    /// Set a value by dot-separated key
    Set { key: String, value: String },
    /// Print the config file path
    Path,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let cfg = Config::load_or_default();
            print_json(&cfg)?;
        }
        ConfigAction::Get { key } => {
            let cfg = Config::load_or_default();
            match cfg.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut cfg = Config::load_or_default();
            cfg.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }

    Ok(())
}
