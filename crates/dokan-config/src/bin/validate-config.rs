//! Config validation CLI tool
//!
//! Validates a dokan configuration file and reports any errors.

use dokan_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a dokan configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match dokan_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", dokan_config::CURRENT_CONFIG_VERSION);
            println!("  Data dir: {}", settings.storage.data_dir.display());
            println!("  Promo codes: {}", settings.entitlement.promo_codes.len());
            println!("  Premium term: {}", format_duration(settings.entitlement.term));
            println!("  Trial: {}", format_duration(settings.entitlement.trial_length));
            println!(
                "  Free shopping list cap: {}",
                settings.limits.shopping_list_free_cap
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                dokan_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                dokan_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                dokan_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                dokan_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        dokan_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
