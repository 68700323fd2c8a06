//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up skyplan CLI defaults.

use crate::config::Config;
use anyhow::Result;

/// Handle the configure command
///
/// # Arguments
/// * `data` - Optional reference data location to set as default
/// * `base_url` - Optional planner base URL to set as default
/// * `show` - If true, show current configuration
pub fn handle(data: Option<String>, base_url: Option<String>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if apply(&mut config, data, base_url) {
        config.save()?;
        show_config(&config);
        if let Ok(path) = Config::config_path() {
            println!("Config saved to: {}", path.display());
        }
    } else {
        show_usage();
    }

    Ok(())
}

/// Copy provided settings into the config; false when nothing was given
fn apply(config: &mut Config, data: Option<String>, base_url: Option<String>) -> bool {
    let changed = data.is_some() || base_url.is_some();
    if let Some(data) = data {
        config.data = Some(data);
    }
    if let Some(base_url) = base_url {
        config.base_url = Some(base_url);
    }
    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.data {
        Some(data) => println!("Reference data: {}", data),
        None => println!("Reference data: {} (default)", crate::config::DEFAULT_DATA),
    }
    match &config.base_url {
        Some(url) => println!("Base URL: {}", url),
        None => println!("Base URL: {} (default)", skyplan::DEFAULT_BASE_URL),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: skyplan configure --data DIR_OR_URL");
    println!("   or: skyplan configure --base-url URL");
    println!("   or: skyplan configure --show");
}
