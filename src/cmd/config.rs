//! Config command: show, list and set configuration keys

use anyhow::{anyhow, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use trackdown::config::edit::update_config_file;
use trackdown::config::{global_config_path, Config};

use super::ensure_initialized;
use crate::ui::{self, colors};

/// Arguments of `aitrackdown config`.
#[derive(Debug, Default)]
pub struct ConfigArgs {
    pub key: Option<String>,
    pub value: Option<String>,
    pub list: bool,
    pub global: bool,
}

fn global_path() -> Result<PathBuf> {
    global_config_path().ok_or_else(|| anyhow!("No global config directory on this platform"))
}

/// The config the command reads: the global file alone with `--global`,
/// otherwise the project's merged config.
fn load_for_reading(root: &Path, global: bool) -> Result<Config> {
    if !global {
        return Ok(ensure_initialized(root)?.config);
    }
    let path = global_path()?;
    if path.exists() {
        Config::load_from(&path)
    } else {
        tracing::debug!("No global config at {}", path.display());
        Ok(Config::default())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn cmd_config(root: &Path, args: ConfigArgs) -> Result<()> {
    if let (Some(key), Some(value)) = (&args.key, &args.value) {
        return set_value(root, key, value, args.global);
    }

    let config = load_for_reading(root, args.global)?;
    if args.list {
        for (key, value) in config.entries()? {
            println!("{}: {}", key, display_value(&value));
        }
        return Ok(());
    }

    let Some(key) = args.key else {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    };

    match config.get(&key)? {
        Some(value) if value.is_object() || value.is_array() => {
            print!("{}", serde_yaml::to_string(&value)?)
        }
        Some(value) => println!("{}", display_value(&value)),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn set_value(root: &Path, key: &str, value: &str, global: bool) -> Result<()> {
    let path = if global {
        global_path()?
    } else {
        ensure_initialized(root)?;
        root.join(trackdown::paths::CONFIG_FILE)
    };
    update_config_file(&path, key, value)?;
    tracing::info!("Set {} in {}", key, path.display());

    if !ui::is_quiet() {
        println!(
            "{} {} = {}",
            colors::success("Set"),
            colors::identifier(key),
            value
        );
    }
    Ok(())
}
