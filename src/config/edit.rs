//! In-place edits of config file frontmatter.

use anyhow::{anyhow, bail, Context, Result};
use serde_yaml::{Mapping, Value as YamlValue};
use std::fs;
use std::io::Write;
use std::path::Path;

use super::Config;
use crate::ticket::{split_frontmatter, FrontmatterSplit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Integer,
}

/// Dotted keys `config <key> <value>` may write.
const SETTABLE_KEYS: &[(&str, ValueKind)] = &[
    ("project.name", ValueKind::Text),
    ("project.description", ValueKind::Text),
    ("tickets.dir", ValueKind::Text),
    ("tickets.id_width", ValueKind::Integer),
    ("tickets.default_priority", ValueKind::Text),
    ("tickets.default_assignee", ValueKind::Text),
    ("schemas.dir", ValueKind::Text),
    ("workflow.self_transition", ValueKind::Text),
];

pub fn settable_keys() -> impl Iterator<Item = &'static str> {
    SETTABLE_KEYS.iter().map(|(key, _)| *key)
}

fn typed_value(key: &str, raw: &str) -> Result<YamlValue> {
    let Some((_, kind)) = SETTABLE_KEYS.iter().find(|(k, _)| *k == key) else {
        bail!(
            "Cannot set '{}'. Settable keys: {}",
            key,
            settable_keys().collect::<Vec<_>>().join(", ")
        );
    };
    match kind {
        ValueKind::Text => Ok(YamlValue::String(raw.to_string())),
        ValueKind::Integer => raw
            .trim()
            .parse::<u64>()
            .map(|n| YamlValue::Number(n.into()))
            .map_err(|_| anyhow!("{} must be a whole number, got '{}'", key, raw)),
    }
}

/// Set `key` in the YAML `mapping`, creating intermediate mappings.
fn set_path(mapping: &mut Mapping, key: &str, value: YamlValue) -> Result<()> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| anyhow!("Config key must be dotted: {}", key))?;
    let entry = mapping
        .entry(YamlValue::String(section.to_string()))
        .or_insert_with(|| YamlValue::Mapping(Mapping::new()));
    if entry.is_null() {
        *entry = YamlValue::Mapping(Mapping::new());
    }
    let YamlValue::Mapping(inner) = entry else {
        bail!("Config section '{}' is not a mapping", section);
    };
    inner.insert(YamlValue::String(field.to_string()), value);
    Ok(())
}

/// Rewrite `content` with `key` set to `raw`, keeping the markdown body.
pub fn set_config_value(content: &str, key: &str, raw: &str) -> Result<String> {
    let value = typed_value(key, raw)?;
    let (yaml, body) = match split_frontmatter(content) {
        FrontmatterSplit::Delimited { yaml, body } => (yaml, body),
        FrontmatterSplit::Absent if content.trim().is_empty() => ("", ""),
        _ => bail!("Failed to extract frontmatter from config"),
    };

    let mut mapping = match serde_yaml::from_str::<YamlValue>(yaml)
        .context("Failed to parse config frontmatter")?
    {
        YamlValue::Null => Mapping::new(),
        YamlValue::Mapping(mapping) => mapping,
        _ => bail!("Config frontmatter must be a mapping"),
    };
    set_path(&mut mapping, key, value)?;

    let rendered = format!("---\n{}---\n{}", serde_yaml::to_string(&mapping)?, body);
    Config::parse(&rendered).with_context(|| format!("Invalid value for {}: {}", key, raw))?;
    Ok(rendered)
}

/// Set `key` in the config file at `path`, creating the file if needed.
pub fn update_config_file(path: &Path, key: &str, raw: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?
    } else {
        String::new()
    };
    let updated = set_config_value(&content, key, raw)?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(updated.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    tracing::debug!("Set {} in {}", key, path.display());
    Ok(())
}
