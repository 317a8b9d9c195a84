//! Reading resource state files handed to the CLI.
//!
//! A file is either a bare attribute map or a full state document
//!  (`{"id": ..., "attributes": {...}}`). TOML files are accepted by
//!  extension and converted to the same JSON shape.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use vos_provider::state::ResourceData;

pub fn load_resource_data(path: &Path) -> Result<ResourceData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let value: Value = if is_toml {
        let table: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {} as TOML", path.display()))?;
        serde_json::to_value(table)?
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?
    };

    parse_resource_data(value)
}

fn parse_resource_data(value: Value) -> Result<ResourceData> {
    match value {
        Value::Object(map) if map.get("attributes").map_or(false, Value::is_object) => {
            Ok(serde_json::from_value(Value::Object(map))?)
        }
        Value::Object(map) => Ok(ResourceData::new(map)),
        other => Err(anyhow!("expected an object, found {}", kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
