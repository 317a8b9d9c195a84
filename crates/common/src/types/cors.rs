use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ConfigError;

pub const DEFAULT_MAX_AGE_SECONDS: u32 = 3600;

fn default_max_age() -> u32 {
    DEFAULT_MAX_AGE_SECONDS
}

/// A declared CORS rule. Field names follow the declarative dialect
///  (`allowed_headers`, also accepted hyphenated) and are camel-cased
///  on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsRule {
    #[serde(default, alias = "allowed-headers")]
    pub allowed_headers: Vec<String>,
    #[serde(default, alias = "expose-headers")]
    pub expose_headers: Vec<String>,
    #[serde(alias = "allowed-methods")]
    pub allowed_methods: Vec<String>,
    #[serde(alias = "allowed-origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_max_age", alias = "max-age-seconds")]
    pub max_age_seconds: u32,
}

impl CorsRule {
    pub fn new(allowed_methods: Vec<String>, allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_headers: Vec::new(),
            expose_headers: Vec::new(),
            allowed_methods,
            allowed_origins,
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }

    /// `index` is the rule's position, used in the error path
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.allowed_methods.is_empty() {
            return Err(ConfigError::EmptyList(format!("cors.{}.allowed_methods", index)));
        }
        if self.allowed_origins.is_empty() {
            return Err(ConfigError::EmptyList(format!("cors.{}.allowed_origins", index)));
        }
        Ok(())
    }

    /// The rule as the API expects it, every key camel-cased
    pub fn to_wire(&self) -> Map<String, Value> {
        let declared = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        declared
            .into_iter()
            .map(|(key, value)| (to_camel_case(&key), value))
            .collect()
    }
}

/// `{"corsRules":[..]}` with one independent object per rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfiguration {
    pub cors_rules: Vec<Map<String, Value>>,
}

impl CorsConfiguration {
    pub fn from_rules(rules: &[CorsRule]) -> Self {
        Self {
            cors_rules: rules.iter().map(CorsRule::to_wire).collect(),
        }
    }
}

/// Replace every `-x` / `_x` with `X`
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' || c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    out.extend(next.to_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
