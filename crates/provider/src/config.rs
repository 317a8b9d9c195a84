use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{ApiError, Endpoint, S3Client, TokenError, TransportOptions, VcdTokenSource};

pub const APP_NAME: &str = "vos";
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_REFRESH_SKEW_SECS: u64 = 60;

/// Provider options as written in the config file. Every field may
///  also come from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Object storage gateway host, without scheme
    #[serde(default)]
    pub s3_url: Option<String>,
    /// Region new buckets are created in
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub vcd_url: Option<String>,
    #[serde(default)]
    pub insecure: Option<bool>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub token_refresh_skew_secs: Option<u64>,
}

/// Resolved provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    pub s3_url: String,
    pub region: Option<String>,
    pub org: String,
    pub api_token: String,
    pub vcd_url: Url,
    pub insecure: bool,
    pub timeout: Duration,
    pub token_refresh_skew: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("s3_url", &self.s3_url)
            .field("region", &self.region)
            .field("org", &self.org)
            .field("api_token", &"<redacted>")
            .field("vcd_url", &self.vcd_url.as_str())
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .field("token_refresh_skew", &self.token_refresh_skew)
            .finish()
    }
}

impl ProviderConfig {
    /// Get the config file path (custom or default ~/.vos/config.toml)
    pub fn config_path(custom_path: Option<PathBuf>) -> Result<PathBuf, ConfigLoadError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(ConfigLoadError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)).join(CONFIG_FILE_NAME))
    }

    /// Load the config file, falling back to the process environment for
    ///  anything it leaves out. A missing file at the default location is
    ///  not an error; a missing file given explicitly is.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, ConfigLoadError> {
        let explicit = custom_path.is_some();
        let path = Self::config_path(custom_path)?;

        let file = if path.exists() || explicit {
            let raw = fs::read_to_string(&path)?;
            toml::from_str(&raw)?
        } else {
            tracing::debug!("no config file at {}, using environment", path.display());
            ConfigFile::default()
        };

        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge file values with `env`, file values winning
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigLoadError> {
        let lookup = |value: Option<String>, name: &str| {
            value
                .filter(|v| !v.is_empty())
                .or_else(|| env(name).filter(|v| !v.is_empty()))
        };

        let s3_url = lookup(file.s3_url, "S3_URL").ok_or(ConfigLoadError::Missing("s3_url"))?;
        let region = lookup(file.region, "S3_REGION");
        let org = lookup(file.org, "ORG").ok_or(ConfigLoadError::Missing("org"))?;
        let api_token =
            lookup(file.api_token, "API_TOKEN").ok_or(ConfigLoadError::Missing("api_token"))?;
        let vcd_url = lookup(file.vcd_url, "VCD_URL").ok_or(ConfigLoadError::Missing("vcd_url"))?;
        let vcd_url = Url::parse(&vcd_url)?;

        let insecure = match file.insecure {
            Some(insecure) => insecure,
            None => match env("INSECURE") {
                Some(value) => parse_bool(&value)?,
                None => false,
            },
        };

        Ok(Self {
            s3_url: normalize_host(&s3_url),
            region,
            org,
            api_token,
            vcd_url,
            insecure,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            token_refresh_skew: Duration::from_secs(
                file.token_refresh_skew_secs
                    .unwrap_or(DEFAULT_TOKEN_REFRESH_SKEW_SECS),
            ),
        })
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            insecure: self.insecure,
            timeout: self.timeout,
            token_refresh_skew: self.token_refresh_skew,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.s3_url.as_str())
    }

    /// Exchange the API token for a bearer token and build a client
    ///  against the configured gateway
    pub async fn connect(&self) -> Result<S3Client, ConnectError> {
        let options = self.transport_options();
        let tokens = VcdTokenSource::new(
            options.build_client()?,
            self.vcd_url.as_str(),
            &self.org,
            &self.api_token,
        )?;
        tracing::debug!("connecting to {} as org {}", self.s3_url, self.org);
        let client =
            S3Client::connect(self.endpoint(), self.region.clone(), &options, Arc::new(tokens))
                .await?;
        Ok(client)
    }
}

/// Strip a scheme or trailing slash some users add to the gateway host
fn normalize_host(s3_url: &str) -> String {
    let host = s3_url
        .strip_prefix("https://")
        .or_else(|| s3_url.strip_prefix("http://"))
        .unwrap_or(s3_url);
    host.trim_end_matches('/').to_string()
}

fn parse_bool(value: &str) -> Result<bool, ConfigLoadError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigLoadError::InvalidBool {
            name: "INSECURE",
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("missing required provider option: {0}")]
    Missing(&'static str),

    #[error("invalid boolean {value:?} for {name}")]
    InvalidBool { name: &'static str, value: String },

    #[error("invalid vcd_url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error("token exchange failed: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn full_file() -> ConfigFile {
        ConfigFile {
            s3_url: Some("s3.example.com".into()),
            region: Some("eu-1".into()),
            org: Some("acme".into()),
            api_token: Some("secret".into()),
            vcd_url: Some("https://vcd.example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_values() {
        let config = ProviderConfig::resolve(full_file(), env(&[])).unwrap();
        assert_eq!(config.s3_url, "s3.example.com");
        assert_eq!(config.region.as_deref(), Some("eu-1"));
        assert_eq!(config.org, "acme");
        assert!(!config.insecure);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.token_refresh_skew, Duration::from_secs(60));
    }

    #[test]
    fn test_environment_fallback() {
        let config = ProviderConfig::resolve(
            ConfigFile::default(),
            env(&[
                ("S3_URL", "https://s3.example.com/"),
                ("ORG", "system"),
                ("API_TOKEN", "secret"),
                ("VCD_URL", "https://vcd.example.com/api"),
                ("INSECURE", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(config.s3_url, "s3.example.com");
        assert_eq!(config.region, None);
        assert_eq!(config.org, "system");
        assert!(config.insecure);
    }

    #[test]
    fn test_file_wins_over_environment() {
        let config =
            ProviderConfig::resolve(full_file(), env(&[("ORG", "other"), ("INSECURE", "1")]))
                .unwrap();
        assert_eq!(config.org, "acme");
        assert!(config.insecure);

        let mut file = full_file();
        file.insecure = Some(false);
        let config = ProviderConfig::resolve(file, env(&[("INSECURE", "1")])).unwrap();
        assert!(!config.insecure);
    }

    #[test]
    fn test_missing_required() {
        let mut file = full_file();
        file.api_token = None;
        let err = ProviderConfig::resolve(file, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Missing("api_token")));

        let mut file = full_file();
        file.s3_url = Some(String::new());
        let err = ProviderConfig::resolve(file, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Missing("s3_url")));
    }

    #[test]
    fn test_invalid_values() {
        let err = ProviderConfig::resolve(full_file(), env(&[("INSECURE", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidBool { .. }));

        let mut file = full_file();
        file.vcd_url = Some("not a url".into());
        let err = ProviderConfig::resolve(file, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidUrl(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig::resolve(full_file(), env(&[])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
s3_url = "s3.example.com"
org = "acme"
api_token = "secret"
vcd_url = "https://vcd.example.com"
timeout_secs = 5
"#,
        )
        .unwrap();
        let config = ProviderConfig::load(Some(path)).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.endpoint().url("films", None), "https://s3.example.com/api/v1/s3/films");
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProviderConfig::load(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
    }
}
