/// A desired state that can never be applied. Raised before any
///  request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("canned_acl and acl are mutually exclusive")]
    ConflictingAcl,
    #[error("{value:?} is not a valid {kind}. Valid values: {valid}")]
    InvalidValue {
        /// Attribute the value was read from
        attribute: &'static str,
        kind: &'static str,
        value: String,
        valid: &'static str,
    },
    #[error("{0} must contain at least one entry")]
    EmptyList(String),
}

impl ConfigError {
    /// Attribute the error points at, in the resource's field naming
    pub fn attribute(&self) -> String {
        match self {
            ConfigError::ConflictingAcl => "acl".to_string(),
            ConfigError::InvalidValue { attribute, .. } => attribute.to_string(),
            ConfigError::EmptyList(path) => path.clone(),
        }
    }
}
