use reqwest::StatusCode;

use crate::token::TokenError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// DNS, connection, TLS or body-read failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The gateway answered with a non-success status
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("invalid header {0}")]
    InvalidHeader(String),
    #[error("bearer token unavailable: {0}")]
    Token(#[from] TokenError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::HttpStatus(status, _) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
