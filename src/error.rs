// src/error.rs
use crate::types::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The request could not complete, or the backend answered with a non-2xx status.
    #[error("{}", transport_message(.message, .status, .status_text))]
    Transport {
        message: String,
        status: Option<u16>,
        status_text: Option<String>,
    },

    #[error("failed to decode {resource}: {message}")]
    Decode { resource: String, message: String },

    #[error("invalid {resource}: {source}")]
    Invalid {
        resource: String,
        #[source]
        source: ValidationError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

fn transport_message(message: &str, status: &Option<u16>, status_text: &Option<String>) -> String {
    match (status, status_text) {
        (Some(code), Some(text)) => format!("HTTP {} {}: {}", code, text, message),
        (Some(code), None) => format!("HTTP {}: {}", code, message),
        _ => format!("network error: {}", message),
    }
}

impl DashboardError {
    pub fn transport(message: impl Into<String>) -> Self {
        DashboardError::Transport {
            message: message.into(),
            status: None,
            status_text: None,
        }
    }

    pub fn decode(resource: impl Into<String>, message: impl Into<String>) -> Self {
        DashboardError::Decode {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DashboardError::Transport { .. })
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status();
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        DashboardError::Transport {
            message,
            status: status.map(|s| s.as_u16()),
            status_text: status.and_then(|s| s.canonical_reason()).map(str::to_string),
        }
    }
}
