//! Error taxonomy shared by the gateway, the device client and the session.

use crate::settings::SettingsField;
use thiserror::Error;

/// Classified failure of a single gateway request.
///
/// Exactly one of these is produced per failed request. The session decides
/// how to present it (global notification or dialog-scoped message).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No response arrived within the timeout window.
    #[error("request timed out")]
    TimedOut,

    /// A response arrived but its status was not 2xx.
    #[error("HTTP error {status}")]
    HttpError { status: u16 },

    /// Transport-level failure (connect, reset, DNS, ...).
    #[error("network error: {cause}")]
    NetworkError { cause: String },

    /// The request could not be built (e.g. body serialization failed).
    #[error("invalid request: {cause}")]
    InvalidRequest { cause: String },

    /// The response was successful but its body could not be decoded.
    #[error("invalid response: {cause}")]
    InvalidResponse { cause: String },
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::TimedOut
        } else if e.is_decode() {
            Self::InvalidResponse {
                cause: e.to_string(),
            }
        } else if let Some(status) = e.status() {
            Self::HttpError {
                status: status.as_u16(),
            }
        } else {
            Self::NetworkError {
                cause: e.to_string(),
            }
        }
    }
}

/// Client-side settings validation failure. Never reaches the network.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("invalid value for {field}")]
pub struct ValidationError {
    pub field: SettingsField,
}

impl ValidationError {
    pub fn new(field: SettingsField) -> Self {
        Self { field }
    }
}
