//! Response envelope and authentication payloads.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every backend result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            ok: true,
            result: Some(result),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            message: Some(message.into()),
        }
    }

    /// Unwrap the result, or the failure message.
    ///
    /// `ok=false` discards any payload. `ok=true` with no result is a soft
    /// failure. Missing messages fall back to `fallback`.
    pub fn into_result(self, fallback: &str) -> Result<T, String> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(self.message.unwrap_or_else(|| fallback.to_string())),
        }
    }
}

/// Simple message payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

/// Credentials for `auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Result of `auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Login name echoed back by the backend
    #[serde(default)]
    pub login: Option<String>,
    /// Role string
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}
