//! The response envelope: every payload ships as `{success, msg?, data?}`
//! and every failure as `{success: false, error}`.

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(msg: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            msg: Some(msg.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (logout, delete).
    pub fn empty(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

/// Failure body carried by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
