//! Response envelope sent to the React frontend.
//!
//! Every wasm export returns `{"ok": true, "data": ...}` or
//! `{"ok": false, "error": {...}}` as a JSON string.

use serde::Serialize;

use crate::error::GridError;

/// Error information for the host UI
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Machine-readable code, see `GridError::code`
    pub code: &'static str,
    pub message: String,
}

impl From<&GridError> for ErrorInfo {
    fn from(err: &GridError) -> Self {
        Self { code: err.code(), message: err.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Response<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    pub fn failure(err: &GridError) -> Self {
        Self { ok: false, data: None, error: Some(ErrorInfo::from(err)) }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"ok":false,"error":{"code":"json","message":"serialization failed"}}"#.to_string())
    }
}
