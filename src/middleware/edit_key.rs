use axum::http::HeaderMap;

use crate::error::ApiError;

/// Header carrying the shared edit credential
pub const EDIT_KEY_HEADER: &str = "x-edit-key";

/// Server-held edit secret. Never empty; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct EditKey(String);

impl EditKey {
    /// `None` for an empty secret, so an unset key can never match
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() { None } else { Some(Self(secret)) }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }
}

impl std::fmt::Debug for EditKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EditKey(****)")
    }
}

/// Length-checked comparison whose running time depends only on the length
/// of the inputs, not on where they first differ
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// First value of the edit-key header; non-ASCII values count as absent
fn extract_edit_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(EDIT_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Gate for mutating requests
pub fn authorize(headers: &HeaderMap, configured: Option<&EditKey>) -> Result<(), ApiError> {
    let Some(expected) = configured else {
        tracing::warn!("Rejecting mutation: no edit key configured");
        return Err(ApiError::unauthorized("unauthorized"));
    };

    match extract_edit_key(headers) {
        Some(supplied) if expected.matches(supplied) => Ok(()),
        Some(_) => {
            tracing::warn!("Rejecting mutation: edit key mismatch");
            Err(ApiError::unauthorized("unauthorized"))
        }
        None => {
            tracing::warn!("Rejecting mutation: missing {} header", EDIT_KEY_HEADER);
            Err(ApiError::unauthorized("unauthorized"))
        }
    }
}
