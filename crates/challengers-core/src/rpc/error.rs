use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Method not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid metadata value for {0}")]
    InvalidMetadata(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RpcError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => RpcError::Unauthenticated(truncated),
            403 => RpcError::PermissionDenied(truncated),
            404 => RpcError::NotFound(truncated),
            429 => RpcError::RateLimited,
            500..=599 => RpcError::ServerError(truncated),
            _ => RpcError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Whether the service explicitly refused the presented credential
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, RpcError::Unauthenticated(_) | RpcError::PermissionDenied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            RpcError::from_status(StatusCode::UNAUTHORIZED, "invalid token"),
            RpcError::Unauthenticated(ref b) if b == "invalid token"
        ));
        assert!(matches!(
            RpcError::from_status(StatusCode::FORBIDDEN, ""),
            RpcError::PermissionDenied(_)
        ));
        assert!(matches!(
            RpcError::from_status(StatusCode::NOT_FOUND, ""),
            RpcError::NotFound(_)
        ));
        assert!(matches!(
            RpcError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            RpcError::RateLimited
        ));
        assert!(matches!(
            RpcError::from_status(StatusCode::BAD_GATEWAY, ""),
            RpcError::ServerError(_)
        ));
        assert!(matches!(
            RpcError::from_status(StatusCode::IM_A_TEAPOT, "short and stout"),
            RpcError::InvalidResponse(ref m) if m.contains("418")
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = RpcError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("({} total bytes)", long.len())));

        // Never splits a multi-byte character
        let wide = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = RpcError::truncate_body(&wide);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_is_unauthenticated() {
        assert!(RpcError::Unauthenticated(String::new()).is_unauthenticated());
        assert!(!RpcError::RateLimited.is_unauthenticated());
    }
}
