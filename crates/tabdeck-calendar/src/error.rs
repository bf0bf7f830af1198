//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Token expired")]
    TokenExpired,

    /// Non-2xx response that survived the retry. Display matches the status
    /// line shown to the user.
    #[error("API error {0}")]
    Api(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0}")]
    TokenStorage(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        assert_eq!(CalendarError::Api(500).to_string(), "API error 500");
    }

    #[test]
    fn test_authorization_failed_display() {
        let err = CalendarError::AuthorizationFailed("No access token".into());
        assert_eq!(err.to_string(), "Authorization failed: No access token");
    }
}
