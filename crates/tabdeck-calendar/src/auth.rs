//! Bearer tokens for the Calendar API.
//!
//! An [`Authorizer`] hands out access tokens. It is asked silently first and
//! interactively only when the silent attempt fails or the API rejects the
//! token. [`TokenCache`] keeps the last token until it is within a minute of
//! expiring.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the issuer does not say.
pub const DEFAULT_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Token valid for `lifetime` from `now`.
    pub fn expiring_in(token: impl Into<String>, lifetime: Duration, now: DateTime<Utc>) -> Self {
        Self::new(token, now + lifetime)
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Source of access tokens.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// `interactive == false` must not prompt the user.
    async fn authorize(&self, interactive: bool) -> Result<AccessToken, CalendarError>;
}

/// Last issued token.
#[derive(Debug, Default)]
pub struct TokenCache {
    current: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, now: DateTime<Utc>) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .filter(|t| t.is_usable(now))
            .map(|t| t.token.clone())
    }

    pub fn store(&self, token: AccessToken) {
        *self.current.lock() = Some(token);
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
    }
}

/// Token file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Token expiration timestamp (Unix timestamp). Absent means one hour
    /// from when the file is read.
    pub expires_at: Option<i64>,
}

/// Reads tokens from a JSON file written by an external sign-in helper.
///
/// Silent and interactive requests read the same file; the interactive one
/// additionally logs that a sign-in is required when the file is missing.
pub struct TokenFileAuthorizer {
    path: PathBuf,
}

impl TokenFileAuthorizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<TokenSet, CalendarError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CalendarError::AuthRequired)
            }
            Err(e) => return Err(CalendarError::TokenStorage(e.to_string())),
        };

        serde_json::from_str(&json).map_err(|e| CalendarError::TokenStorage(e.to_string()))
    }
}

#[async_trait]
impl Authorizer for TokenFileAuthorizer {
    async fn authorize(&self, interactive: bool) -> Result<AccessToken, CalendarError> {
        let token_set = match self.read() {
            Ok(set) => set,
            Err(CalendarError::AuthRequired) if interactive => {
                tracing::warn!("No calendar token at {:?}; sign in first", self.path);
                return Err(CalendarError::AuthorizationFailed(
                    "No access token".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        if token_set.access_token.is_empty() {
            return Err(CalendarError::AuthorizationFailed(
                "No access token".to_string(),
            ));
        }

        let now = Utc::now();
        let expires_at = token_set
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or(now + Duration::seconds(DEFAULT_LIFETIME_SECS));

        if expires_at <= now {
            return Err(CalendarError::TokenExpired);
        }

        tracing::debug!(interactive, "Loaded calendar token from file");
        Ok(AccessToken::new(token_set.access_token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_token(path: &Path, token: &str, expires_at: i64) {
        let json = serde_json::json!({"access_token": token, "expires_at": expires_at});
        std::fs::write(path, json.to_string()).unwrap();
    }

    #[test]
    fn test_expiry_margin() {
        let now = Utc::now();
        assert!(AccessToken::expiring_in("t", Duration::seconds(61), now).is_usable(now));
        assert!(!AccessToken::expiring_in("t", Duration::seconds(60), now).is_usable(now));
        assert!(!AccessToken::expiring_in("t", Duration::seconds(-5), now).is_usable(now));
    }

    #[test]
    fn test_token_cache() {
        let cache = TokenCache::new();
        let now = Utc::now();
        assert_eq!(cache.get(now), None);

        cache.store(AccessToken::expiring_in("abc", Duration::seconds(DEFAULT_LIFETIME_SECS), now));
        assert_eq!(cache.get(now).as_deref(), Some("abc"));
        assert_eq!(cache.get(now + Duration::minutes(59) + Duration::seconds(30)), None);

        cache.clear();
        assert_eq!(cache.get(now), None);
    }

    #[tokio::test]
    async fn test_file_authorizer_reads_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        write_token(&path, "ya29.token", Utc::now().timestamp() + 3600);
        let auth = TokenFileAuthorizer::new(&path);

        let token = auth.authorize(false).await.unwrap();
        assert_eq!(token.token, "ya29.token");
        assert!(token.is_usable(Utc::now()));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let auth = TokenFileAuthorizer::new(dir.path().join("token.json"));

        assert!(matches!(
            auth.authorize(false).await,
            Err(CalendarError::AuthRequired)
        ));
        assert!(matches!(
            auth.authorize(true).await,
            Err(CalendarError::AuthorizationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_file_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        write_token(&path, "old", Utc::now().timestamp() - 10);
        let auth = TokenFileAuthorizer::new(&path);

        assert!(matches!(
            auth.authorize(true).await,
            Err(CalendarError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_missing_expiry_defaults_to_an_hour() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, r#"{"access_token": "abc"}"#).unwrap();

        let token = TokenFileAuthorizer::new(&path).authorize(false).await.unwrap();
        assert!(token.expires_at > Utc::now() + Duration::minutes(59));
    }
}
