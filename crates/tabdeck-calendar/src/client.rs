//! Google Calendar API client.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tabdeck_core::CalendarConfig;
use tracing::instrument;

use crate::auth::{Authorizer, TokenCache, TokenFileAuthorizer};
use crate::error::CalendarError;

pub struct CalendarClient {
    client: reqwest::Client,
    base_url: String,
    authorizer: Arc<dyn Authorizer>,
    tokens: TokenCache,
}

impl CalendarClient {
    pub fn new(base_url: &str, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            authorizer,
            tokens: TokenCache::new(),
        }
    }

    /// Client reading its token from the configured token file.
    pub fn from_config(config: &CalendarConfig) -> Self {
        let authorizer = TokenFileAuthorizer::new(config.effective_token_file());
        Self::new(&config.api_url, Arc::new(authorizer))
    }

    /// Cached token, else a silent authorization, else an interactive one.
    async fn access_token(&self) -> Result<String, CalendarError> {
        if let Some(token) = self.tokens.get(Utc::now()) {
            return Ok(token);
        }

        let token = match self.authorizer.authorize(false).await {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!("Silent authorization failed ({}), prompting", e);
                self.authorizer.authorize(true).await?
            }
        };

        let value = token.token.clone();
        self.tokens.store(token);
        Ok(value)
    }

    async fn reauthorize(&self) -> Result<String, CalendarError> {
        self.tokens.clear();
        let token = self.authorizer.authorize(true).await?;
        let value = token.token.clone();
        self.tokens.store(token);
        Ok(value)
    }

    async fn send(
        &self,
        url: &str,
        params: &[(String, String)],
        token: &str,
    ) -> Result<reqwest::Response, CalendarError> {
        Ok(self
            .client
            .get(url)
            .query(params)
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// GET `path` with query `params`. A 401 drops the cached token and
    /// retries once after an interactive authorization.
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value, CalendarError> {
        let url = format!("{}{}", self.base_url, path);

        let token = self.access_token().await?;
        let mut response = self.send(&url, params, &token).await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("Calendar token rejected, re-authorizing");
            let token = self.reauthorize().await?;
            response = self.send(&url, params, &token).await?;
        }

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::InvalidResponse(e.to_string()))
        } else {
            Err(CalendarError::Api(status.as_u16()))
        }
    }

    /// Raw calendarList response, including hidden calendars the user can read.
    #[instrument(skip(self), level = "info")]
    pub async fn calendar_list(&self) -> Result<Value, CalendarError> {
        let params = [
            ("minAccessRole".to_string(), "reader".to_string()),
            ("showHidden".to_string(), "true".to_string()),
        ];
        self.get_json("/users/me/calendarList", &params).await
    }

    /// Raw events response for one calendar. `params` are passed through as
    /// query parameters.
    #[instrument(skip(self, params), level = "info")]
    pub async fn events(
        &self,
        calendar_id: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, CalendarError> {
        let path = format!("/calendars/{}/events", urlencoding::encode(calendar_id));
        self.get_json(&path, &query_params(params)).await
    }
}

/// Strings pass through as-is; other values use their JSON text.
fn query_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
