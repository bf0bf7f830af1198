//! JSON request/response contract between the page and the calendar backend.
//!
//! Requests: `{"type": "calendarList"}` and
//! `{"type": "events", "calId": .., "params": {..}}`. Responses are
//! `{"ok": true, "data": ..}` or `{"ok": false, "error": ..}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::CalendarClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "calendarList")]
    CalendarList,

    #[serde(rename = "events")]
    Events {
        #[serde(rename = "calId")]
        cal_id: String,
        #[serde(default)]
        params: Map<String, Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Answer one raw message. Anything that is not a known request gets
/// `{"ok": false, "error": "unknown"}`.
pub async fn handle(client: &CalendarClient, message: &Value) -> Response {
    match Request::deserialize(message) {
        Ok(request) => dispatch(client, request).await,
        Err(e) => {
            tracing::debug!("Unrecognised calendar message: {}", e);
            Response::failure("unknown")
        }
    }
}

pub async fn dispatch(client: &CalendarClient, request: Request) -> Response {
    let result = match &request {
        Request::CalendarList => client.calendar_list().await,
        Request::Events { cal_id, params } => client.events(cal_id, params).await,
    };

    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            tracing::warn!("Calendar request {:?} failed: {}", request, e);
            Response::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::auth::{AccessToken, Authorizer};
    use crate::error::CalendarError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticToken;

    #[async_trait]
    impl Authorizer for StaticToken {
        async fn authorize(&self, _interactive: bool) -> Result<AccessToken, CalendarError> {
            Ok(AccessToken::expiring_in(
                "token",
                chrono::Duration::hours(1),
                chrono::Utc::now(),
            ))
        }
    }

    #[test]
    fn test_request_parsing() {
        let request: Request = serde_json::from_value(json!({"type": "calendarList"})).unwrap();
        assert_eq!(request, Request::CalendarList);

        let request: Request = serde_json::from_value(json!({
            "type": "events",
            "calId": "primary",
            "params": {"maxResults": 5}
        }))
        .unwrap();
        match request {
            Request::Events { cal_id, params } => {
                assert_eq!(cal_id, "primary");
                assert_eq!(params["maxResults"], 5);
            }
            other => unreachable!("parsed as {:?}", other),
        }
    }

    #[test]
    fn test_events_params_optional() {
        let request: Request =
            serde_json::from_value(json!({"type": "events", "calId": "x"})).unwrap();
        assert_eq!(
            request,
            Request::Events {
                cal_id: "x".to_string(),
                params: Map::new()
            }
        );
    }

    #[test]
    fn test_response_shape() {
        assert_eq!(
            serde_json::to_value(Response::success(json!([1]))).unwrap(),
            json!({"ok": true, "data": [1]})
        );
        assert_eq!(
            serde_json::to_value(Response::failure("unknown")).unwrap(),
            json!({"ok": false, "error": "unknown"})
        );
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let server = MockServer::start().await;
        let client = CalendarClient::new(&server.uri(), Arc::new(StaticToken));

        let response = handle(&client, &json!({"type": "freeBusy"})).await;
        assert_eq!(response, Response::failure("unknown"));

        let response = handle(&client, &json!("calendarList")).await;
        assert_eq!(response, Response::failure("unknown"));
    }

    #[tokio::test]
    async fn test_calendar_list_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("showHidden", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": "a"}]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = CalendarClient::new(&server.uri(), Arc::new(StaticToken));
        let response = handle(&client, &json!({"type": "calendarList"})).await;

        assert!(response.ok);
        assert_eq!(response.data.unwrap()["items"][0]["id"], "a");
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CalendarClient::new(&server.uri(), Arc::new(StaticToken));
        let response = handle(&client, &json!({"type": "events", "calId": "primary"})).await;

        assert_eq!(response, Response::failure("API error 404"));
    }
}
