//! Normalizes the ad hoc success markers of each endpoint into one `Result`.
//!
//! Endpoints signal success in different ways: `status: "success"`,
//! `success: true`, a fixed `message`, or simply returning an array. Callers in
//! [`crate::client`] pick the check matching the endpoint and screens only ever
//! see a typed payload or an [`Error`].

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) struct Reply(Value);

/// Sends one request and reads its body as JSON. No retry.
pub(crate) async fn send(request: RequestBuilder) -> Result<Reply> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "api request failed");
            return Err(Error::Network(err));
        }
    };
    let endpoint = response.url().path().to_string();
    let status = response.status();
    let body = response.bytes().await.map_err(|err| {
        warn!(%endpoint, error = %err, "reading api response failed");
        Error::Network(err)
    })?;
    debug!(%endpoint, %status, bytes = body.len(), "api response");

    let value = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            warn!(%endpoint, %status, "api returned an error status");
            return Err(Error::api(format!("request failed with HTTP {status}")));
        }
        Err(err) => {
            warn!(%endpoint, error = %err, "api returned invalid json");
            return Err(Error::Parse(err));
        }
    };
    let reply = Reply(value);
    if !status.is_success() {
        warn!(%endpoint, %status, "api returned an error status");
        return Err(reply.failure(&format!("request failed with HTTP {status}")));
    }
    if reply.signals_failure() {
        warn!(%endpoint, message = reply.message().unwrap_or_default(), "api reported failure");
        return Err(reply.failure("Unknown error"));
    }
    Ok(reply)
}

impl Reply {
    #[cfg(test)]
    pub(crate) fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    /// `success: false` or `status: "error"` anywhere means the call failed.
    fn signals_failure(&self) -> bool {
        matches!(self.0.get("success"), Some(Value::Bool(false)))
            || self.0.get("status").and_then(Value::as_str) == Some("error")
    }

    fn failure(&self, fallback: &str) -> Error {
        Error::api(self.message().unwrap_or(fallback))
    }

    pub fn expect_status_success(self) -> Result<Self> {
        if self.0.get("status").and_then(Value::as_str) == Some("success") {
            Ok(self)
        } else {
            Err(self.failure("Unknown error"))
        }
    }

    pub fn expect_success_flag(self) -> Result<Self> {
        if truthy(self.0.get("success")) {
            Ok(self)
        } else {
            Err(self.failure("Request failed"))
        }
    }

    pub fn expect_message(self, expected: &str, fallback: &str) -> Result<Self> {
        if self.message() == Some(expected) {
            Ok(self)
        } else {
            Err(self.failure(fallback))
        }
    }

    /// The server's `message`, required to be present.
    pub fn into_message(self, fallback: &str) -> Result<String> {
        self.message().map(str::to_string).ok_or_else(|| Error::api(fallback))
    }

    pub fn flag(&self, name: &str) -> bool {
        truthy(self.0.get(name))
    }

    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        match self.0.get(name) {
            Some(value) => serde_json::from_value(value.clone()).map_err(Error::Parse),
            None => Err(self.failure(&format!("response is missing `{name}`"))),
        }
    }

    pub fn optional_field<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(Error::Parse),
        }
    }

    pub fn array<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        if self.0.is_array() {
            serde_json::from_value(self.0).map_err(Error::Parse)
        } else {
            Err(self.failure("Unexpected response format"))
        }
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_carries_server_message() {
        let reply = Reply::from_value(json!({ "status": "error", "message": "Group not found" }));
        assert!(reply.signals_failure());
        match reply.expect_status_success() {
            Err(Error::Api(message)) => assert_eq!(message, "Group not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_an_api_error() {
        let reply = Reply::from_value(json!({ "status": "success" }));
        match reply.field::<Vec<Value>>("chats") {
            Err(Error::Api(message)) => assert!(message.contains("chats")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let reply = Reply::from_value(json!({ "users": "nope" }));
        assert!(matches!(reply.field::<Vec<Value>>("users"), Err(Error::Parse(_))));
    }

    #[test]
    fn object_where_array_expected() {
        let reply = Reply::from_value(json!({ "message": "No messages" }));
        match reply.array::<Value>() {
            Err(Error::Api(message)) => assert_eq!(message, "No messages"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn success_flag_accepts_php_truthiness() {
        assert!(Reply::from_value(json!({ "success": 1 })).expect_success_flag().is_ok());
        assert!(Reply::from_value(json!({ "success": "true" })).expect_success_flag().is_ok());
        assert!(Reply::from_value(json!({ "success": 0 })).expect_success_flag().is_err());
    }

    #[test]
    fn login_message_must_match() {
        let reply = Reply::from_value(json!({ "message": "Invalid password" }));
        match reply.expect_message("Login successful", "Login failed") {
            Err(Error::Api(message)) => assert_eq!(message, "Invalid password"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
