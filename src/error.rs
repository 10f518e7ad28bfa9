// This file is part of bracket-sync.
//
// bracket-sync is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// bracket-sync is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Everything that can go wrong while synchronizing a tournament.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The owner can't talk to Challonge, usually because no API key is set.
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("invalid tournament: {0}")]
    InvalidTournament(String),

    /// No response was received at all.
    #[error("transport: {0}")]
    Transport(String),

    /// Challonge answered with a non-2xx status.
    #[error("{message}")]
    ExternalService {
        status: u16,
        message: String,
        raw: Value,
    },

    /// Strict mode could not confirm the tournament is absent from Challonge.
    #[error("indeterminate: {0}")]
    Indeterminate(String),
}

impl SyncError {
    /// Builds an [`SyncError::ExternalService`] from a response body.
    #[must_use]
    pub fn external(status: u16, body: Value) -> Self {
        let mut message = ErrorPayload::from_body(&body).message();
        if message.trim().is_empty() {
            message = format!("HTTP {status}");
        }

        Self::ExternalService {
            status,
            message,
            raw: body,
        }
    }

    /// Whether the same call may succeed if the caller tries again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Indeterminate(_) => true,
            Self::ExternalService { status, .. } => *status >= 500,
            Self::Configuration(_) | Self::InvalidTournament(_) => false,
        }
    }
}

/// The shapes Challonge uses for the `errors` field.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorPayload {
    Messages(Vec<String>),
    Message(String),
    Other(Value),
}

impl ErrorPayload {
    /// Picks the `errors` field out of a body, or uses the whole body if there
    /// is none.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        let errors = body.get("errors").unwrap_or(body);
        serde_json::from_value(errors.clone()).unwrap_or_else(|_| Self::Other(errors.clone()))
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Messages(messages) => messages.join(", "),
            Self::Message(message) => message.clone(),
            Self::Other(Value::Null) => String::new(),
            Self::Other(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_messages_are_joined() {
        let error = SyncError::external(
            422,
            json!({"errors": ["Name can't be blank", "Url is invalid"]}),
        );

        assert_eq!(error.to_string(), "Name can't be blank, Url is invalid");
    }

    #[test]
    fn single_error_string() {
        let error = SyncError::external(401, json!({"errors": "Unauthorized"}));
        assert_eq!(error.to_string(), "Unauthorized");

        let error = SyncError::external(502, Value::String("Bad Gateway".to_string()));
        assert_eq!(error.to_string(), "Bad Gateway");
    }

    #[test]
    fn error_objects_are_serialized() {
        let error = SyncError::external(422, json!({"errors": {"url": "taken"}}));
        assert_eq!(error.to_string(), r#"{"url":"taken"}"#);

        let error = SyncError::external(422, json!({"errors": ["taken", 3]}));
        assert_eq!(error.to_string(), r#"["taken",3]"#);
    }

    #[test]
    fn empty_body_uses_the_status() {
        let error = SyncError::external(503, Value::Null);
        assert_eq!(error.to_string(), "HTTP 503");
        assert!(error.is_retryable());
    }

    #[test]
    fn raw_payload_is_kept() {
        let body = json!({"errors": ["Url has already been taken"]});
        let SyncError::ExternalService {
            status,
            message,
            raw,
        } = SyncError::external(422, body.clone())
        else {
            panic!("expected an external service error");
        };

        assert_eq!(status, 422);
        assert_eq!(message, "Url has already been taken");
        assert_eq!(raw, body);
    }
}
