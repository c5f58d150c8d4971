//! Domain DTOs for the notes API.
//!
//! # Design
//! These mirror the backend's JSON schema but are defined independently of
//! the mock-server crate. Integration tests catch any drift between the two.
//! Field names follow the wire format (`_id`, `userId`, `createdAt`) through
//! serde renames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for `POST /api/users/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignUpCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for `POST /api/users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Payload for creating or updating a note. `text` is omitted from the JSON
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A user as returned by the backend.
///
/// Only `_id` and `username` are required. Any other field the backend sends
/// is kept in `extra`, so re-serializing yields the same object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A note as returned by the backend.
///
/// Only `_id` and `title` are required; unknown fields land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error envelope the backend sends with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_input_omits_missing_text() {
        let json = serde_json::to_value(NoteInput::new("Only title")).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Only title" }));
    }

    #[test]
    fn note_input_keeps_field_order() {
        let body = serde_json::to_string(&NoteInput::new("A").with_text("B")).unwrap();
        assert_eq!(body, r#"{"title":"A","text":"B"}"#);
    }

    #[test]
    fn note_decodes_wire_names() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"n1","userId":"u1","title":"T","text":"body",
                "createdAt":"2024-01-02T03:04:05Z","updatedAt":"2024-01-02T03:04:05.500Z"}"#,
        )
        .unwrap();
        assert_eq!(note.id, "n1");
        assert_eq!(note.user_id.as_deref(), Some("u1"));
        assert_eq!(note.text.as_deref(), Some("body"));
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn note_without_text_decodes() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"n1","userId":"u1","title":"T",
                "createdAt":"2024-01-02T03:04:05Z","updatedAt":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert!(note.text.is_none());
    }

    #[test]
    fn user_keeps_unknown_fields() {
        let body = serde_json::json!({
            "_id": "u1",
            "username": "alice",
            "email": "a@x",
            "createdAt": "2024-01-02T03:04:05.000Z",
            "__v": 0
        });
        let user: User = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(user.extra["__v"], 0);
        assert!(!user.extra.contains_key("username"));
        assert_eq!(serde_json::to_value(&user).unwrap(), body);
    }

    #[test]
    fn note_keeps_unknown_fields() {
        let body = serde_json::json!({
            "_id": "n1",
            "userId": "u1",
            "title": "T",
            "createdAt": "2024-01-02T03:04:05Z",
            "updatedAt": "2024-01-02T03:04:05Z",
            "__v": 0,
            "pinned": true
        });
        let note: Note = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(note.extra.len(), 2);
        assert_eq!(serde_json::to_value(&note).unwrap(), body);
    }

    #[test]
    fn note_needs_only_id_and_title() {
        let note: Note = serde_json::from_str(r#"{"_id":"n1","title":"T"}"#).unwrap();
        assert!(note.user_id.is_none());
        assert!(note.created_at.is_none());
        assert!(note.extra.is_empty());
        assert!(serde_json::from_str::<Note>(r#"{"_id":"n1"}"#).is_err());
    }

    #[test]
    fn user_email_is_optional() {
        let user: User = serde_json::from_str(r#"{"_id":"u1","username":"alice"}"#).unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.email.is_none());
    }

    #[test]
    fn error_body_requires_error_field() {
        assert!(serde_json::from_str::<ErrorBody>(r#"{"message":"nope"}"#).is_err());
    }
}
