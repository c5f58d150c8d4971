//! Stateless HTTP request builder and response parser for the notes API.
//!
//! # Design
//! `NotesClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Status classification happens once, in `classify`, before any payload is
//! decoded.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ErrorBody, LoginCredentials, Note, NoteInput, SignUpCredentials, User};

/// Characters escaped in a single path segment, so an id can never reach a
/// different route.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn note_path(note_id: &str) -> String {
    format!("/api/notes/{}", utf8_percent_encode(note_id, PATH_SEGMENT))
}

/// Synchronous, stateless client for the notes API.
#[derive(Debug, Clone)]
pub struct NotesClient {
    base_url: String,
}

impl NotesClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_logged_in_user(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/users")
    }

    pub fn build_sign_up(&self, credentials: &SignUpCredentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/users/signup", credentials)
    }

    pub fn build_login(&self, credentials: &LoginCredentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/users/login", credentials)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/api/users/logout")
    }

    pub fn build_fetch_notes(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/notes")
    }

    pub fn build_create_note(&self, note: &NoteInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/notes", note)
    }

    pub fn build_update_note(&self, note_id: &str, note: &NoteInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &note_path(note_id), note)
    }

    pub fn build_delete_note(&self, note_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &note_path(note_id))
    }

    pub fn parse_get_logged_in_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        decode(response)
    }

    pub fn parse_sign_up(&self, response: HttpResponse) -> Result<User, ApiError> {
        decode(response)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<User, ApiError> {
        decode(response)
    }

    /// Only the status is inspected; the body is never decoded.
    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        classify(&response)
    }

    pub fn parse_fetch_notes(&self, response: HttpResponse) -> Result<Vec<Note>, ApiError> {
        decode(response)
    }

    pub fn parse_create_note(&self, response: HttpResponse) -> Result<Note, ApiError> {
        decode(response)
    }

    pub fn parse_update_note(&self, response: HttpResponse) -> Result<Note, ApiError> {
        decode(response)
    }

    /// Only the status is inspected; the body is never decoded.
    pub fn parse_delete_note(&self, response: HttpResponse) -> Result<(), ApiError> {
        classify(&response)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Map a response onto `Ok(())` for any 2xx status, or onto the matching
/// `ApiError` variant.
///
/// 401 and 409 must carry `{"error": "..."}`; a body without that field is
/// reported as `Deserialization` rather than guessed at.
pub fn classify(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        401 => Err(ApiError::Unauthorized(error_message(response)?)),
        409 => Err(ApiError::Conflict(error_message(response)?)),
        status => Err(ApiError::Status {
            status,
            body: response.body.clone(),
        }),
    }
}

fn error_message(response: &HttpResponse) -> Result<String, ApiError> {
    serde_json::from_str::<ErrorBody>(&response.body)
        .map(|body| body.error)
        .map_err(|e| {
            ApiError::Deserialization(format!(
                "status {} without an error message: {e}",
                response.status
            ))
        })
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    classify(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
