//! One request in, one classified result out.
//!
//! # Design
//! `RequestGateway` pairs a `NotesClient` with a `Transport`. Every public
//! operation is `build_*` → `send` → `parse_*`. `send` is the only place that
//! touches the transport: it turns "no response" into `ApiError::Transport`,
//! classifies non-2xx statuses, and logs every failure before returning it.

use crate::client::{classify, NotesClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{LoginCredentials, Note, NoteInput, SignUpCredentials, User};

pub struct RequestGateway<T> {
    client: NotesClient,
    transport: T,
}

impl<T: Transport> RequestGateway<T> {
    pub fn new(client: NotesClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &NotesClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue `request` and return the raw response if its status is 2xx.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(%method, %path, "sending request");

        let result = self
            .transport
            .execute(request)
            .map_err(|e| ApiError::Transport(e.to_string()))
            .and_then(|response| classify(&response).map(|()| response));

        match &result {
            Ok(response) => tracing::debug!(%method, %path, status = response.status, "request succeeded"),
            Err(e) => tracing::error!(%method, %path, error = %e, "request failed"),
        }
        result
    }

    pub fn get_logged_in_user(&self) -> Result<User, ApiError> {
        self.round_trip(
            Ok(self.client.build_get_logged_in_user()),
            NotesClient::parse_get_logged_in_user,
        )
    }

    pub fn sign_up(&self, credentials: &SignUpCredentials) -> Result<User, ApiError> {
        self.round_trip(self.client.build_sign_up(credentials), NotesClient::parse_sign_up)
    }

    pub fn login(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        self.round_trip(self.client.build_login(credentials), NotesClient::parse_login)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.round_trip(Ok(self.client.build_logout()), NotesClient::parse_logout)
    }

    pub fn fetch_notes(&self) -> Result<Vec<Note>, ApiError> {
        self.round_trip(Ok(self.client.build_fetch_notes()), NotesClient::parse_fetch_notes)
    }

    pub fn create_note(&self, note: &NoteInput) -> Result<Note, ApiError> {
        self.round_trip(self.client.build_create_note(note), NotesClient::parse_create_note)
    }

    pub fn update_note(&self, note_id: &str, note: &NoteInput) -> Result<Note, ApiError> {
        self.round_trip(
            self.client.build_update_note(note_id, note),
            NotesClient::parse_update_note,
        )
    }

    pub fn delete_note(&self, note_id: &str) -> Result<(), ApiError> {
        self.round_trip(
            Ok(self.client.build_delete_note(note_id)),
            NotesClient::parse_delete_note,
        )
    }

    fn round_trip<R, F>(&self, request: Result<HttpRequest, ApiError>, parse: F) -> Result<R, ApiError>
    where
        F: FnOnce(&NotesClient, HttpResponse) -> Result<R, ApiError>,
    {
        let request = request.inspect_err(|e| tracing::error!(error = %e, "failed to build request"))?;
        let method = request.method;
        let path = request.path.clone();

        let response = self.send(request)?;
        parse(&self.client, response)
            .inspect_err(|e| tracing::error!(%method, %path, error = %e, "failed to decode response"))
    }
}

#[cfg(feature = "ureq")]
impl RequestGateway<crate::transport::UreqTransport> {
    /// Gateway over a fresh `UreqTransport` pointed at `config.base_url`.
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self::new(
            NotesClient::new(&config.base_url),
            crate::transport::UreqTransport::new(),
        )
    }
}
