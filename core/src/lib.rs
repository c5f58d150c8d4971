//! Synchronous API client core for the notes service.
//!
//! # Overview
//! Covers user sessions (signup, login, logout, current user) and note CRUD.
//! Every operation is one outbound request and one parsed response; non-2xx
//! statuses come back as a closed set of `ApiError` variants.
//!
//! # Design
//! - `NotesClient` is stateless and does no I/O. Each operation is split into
//!   `build_*` (produces an `HttpRequest`) and `parse_*` (consumes an
//!   `HttpResponse`), so hosts with their own I/O can reuse it.
//! - `RequestGateway` drives a `Transport` between the two halves and logs
//!   every failure through `tracing`.
//! - `UreqTransport` (feature `ureq`, default) is the blocking transport; it
//!   keeps the session cookie between calls.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod transport;
pub mod types;

pub use client::NotesClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use gateway::RequestGateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, TransportError};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{ErrorBody, LoginCredentials, Note, NoteInput, SignUpCredentials, User};
