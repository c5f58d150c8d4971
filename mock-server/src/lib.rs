use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sid";
const SESSION_USER_ID_KEY: &str = "user_id";

/// Listener settings read from the environment (`PORT`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct SignUpBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct NoteBody {
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    notes: HashMap<String, Note>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error response in the `{"error": "..."}` shape the client expects.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }
}

const NOT_AUTHENTICATED: ApiError = ApiError::new(StatusCode::UNAUTHORIZED, "User not authenticated");
const PARAMETERS_MISSING: ApiError = ApiError::new(StatusCode::BAD_REQUEST, "Parameters missing");
const INVALID_CREDENTIALS: ApiError = ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials");
const TITLE_MISSING: ApiError = ApiError::new(StatusCode::BAD_REQUEST, "Note must have a title");
const INVALID_NOTE_ID: ApiError = ApiError::new(StatusCode::BAD_REQUEST, "Invalid note id");
const NOTE_NOT_FOUND: ApiError = ApiError::new(StatusCode::NOT_FOUND, "Note not found");
const NOT_NOTE_OWNER: ApiError = ApiError::new(StatusCode::UNAUTHORIZED, "You cannot access this note");
const SESSION_UNAVAILABLE: ApiError =
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Session store unavailable");
const USERNAME_TAKEN: ApiError = ApiError::new(
    StatusCode::CONFLICT,
    "Username already taken. Please choose a different one or log in instead.",
);
const EMAIL_TAKEN: ApiError = ApiError::new(
    StatusCode::CONFLICT,
    "A user with this email address already exists. Please log in instead.",
);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, message = self.message, "rejecting request");
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(e: tower_sessions::session::Error) -> Self {
        tracing::error!("session store failure: {e}");
        SESSION_UNAVAILABLE
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(false)
        .with_same_site(SameSite::Lax);

    Router::new()
        .route("/api/users", get(get_authenticated_user))
        .route("/api/users/signup", post(sign_up))
        .route("/api/users/login", post(login))
        .route("/api/users/logout", post(logout))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", patch(update_note).delete(delete_note))
        .with_state(db)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn authenticated_user_id(session: &Session) -> Result<String, ApiError> {
    session
        .get::<String>(SESSION_USER_ID_KEY)
        .await?
        .ok_or(NOT_AUTHENTICATED)
}

/// Bind `session` to `user_id` under a fresh session id.
async fn start_session(session: &Session, user_id: &str) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn get_authenticated_user(
    State(db): State<Db>,
    session: Session,
) -> Result<Json<User>, ApiError> {
    let user_id = authenticated_user_id(&session).await?;
    let store = db.read().await;
    store
        .accounts
        .get(&user_id)
        .map(|account| Json(account.user.clone()))
        .ok_or(NOT_AUTHENTICATED)
}

async fn sign_up(
    State(db): State<Db>,
    session: Session,
    Json(input): Json<SignUpBody>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let (Some(username), Some(email), Some(password)) = (
        non_empty(input.username),
        non_empty(input.email),
        non_empty(input.password),
    ) else {
        return Err(PARAMETERS_MISSING);
    };

    let user = {
        let mut store = db.write().await;
        if store.accounts.values().any(|a| a.user.username == username) {
            return Err(USERNAME_TAKEN);
        }
        if store
            .accounts
            .values()
            .any(|a| a.user.email.as_deref() == Some(email.as_str()))
        {
            return Err(EMAIL_TAKEN);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            email: Some(email),
        };
        store.accounts.insert(
            user.id.clone(),
            Account {
                user: user.clone(),
                password,
            },
        );
        user
    };

    start_session(&session, &user.id).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(db): State<Db>,
    session: Session,
    Json(input): Json<LoginBody>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let (Some(username), Some(password)) = (non_empty(input.username), non_empty(input.password))
    else {
        return Err(PARAMETERS_MISSING);
    };

    let user = db
        .read()
        .await
        .accounts
        .values()
        .find(|a| a.user.username == username)
        .filter(|a| a.password == password)
        .map(|a| a.user.clone())
        .ok_or(INVALID_CREDENTIALS)?;

    start_session(&session, &user.id).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn logout(session: Session) -> Result<StatusCode, ApiError> {
    session.flush().await?;
    Ok(StatusCode::OK)
}

async fn list_notes(State(db): State<Db>, session: Session) -> Result<Json<Vec<Note>>, ApiError> {
    let user_id = authenticated_user_id(&session).await?;
    let store = db.read().await;
    let mut notes: Vec<Note> = store
        .notes
        .values()
        .filter(|n| n.user_id == user_id)
        .cloned()
        .collect();
    notes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(notes))
}

async fn create_note(
    State(db): State<Db>,
    session: Session,
    Json(input): Json<NoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let user_id = authenticated_user_id(&session).await?;
    let title = non_empty(input.title).ok_or(TITLE_MISSING)?;

    let now = Utc::now();
    let note = Note {
        id: Uuid::new_v4().to_string(),
        user_id,
        title,
        text: input.text,
        created_at: now,
        updated_at: now,
    };
    db.write().await.notes.insert(note.id.clone(), note.clone());
    Ok((StatusCode::CREATED, Json(note)))
}

/// Look up a note owned by `user_id`, distinguishing malformed, unknown and
/// foreign ids.
fn owned_note<'a>(store: &'a mut Store, id: &str, user_id: &str) -> Result<&'a mut Note, ApiError> {
    Uuid::parse_str(id).map_err(|_| INVALID_NOTE_ID)?;
    let note = store.notes.get_mut(id).ok_or(NOTE_NOT_FOUND)?;
    if note.user_id != user_id {
        return Err(NOT_NOTE_OWNER);
    }
    Ok(note)
}

async fn update_note(
    State(db): State<Db>,
    Path(id): Path<String>,
    session: Session,
    Json(input): Json<NoteBody>,
) -> Result<Json<Note>, ApiError> {
    let user_id = authenticated_user_id(&session).await?;
    let title = non_empty(input.title).ok_or(TITLE_MISSING)?;

    let mut store = db.write().await;
    let note = owned_note(&mut store, &id, &user_id)?;
    note.title = title;
    note.text = input.text;
    note.updated_at = Utc::now();
    Ok(Json(note.clone()))
}

async fn delete_note(
    State(db): State<Db>,
    Path(id): Path<String>,
    session: Session,
) -> Result<StatusCode, ApiError> {
    let user_id = authenticated_user_id(&session).await?;
    let mut store = db.write().await;
    owned_note(&mut store, &id, &user_id)?;
    store.notes.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
