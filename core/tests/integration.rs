//! Full session and note lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every gateway
//! operation over real HTTP through `UreqTransport`. Validates that request
//! building, the cookie-carried session, status classification and response
//! parsing all work end-to-end with the actual server.

use notes_core::{
    ApiError, ClientConfig, LoginCredentials, NoteInput, NotesClient, RequestGateway,
    SignUpCredentials, UreqTransport,
};

/// Start the mock server on a random port and return its base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn alice() -> SignUpCredentials {
    SignUpCredentials {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "correct horse".to_string(),
    }
}

#[test]
fn session_and_note_lifecycle() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let config = ClientConfig {
        base_url: spawn_server(),
    };
    let gw = RequestGateway::from_config(&config);

    // Step 1: no session yet.
    let err = gw.get_logged_in_user().unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref msg) if msg == "User not authenticated"));

    // Step 2: sign up starts a session.
    let user = gw.sign_up(&alice()).unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    assert_eq!(gw.get_logged_in_user().unwrap(), user);

    // Step 3: signing up again conflicts.
    let err = gw.sign_up(&alice()).unwrap_err();
    match err {
        ApiError::Conflict(msg) => assert!(msg.starts_with("Username already taken")),
        other => panic!("expected Conflict, got {other:?}"),
    }

    // Step 4: create notes.
    let first = gw.create_note(&NoteInput::new("A").with_text("B")).unwrap();
    assert_eq!(first.title, "A");
    assert_eq!(first.text.as_deref(), Some("B"));
    assert_eq!(first.user_id.as_deref(), Some(user.id.as_str()));
    let second = gw.create_note(&NoteInput::new("Title only")).unwrap();
    assert!(second.text.is_none());

    // Step 5: list shows both.
    let notes = gw.fetch_notes().unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.contains(&first));
    assert!(notes.contains(&second));

    // Step 6: update replaces the title.
    let updated = gw
        .update_note(&first.id, &NoteInput::new("X").with_text("B"))
        .unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.title, "X");
    assert_eq!(updated.created_at, first.created_at);

    // Step 7: a note without a title is rejected by the backend.
    let err = gw.update_note(&first.id, &NoteInput::new("")).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));

    // Step 8: delete, then delete again.
    gw.delete_note(&second.id).unwrap();
    let err = gw.delete_note(&second.id).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert!(err.to_string().contains("404"));

    // Step 9: logout ends the session.
    gw.logout().unwrap();
    assert!(matches!(gw.get_logged_in_user(), Err(ApiError::Unauthorized(_))));
    assert!(matches!(gw.fetch_notes(), Err(ApiError::Unauthorized(_))));

    // Step 10: bad password, then a good login.
    let err = gw
        .login(&LoginCredentials {
            username: "alice".to_string(),
            password: "wrong".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref msg) if msg == "Invalid credentials"));

    let logged_in = gw
        .login(&LoginCredentials {
            username: "alice".to_string(),
            password: "correct horse".to_string(),
        })
        .unwrap();
    assert_eq!(logged_in.id, user.id);

    // Step 11: the remaining note survived the logout.
    let notes = gw.fetch_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "X");
}

#[test]
fn sessions_are_per_transport() {
    let base_url = spawn_server();
    let first = RequestGateway::new(NotesClient::new(&base_url), UreqTransport::new());
    let second = RequestGateway::new(NotesClient::new(&base_url), UreqTransport::new());

    first.sign_up(&alice()).unwrap();
    first.create_note(&NoteInput::new("mine")).unwrap();

    assert!(matches!(second.fetch_notes(), Err(ApiError::Unauthorized(_))));
}

#[test]
fn unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing is listening on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let gw = RequestGateway::new(NotesClient::new(&format!("http://{addr}")), UreqTransport::new());

    let err = gw.get_logged_in_user().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}
