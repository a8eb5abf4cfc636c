//! Realtime channel tests: upgrade gating, message dispatch and the
//! idle deadline, driven over a real WebSocket connection.

mod common;

use common::{spawn_server, spawn_server_with};
use futures::{SinkExt, StreamExt};
use noteworks::config::Config;
use noteworks::identity::SessionManager;
use noteworks::model::{Note, User};
use noteworks::store::SharedStore;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error, Message};

fn seed_user(store: &SharedStore, email: &str) -> String {
    store
        .insert_user_if_absent(User {
            id: uuid::Uuid::new_v4().to_string(),
            name: "T".into(),
            email: email.into(),
            password_hash: "phc".into(),
        })
        .unwrap();
    SessionManager::new(store.clone(), 30).create(email).unwrap()
}

async fn connect(
    addr: &str,
    token: &str,
) -> tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
> {
    let mut req = format!("ws://{addr}/api/notes/socket").into_client_request().unwrap();
    req.headers_mut()
        .insert("Cookie", format!("session={token}").parse().unwrap());
    let (ws, _) = tokio_tungstenite::connect_async(req).await.unwrap();
    ws
}

#[tokio::test]
async fn upgrade_without_session_is_refused() {
    let (addr, _store) = spawn_server().await;
    let req = format!("ws://{addr}/api/notes/socket").into_client_request().unwrap();
    match tokio_tungstenite::connect_async(req).await {
        Err(Error::Http(resp)) => assert_eq!(resp.status(), 401),
        other => panic!("expected refused upgrade, got {other:?}"),
    }
}

#[tokio::test]
async fn ping_gets_pong() {
    let (addr, store) = spawn_server().await;
    let token = seed_user(&store, "a@x.com");
    let mut ws = connect(&addr, &token).await;

    ws.send(Message::Text(r#"{"type":"ping"}"#.into())).await.unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    assert_eq!(reply.into_text().unwrap(), r#"{"type": "pong"}"#);
}

#[tokio::test]
async fn modify_is_scoped_to_the_sessions_identity() {
    let (addr, store) = spawn_server().await;
    let token = seed_user(&store, "a@x.com");
    seed_user(&store, "b@x.com");
    store
        .insert_note(Note {
            id: "mine".into(),
            author: "a@x.com".into(),
            folder: "root".into(),
            title: String::new(),
            content: String::new(),
        })
        .unwrap();
    store
        .insert_note(Note {
            id: "theirs".into(),
            author: "b@x.com".into(),
            folder: "root".into(),
            title: String::new(),
            content: "untouched".into(),
        })
        .unwrap();

    let mut ws = connect(&addr, &token).await;

    // own note: store reflects the new content
    ws.send(Message::Text(
        r#"{"type":"modify","note":{"id":"mine","content":"x"}}"#.into(),
    ))
    .await
    .unwrap();
    assert_eq!(ws.next().await.unwrap().unwrap().into_text().unwrap(), "Modified");
    assert_eq!(store.find_note("mine").unwrap().unwrap().content, "x");

    // someone else's note: filter excludes it, no mutation, and the
    // reply does not claim success
    ws.send(Message::Text(
        r#"{"type":"modify","note":{"id":"theirs","content":"x"}}"#.into(),
    ))
    .await
    .unwrap();
    assert_eq!(ws.next().await.unwrap().unwrap().into_text().unwrap(), "404");
    assert_eq!(store.find_note("theirs").unwrap().unwrap().content, "untouched");
}

#[tokio::test]
async fn create_is_acknowledged_but_not_persisted() {
    let (addr, store) = spawn_server().await;
    let token = seed_user(&store, "a@x.com");
    let mut ws = connect(&addr, &token).await;

    ws.send(Message::Text(
        r#"{"type":"create","note":{"content":"over the wire"}}"#.into(),
    ))
    .await
    .unwrap();
    assert_eq!(ws.next().await.unwrap().unwrap().into_text().unwrap(), "Created");
    assert!(store.notes_by_author_and_folder("a@x.com", "root").unwrap().is_empty());
}

#[tokio::test]
async fn junk_frames_are_rejected_and_the_connection_survives() {
    let (addr, store) = spawn_server().await;
    let token = seed_user(&store, "a@x.com");
    let mut ws = connect(&addr, &token).await;

    ws.send(Message::Text("{not json".into())).await.unwrap();
    assert_eq!(ws.next().await.unwrap().unwrap().into_text().unwrap(), "400");

    ws.send(Message::Text(r#"{"type":"teleport"}"#.into())).await.unwrap();
    assert_eq!(ws.next().await.unwrap().unwrap().into_text().unwrap(), "400");

    // still open and serving
    ws.send(Message::Text(r#"{"type":"ping"}"#.into())).await.unwrap();
    assert_eq!(ws.next().await.unwrap().unwrap().into_text().unwrap(), r#"{"type": "pong"}"#);
}

#[tokio::test]
async fn idle_connections_are_closed_after_the_deadline() {
    let config = Config { http_port: 0, ws_idle_timeout_secs: 1, ..Config::default() };
    let (addr, store) = spawn_server_with(config).await;
    let token = seed_user(&store, "a@x.com");
    let mut ws = connect(&addr, &token).await;

    // no traffic: the server closes the connection after ~1s
    let next = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
        .await
        .expect("server should have closed the idle connection");
    match next {
        Some(Ok(Message::Close(_))) | None => {}
        other => panic!("expected close, got {other:?}"),
    }
}
