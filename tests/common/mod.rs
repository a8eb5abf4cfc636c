use noteworks::config::Config;
use noteworks::server::{router, AppState};
use noteworks::store::SharedStore;

/// Bind the app to an ephemeral port and return its address plus the
/// store handle for direct state assertions.
pub async fn spawn_server_with(config: Config) -> (String, SharedStore) {
    let store = SharedStore::new();
    let state = AppState::new(store.clone(), &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    (addr.to_string(), store)
}

pub async fn spawn_server() -> (String, SharedStore) {
    spawn_server_with(Config { http_port: 0, ..Config::default() }).await
}

/// HTTP client with a cookie jar and redirects left unfollowed, so
/// the logout redirect is observable.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
