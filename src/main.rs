use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let config = noteworks::config::Config::from_env();
    info!(
        target: "noteworks",
        "Noteworks starting: RUST_LOG='{}', http_port={}, session_ttl_days={}, ws_idle_timeout_secs={}",
        rust_log, config.http_port, config.session_ttl_days, config.ws_idle_timeout_secs
    );

    noteworks::server::run_with_config(config).await
}
