use anyhow::Context;
use morsel::config::MorselConfig;
use morsel::http::router;
use morsel::runtime::build_runtime;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MorselConfig::load().context("failed to load configuration")?;
    let bundle = build_runtime(&config).context("failed to build chat runtime")?;

    let providers = bundle.chat.available_provider_names();
    if providers.is_empty() {
        warn!(
            phase = "startup",
            event = "no_providers",
            "no AI provider keys configured; chat requests will fail with 500"
        );
    }
    info!(
        phase = "startup",
        event = "runtime_ready",
        providers = ?providers,
        tools = ?bundle.tool_names,
        "chat runtime ready"
    );

    let app = router(bundle.chat, &config.chat_path);
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        phase = "startup",
        event = "listening",
        bind = %config.bind,
        chat_path = %config.chat_path,
        "morsel listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!(phase = "shutdown", event = "stopped", "morsel stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(phase = "shutdown", event = "signal_error", error = %err, "failed to listen for ctrl-c");
    }
}
