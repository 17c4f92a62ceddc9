//! contexto-relay binary entrypoint: forwards `/api/*` to the ranking service and
//! serves the static client for everything else.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use contexto_relay::{config::AppConfig, routes, state::AppState};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("loading configuration")?;
    let proxy = config.proxy;
    let app_state = AppState::new(&proxy).context("building upstream client")?;

    let app = build_router(routes::router(app_state, &proxy.static_dir));

    let addr = SocketAddr::from(([0, 0, 0, 0], proxy.port));
    info!(
        %addr,
        upstream = %proxy.upstream_base,
        prefix = %proxy.api_prefix,
        static_dir = %proxy.static_dir.display(),
        "starting server"
    );

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Attach cross-cutting middleware layers.
fn build_router(router: Router<()>) -> Router<()> {
    router.layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
