mod config;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use minitwit_api::routes;
use minitwit_api::state::AppStateInner;
use minitwit_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "minitwit_server=debug,minitwit_api=debug,minitwit_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    if config.sim_secret.is_empty() {
        warn!("SIM_AUTH is not set; every simulator request will be rejected");
    }

    let db = Database::open(&config.db_path)?;
    let state = AppStateInner::new(db, config.sim_secret.clone())?;

    let api = routes::router(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http());
    let metrics = routes::metrics_router(state);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let api_addr = config.api_addr()?;
    let metrics_addr = config.metrics_addr()?;

    // Either listener failing stops the process.
    tokio::try_join!(
        serve(api_addr, api, "MiniTwit API", shutdown_rx.clone()),
        serve(metrics_addr, metrics, "Metrics", shutdown_rx),
    )?;

    Ok(())
}

async fn serve(
    addr: std::net::SocketAddr,
    app: Router,
    name: &'static str,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{name}: cannot bind {addr}"))?;
    info!("{} listening on {}", name, addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .with_context(|| format!("{name} server failed"))?;
    info!("{} stopped", name);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serve_reports_an_address_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let (_tx, rx) = watch::channel(false);

        let err = serve(addr, Router::new(), "Metrics", rx).await.unwrap_err();
        assert!(err.to_string().contains("Metrics: cannot bind"), "{err:#}");
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let server = tokio::spawn(serve(
            "127.0.0.1:0".parse().unwrap(),
            Router::new(),
            "Metrics",
            rx,
        ));
        tx.send(true).unwrap();
        server.await.unwrap().unwrap();
    }
}
