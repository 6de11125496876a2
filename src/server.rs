//! Server assembly: router construction, startup, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::{AppState, SharedState, api_router};
use crate::config::Config;
use crate::github::{self, GitHubIssues};
use crate::throttle::Throttle;

/// Runtime options for the gateway server.
pub struct ServerConfig {
    pub config: Config,
    /// Permissive CORS for a local frontend dev server.
    pub dev_mode: bool,
}

/// Build the application state from resolved configuration.
///
/// The issue sink stays `None` unless both a token and a valid repo slug are
/// present; the server still starts so `/health` keeps working, and
/// submissions are answered with the not-configured error.
pub fn build_state(config: &Config) -> SharedState {
    let issues = match (&config.github_token, &config.github.repo) {
        (Some(token), Some(repo)) => match github::parse_owner_repo(repo) {
            Some(slug) => {
                Some(Arc::new(GitHubIssues::new(token.clone(), slug))
                    as Arc<dyn github::IssueSink>)
            }
            None => {
                tracing::warn!(repo = %repo, "Configured repo is not an owner/repo slug");
                None
            }
        },
        _ => None,
    };

    if issues.is_none() {
        tracing::warn!("No issue sink configured; submissions will be rejected");
    }

    Arc::new(AppState {
        throttle: Throttle::new(
            Duration::from_secs(config.limits.min_interval_secs),
            config.limits.max_tracked_clients,
        ),
        issues,
        min_message_len: config.limits.min_message_len,
        max_message_len: config.limits.max_message_len,
    })
}

/// Build the full application router.
pub fn build_router(state: SharedState) -> Router {
    api_router().with_state(state)
}

/// Start the gateway and serve until Ctrl-C.
pub async fn start_server(server_config: ServerConfig) -> Result<()> {
    let state = build_state(&server_config.config);
    let mut app = build_router(state);

    if server_config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!(
        "{}:{}",
        server_config.config.server.host, server_config.config.server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "Contact gateway listening");
    println!("formgate running at http://{}", local_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    println!("\nShutting down...");
}
