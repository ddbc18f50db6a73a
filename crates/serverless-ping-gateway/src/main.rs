//! serverless-ping gateway - Main entry point
//!
//! Serves the functions declared in `functions.yaml` over HTTP:
//! - Matches method + path templates to functions
//! - Builds an invocation event per request
//! - Runs the function in-process and writes its response back

mod config;
mod manifest;
mod router;

use anyhow::{Context, Result};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::manifest::{FunctionsManifest, Route};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub routes: Vec<Route>,
}

impl AppState {
    pub fn new(config: AppConfig, manifest: &FunctionsManifest) -> Self {
        Self {
            config,
            routes: manifest.routes(),
        }
    }

    /// Strip the stage prefix from a request path. Returns `None` when a
    /// stage is configured and the path lies outside it.
    pub fn route_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let Some(stage) = &self.config.stage else {
            return Some(path);
        };

        let rest = path.strip_prefix('/')?.strip_prefix(stage.as_str())?;
        match rest {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,serverless_ping_gateway=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting serverless-ping gateway");

    // Load configuration
    let config = AppConfig::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    let manifest = FunctionsManifest::load(&config.manifest_path)?;
    manifest
        .validate(|name| serverless_ping::lookup(name).is_some())
        .context("Invalid functions manifest")?;

    let state = Arc::new(AppState::new(config.clone(), &manifest));
    for route in &state.routes {
        tracing::info!(
            function = %route.function,
            method = %route.method,
            path = %route.path,
            "Route registered"
        );
    }

    let app = router::create_gateway_router(state.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Service {} listening on {}", manifest.service, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_stage(stage: Option<&str>) -> AppState {
        let config = AppConfig {
            stage: stage.map(str::to_string),
            ..AppConfig::default()
        };
        AppState { config, routes: Vec::new() }
    }

    #[test]
    fn test_route_path_without_stage() {
        let state = state_with_stage(None);
        assert_eq!(state.route_path("/ping/1"), Some("/ping/1"));
    }

    #[test]
    fn test_route_path_with_stage() {
        let state = state_with_stage(Some("dev"));
        assert_eq!(state.route_path("/dev/ping/1"), Some("/ping/1"));
        assert_eq!(state.route_path("/dev"), Some("/"));
        assert_eq!(state.route_path("/devel/ping"), None);
        assert_eq!(state.route_path("/ping"), None);
    }
}
