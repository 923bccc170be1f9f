//! # Voice Flow Backend - Main Application Entry Point
//!
//! HTTP backend for a Speechmatics voice-chat frontend. The browser never
//! holds the Speechmatics API key; it asks this server for a short-lived
//! signed credential instead, and talks to the conversation-session
//! endpoints mocked out here.
//!
//! ## Application architecture:
//! - **config**: layered configuration (TOML file + environment variables)
//! - **token**: Speechmatics credential signing (the API key stays here)
//! - **auth**: bearer-key gate in front of every non-health endpoint
//! - **state**: immutable config + token issuer + request metrics
//! - **middleware**: request logging and metrics collection
//! - **handlers**: credential issuance and mock conversation sessions
//! - **health**: liveness, service info, and metrics endpoints
//!
//! Startup is strict about configuration: a missing Speechmatics API key
//! aborts the process before the server binds, and a placeholder caller key
//! produces a loud warning because it means the gate is effectively open.

mod auth;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod state;
mod token;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use crate::config::AppConfig;
use crate::state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Global shutdown flag set by the signal handlers.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    // Configuration problems are fatal here, before anything binds. This is
    // the one place a missing signing key is allowed to surface.
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting voice-flow-backend v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);

    if config.auth.caller_key_is_placeholder() {
        warn!(
            "BACKEND_API_KEY is unset or still the shipped placeholder; \
             the request gate accepts a publicly known value. Set a real key \
             before exposing this server."
        );
    }

    let app_state = AppState::new(config.clone());
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        // Origins are pinned to the configured frontend hosts; credentials
        // stay enabled so the browser can send the bearer header.
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &app_state.config.cors.allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(middleware::RequestTelemetry)
            .service(
                web::scope("/api/v1")
                    .route("/credential", web::post().to(handlers::issue_credential))
                    .route(
                        "/conversation/start",
                        web::post().to(handlers::start_conversation),
                    )
                    .route(
                        "/conversation/{session_id}/end",
                        web::post().to(handlers::end_conversation),
                    )
                    .route(
                        "/conversation/{session_id}/status",
                        web::get().to(handlers::conversation_status),
                    )
                    .route("/metrics", web::get().to(health::detailed_metrics)),
            )
            .route("/", web::get().to(health::service_info))
            .route("/health", web::get().to(health::health_check))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Initialize structured logging. `RUST_LOG` overrides the default filter.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_flow_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Listen for SIGTERM/SIGINT and flip the shutdown flag.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
