//! # NotY Binary
//!
//! Loads settings, wires the SQLite store and the auth adapters into the
//! services, and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{build_router, AppState, RouterOptions};
use auth_adapters::{Argon2Hasher, JwtTokenProvider};
use configs::{LoggingSettings, Settings};
use secrecy::ExposeSecret;
use services::{AuthOptions, AuthService, BlockService, PageService};
use storage_adapters::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.logging)?;

    let store = Arc::new(
        SqliteStore::connect(&settings.database.url, settings.database.max_connections)
            .await
            .context("opening database")?,
    );

    let tokens = JwtTokenProvider::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        chrono::Duration::days(settings.auth.token_ttl_days),
    );
    let auth = AuthService::new(
        store.clone(),
        store.clone(),
        Arc::new(Argon2Hasher::new()),
        Arc::new(tokens),
        AuthOptions {
            provision_first_page: settings.auth.provision_first_page,
        },
    );
    let pages = PageService::new(store.clone(), store.clone(), store.clone());
    let blocks = BlockService::new(store, pages.documents().clone());

    let router = build_router(
        AppState::new(auth, pages, blocks),
        RouterOptions {
            cors_allow_any_origin: settings.server.cors_allow_any_origin,
        },
    );

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "NotY API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("shut down cleanly");
    Ok(())
}

fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("parsing log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
