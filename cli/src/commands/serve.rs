// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway server command
//!
//! Loads the manifest, wires the collaborators and serves the agent API
//! until ctrl-c or SIGTERM.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use gantry_core::application::ServiceSet;
use gantry_core::domain::config::GatewayManifest;
use gantry_core::infrastructure::AccessGate;
use gantry_core::presentation;

pub async fn run(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut manifest =
        GatewayManifest::load_or_default(config_path).context("Failed to load configuration")?;

    // Flags win over both the file and environment overrides
    if let Some(host) = host {
        manifest.spec.server.bind_address = host;
    }
    if let Some(port) = port {
        manifest.spec.server.port = port;
    }

    manifest
        .validate()
        .context("Configuration validation failed")?;

    info!(
        instance = %manifest.metadata.name,
        llm = %manifest.spec.llm.provider,
        devops = %manifest.spec.devops.provider,
        "Configuration loaded"
    );
    if manifest.spec.auth.dev_mode {
        warn!("Development mode is enabled; the shared secret bypasses token verification");
    }

    let gate = AccessGate::from_config(&manifest.spec.auth);
    let services =
        ServiceSet::from_config(&manifest.spec).context("Failed to initialize collaborators")?;

    let app = presentation::app(
        gate,
        services,
        manifest.metadata.name.clone(),
        manifest.spec.server.request_body_limit_bytes,
    );

    let addr = format!(
        "{}:{}",
        manifest.spec.server.bind_address, manifest.spec.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Gantry gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
