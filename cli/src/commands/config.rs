// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use gantry_core::domain::config::GatewayManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (secrets redacted)
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./gantry-config.yaml)
        #[arg(short, long, default_value = "./gantry-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let manifest = GatewayManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. GANTRY_CONFIG_PATH: {}",
            std::env::var("GANTRY_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./gantry-config.yaml");
        println!("  4. ~/.gantry/config.yaml");
        println!("  5. /etc/gantry/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Instance:".bold());
    println!("  Name: {}", manifest.metadata.name);
    if let Some(version) = &manifest.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    println!("{}", "Server:".bold());
    println!("  Bind address: {}", manifest.spec.server.bind_address);
    println!("  Port: {}", manifest.spec.server.port);
    println!(
        "  Body limit: {} bytes",
        manifest.spec.server.request_body_limit_bytes
    );
    println!();

    println!("{}", "Access Gate:".bold());
    println!(
        "  Shared secret: {}",
        redact(&manifest.spec.auth.shared_secret)
    );
    println!("  Signing key: {}", redact(&manifest.spec.auth.signing_key));
    if manifest.spec.auth.dev_mode {
        println!("  Dev mode: {}", "enabled (weakened gate)".yellow());
    } else {
        println!("  Dev mode: disabled");
    }
    println!();

    println!("{}", "LLM Collaborator:".bold());
    println!("  Provider: {}", manifest.spec.llm.provider.bold());
    if let Some(endpoint) = &manifest.spec.llm.endpoint {
        println!("  Endpoint: {}", endpoint);
    }
    println!(
        "  Model: {}",
        manifest
            .spec
            .llm
            .model
            .as_deref()
            .unwrap_or("(provider default)")
    );
    println!(
        "  API key: {}",
        redact_opt(manifest.spec.llm.api_key.as_deref())
    );
    println!("  Max tokens: {}", manifest.spec.llm.max_tokens);
    println!("  Temperature: {}", manifest.spec.llm.temperature);
    println!();

    println!("{}", "DevOps Collaborator:".bold());
    println!("  Provider: {}", manifest.spec.devops.provider.bold());
    println!("  API URL: {}", manifest.spec.devops.api_url);
    println!(
        "  Token: {}",
        redact_opt(manifest.spec.devops.token.as_deref())
    );
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let manifest = GatewayManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    manifest
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

/// Configured secret values never reach the terminal; "env:VAR" references
/// are safe to display as written.
fn redact(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else if value.starts_with("env:") {
        value.to_string()
    } else {
        "(set, redacted)".to_string()
    }
}

fn redact_opt(value: Option<&str>) -> String {
    value.map(redact).unwrap_or_else(|| "(not set)".to_string())
}
