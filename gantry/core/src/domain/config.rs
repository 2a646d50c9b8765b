// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema for Gantry gateway instances:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP server binding
// - Access gate credentials (shared secret, token signing key, dev mode)
// - LLM and DevOps collaborator selection
//
// All configuration is immutable after startup; secret values support
// "env:VAR_NAME" indirection resolved at construction time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayManifest {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    /// Instance metadata (name, labels, version)
    pub metadata: ManifestMetadata,

    /// Gateway configuration specification
    pub spec: GatewaySpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable instance name
    pub name: String,

    /// Optional: Configuration version for tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Optional: Labels for categorization and discovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Gateway configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaySpec {
    /// HTTP server binding
    #[serde(default)]
    pub server: ServerConfig,

    /// Access gate credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// LLM collaborator selection
    #[serde(default)]
    pub llm: LlmConfig,

    /// DevOps collaborator selection
    #[serde(default)]
    pub devops: DevOpsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_body_limit")]
    pub request_body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_body_limit_bytes: default_body_limit(),
        }
    }
}

/// Access gate credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Static operational credential. Accepted as a bearer token either under
    /// dev_mode (before signature verification) or as the last resort after a
    /// failed verification. Supports "env:VAR_NAME".
    #[serde(default)]
    pub shared_secret: String,

    /// HMAC-SHA256 key for signed bearer tokens. Supports "env:VAR_NAME".
    #[serde(default)]
    pub signing_key: String,

    /// Development-mode toggle. When set, a credential equal to
    /// `shared_secret` is accepted before any signature check runs. This is a
    /// materially weaker path than token verification; keep it off outside
    /// local development.
    #[serde(default)]
    pub dev_mode: bool,
}

impl AuthConfig {
    pub fn resolved_shared_secret(&self) -> String {
        resolve_secret(&self.shared_secret)
    }

    pub fn resolved_signing_key(&self) -> String {
        resolve_secret(&self.signing_key)
    }
}

/// Known LLM collaborator backends.
pub const LLM_PROVIDERS: [&str; 3] = ["simulated", "openai", "anthropic"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type: "simulated", "openai", "anthropic"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API endpoint override (for self-hosted compatible gateways)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default model identifier; requests may override per call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Token budget per generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(resolve_secret)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key: None,
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Known DevOps collaborator backends.
pub const DEVOPS_PROVIDERS: [&str; 2] = ["simulated", "github"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevOpsConfig {
    /// Provider type: "simulated", "github"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// REST API base URL
    #[serde(default = "default_devops_api_url")]
    pub api_url: String,

    /// Provider token (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl DevOpsConfig {
    pub fn resolved_token(&self) -> Option<String> {
        self.token.as_deref().map(resolve_secret)
    }
}

impl Default for DevOpsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_devops_api_url(),
            token: None,
        }
    }
}

/// Resolve "env:VAR_NAME" indirection; plain values pass through unchanged.
/// An unset variable resolves to empty, which downstream validation treats as
/// absent.
pub fn resolve_secret(value: &str) -> String {
    match value.strip_prefix("env:") {
        Some(var) => std::env::var(var).unwrap_or_default(),
        None => value.to_string(),
    }
}

impl Default for GatewayManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "gantry".to_string());

        Self {
            api_version: "100monkeys.ai/v1".to_string(),
            kind: "GatewayConfig".to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: GatewaySpec::default(),
        }
    }
}

impl GatewayManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. GANTRY_CONFIG_PATH environment variable
    /// 2. ./gantry-config.yaml (working directory)
    /// 3. ~/.gantry/config.yaml (user home)
    /// 4. /etc/gantry/config.yaml (system, Unix) or C:\ProgramData\Gantry\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GANTRY_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./gantry-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".gantry").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/gantry/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Gantry\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails hard when missing or invalid.
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    /// This allows container deployments to override config via env vars
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GANTRY_BIND_ADDRESS") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_BIND_ADDRESS={}", val);
                self.spec.server.bind_address = val;
            }
        }

        if let Ok(val) = std::env::var("GANTRY_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: GANTRY_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for GANTRY_PORT: '{}'. Expected a port number. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("GANTRY_DEV_MODE") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => {
                    tracing::warn!("Environment override: GANTRY_DEV_MODE=true (weakened access gate)");
                    self.spec.auth.dev_mode = true;
                }
                "false" | "0" | "no" | "off" => {
                    tracing::info!("Environment override: GANTRY_DEV_MODE=false");
                    self.spec.auth.dev_mode = false;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for GANTRY_DEV_MODE: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("GANTRY_SHARED_SECRET") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_SHARED_SECRET=<redacted>");
                self.spec.auth.shared_secret = val;
            }
        }

        if let Ok(val) = std::env::var("GANTRY_SIGNING_KEY") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_SIGNING_KEY=<redacted>");
                self.spec.auth.signing_key = val;
            }
        }

        if let Ok(val) = std::env::var("GANTRY_LLM_PROVIDER") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_LLM_PROVIDER={}", val);
                self.spec.llm.provider = val;
            }
        }

        if let Ok(val) = std::env::var("GANTRY_LLM_API_KEY") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_LLM_API_KEY=<redacted>");
                self.spec.llm.api_key = Some(val);
            }
        }

        if let Ok(val) = std::env::var("GANTRY_DEVOPS_PROVIDER") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_DEVOPS_PROVIDER={}", val);
                self.spec.devops.provider = val;
            }
        }

        if let Ok(val) = std::env::var("GANTRY_DEVOPS_TOKEN") {
            if !val.is_empty() {
                tracing::info!("Environment override: GANTRY_DEVOPS_TOKEN=<redacted>");
                self.spec.devops.token = Some(val);
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != "100monkeys.ai/v1" {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '100monkeys.ai/v1'",
                self.api_version
            );
        }

        if self.kind != "GatewayConfig" {
            anyhow::bail!("Invalid kind: '{}'. Must be 'GatewayConfig'", self.kind);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port cannot be 0");
        }

        if self.spec.server.request_body_limit_bytes == 0 {
            anyhow::bail!("spec.server.request_body_limit_bytes cannot be 0");
        }

        if !LLM_PROVIDERS.contains(&self.spec.llm.provider.as_str()) {
            anyhow::bail!(
                "Unknown LLM provider '{}'. Expected one of: {}",
                self.spec.llm.provider,
                LLM_PROVIDERS.join(", ")
            );
        }

        if !DEVOPS_PROVIDERS.contains(&self.spec.devops.provider.as_str()) {
            anyhow::bail!(
                "Unknown DevOps provider '{}'. Expected one of: {}",
                self.spec.devops.provider,
                DEVOPS_PROVIDERS.join(", ")
            );
        }

        let secret = self.spec.auth.resolved_shared_secret();
        let signing_key = self.spec.auth.resolved_signing_key();

        if self.spec.auth.dev_mode && secret.is_empty() {
            anyhow::bail!("spec.auth.dev_mode requires a non-empty shared_secret");
        }

        if secret.is_empty() && signing_key.is_empty() {
            tracing::warn!(
                "Neither shared_secret nor signing_key is configured; every gated request will be denied"
            );
        }

        Ok(())
    }
}

// Default value functions
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_provider() -> String {
    "simulated".to_string()
}

fn default_devops_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.2
}
