use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalmaConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl CalmaConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: CalmaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist, return defaults with
    /// env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CALMA_HTTP_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = std::env::var("CALMA_HTTP_PORT") {
            if let Ok(n) = v.parse() {
                self.server.port = n;
            }
        }
        if let Ok(v) = std::env::var("CALMA_DB_PATH") {
            self.database.path = v;
        }
        if let Ok(v) = std::env::var("CALMA_LOGIN_TOKEN_TTL_MINS") {
            if let Ok(n) = v.parse() {
                self.auth.login_token_ttl_mins = n;
            }
        }
        if let Ok(v) = std::env::var("CALMA_SESSION_TTL_HOURS") {
            if let Ok(n) = v.parse() {
                self.auth.session_ttl_hours = n;
            }
        }
        if let Ok(v) = std::env::var("CALMA_EXPOSE_LOGIN_TOKEN") {
            self.auth.expose_login_token = v == "1" || v.eq_ignore_ascii_case("true");
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8420,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "calma.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// How long a login token stays redeemable.
    pub login_token_ttl_mins: u64,
    /// How long a bearer session stays live.
    pub session_ttl_hours: u64,
    /// Dev convenience: echo the login token in the /auth/login response
    /// instead of only logging it. Never enable in production.
    pub expose_login_token: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_token_ttl_mins: 15,
            session_ttl_hours: 24 * 7,
            expose_login_token: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
