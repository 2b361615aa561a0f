//! Server configuration: environment-driven settings and the runtime bundle.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::ports::{CompletionSource, FixtureCompletionSource};
use crate::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

/// Environment-driven application settings (prefix `LOANATLAS_`).
///
/// Every knob has a workable default so a database-less development run needs
/// no configuration at all.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOANATLAS")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; in-memory fixtures are used when absent.
    pub database_url: Option<String>,
    /// Path to the session key material.
    pub session_key_file: Option<String>,
    /// Allow an ephemeral session key outside debug builds.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Gemini API key; the canned completion source is used when absent.
    pub gemini_api_key: Option<String>,
    /// Gemini API base URL override.
    pub gemini_base_url: Option<String>,
    /// Gemini model override.
    pub gemini_model: Option<String>,
    /// Gemini request timeout, in seconds.
    #[ortho_config(default = 30)]
    pub gemini_timeout_secs: u64,
    /// Insert the embedded catalog when the product store is empty.
    #[ortho_config(default = true)]
    pub seed_catalogue: bool,
}

impl AppSettings {
    /// Bind address, falling back to the default listener.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Session key path, falling back to the mounted secret location.
    #[must_use]
    pub fn session_key_file(&self) -> &str {
        self.session_key_file
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_KEY_FILE)
    }

    /// Gemini base URL, falling back to the hosted endpoint.
    #[must_use]
    pub fn gemini_base_url(&self) -> &str {
        self.gemini_base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }
}

/// Runtime bundle consumed by server construction.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) completions: Arc<dyn CompletionSource>,
    pub(crate) seed_catalogue: bool,
}

impl ServerConfig {
    /// Construct a server configuration with fixture completions and no pool.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            completions: Arc::new(FixtureCompletionSource::default()),
            seed_catalogue: true,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server wires database-backed repositories instead
    /// of the in-memory fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the completion source used by the advisor.
    #[must_use]
    pub fn with_completion_source(mut self, completions: Arc<dyn CompletionSource>) -> Self {
        self.completions = completions;
        self
    }

    /// Control embedded catalog seeding at startup.
    #[must_use]
    pub fn with_seed_catalogue(mut self, seed: bool) -> Self {
        self.seed_catalogue = seed;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
