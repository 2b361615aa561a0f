//! Backend entry-point: configuration, tracing, and server bootstrap.

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use backend::domain::ports::{CompletionSource, FixtureCompletionSource};
use backend::inbound::http::health::HealthState;
use backend::outbound::gemini::GeminiHttpSource;
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;

    let key = load_session_key(&settings)?;
    let bind_addr = settings.bind_addr().parse().map_err(|e| {
        std::io::Error::other(format!(
            "invalid bind address {}: {e}",
            settings.bind_addr()
        ))
    })?;

    let mut config = ServerConfig::new(key, settings.cookie_secure, SameSite::Lax, bind_addr)
        .with_seed_catalogue(settings.seed_catalogue)
        .with_completion_source(build_completion_source(&settings)?);

    match settings.database_url.clone() {
        Some(database_url) => {
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; serving from in-memory fixtures"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    server.await
}

/// Read the session key material, falling back to an ephemeral key in
/// development.
fn load_session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Select the advisor completion source from configuration.
///
/// Without an API key the canned source answers every question, which keeps
/// local development and tests independent of the hosted service.
fn build_completion_source(settings: &AppSettings) -> std::io::Result<Arc<dyn CompletionSource>> {
    let Some(api_key) = settings.gemini_api_key.clone() else {
        warn!("no Gemini API key configured; advisor replies use the canned source");
        return Ok(Arc::new(FixtureCompletionSource::default()));
    };

    let base_url: Url = settings
        .gemini_base_url()
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid Gemini base URL: {e}")))?;
    let timeout = Duration::from_secs(settings.gemini_timeout_secs);
    let source = match settings.gemini_model.as_deref() {
        Some(model) => GeminiHttpSource::with_model(&base_url, api_key, model, timeout),
        None => GeminiHttpSource::new(&base_url, api_key, timeout),
    }
    .map_err(std::io::Error::other)?;
    Ok(Arc::new(source))
}
