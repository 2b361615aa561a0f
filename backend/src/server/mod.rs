//! Server construction and middleware wiring.

mod config;

pub use config::{AppSettings, ServerConfig};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::Trace;
use crate::catalogue_seed;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    ChatTranscriptRepository, FixtureChatTranscriptRepository, FixtureProductRepository,
    FixtureUserRepository, ProductRepository, UserRepository,
};
use crate::domain::{AdvisorService, CatalogueService, OnboardingService};
use crate::inbound::http::advisor::{ask, history};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::products::{list_products, recommended_products};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{current_user, declare_income, login};
use crate::outbound::persistence::{
    DieselChatTranscriptRepository, DieselProductRepository, DieselUserRepository,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Repository set backing the domain services.
struct Repositories {
    products: Arc<dyn ProductRepository>,
    transcripts: Arc<dyn ChatTranscriptRepository>,
    users: Arc<dyn UserRepository>,
}

/// Select database-backed repositories when a pool is configured, otherwise
/// the in-memory fixtures.
fn build_repositories(config: &ServerConfig) -> Repositories {
    match &config.db_pool {
        Some(pool) => Repositories {
            products: Arc::new(DieselProductRepository::new(pool.clone())),
            transcripts: Arc::new(DieselChatTranscriptRepository::new(pool.clone())),
            users: Arc::new(DieselUserRepository::new(pool.clone())),
        },
        None => Repositories {
            products: Arc::new(FixtureProductRepository::new()),
            transcripts: Arc::new(FixtureChatTranscriptRepository::new()),
            users: Arc::new(FixtureUserRepository::new()),
        },
    }
}

fn build_http_state(config: &ServerConfig, repositories: Repositories) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        CatalogueService::new(repositories.products.clone()),
        AdvisorService::new(
            repositories.products,
            repositories.transcripts,
            config.completions.clone(),
        ),
        OnboardingService::new(repositories.users),
    ))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .service(login)
        .service(current_user)
        .service(declare_income)
        .service(list_products)
        .service(recommended_products)
        .service(ask)
        .service(history);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Seeds the embedded catalog into the selected product store before the
/// listener binds, so the first request already sees the catalog.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when seeding, binding the socket, or
/// starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let repositories = build_repositories(&config);
    if config.seed_catalogue {
        catalogue_seed::seed_if_empty(repositories.products.as_ref())
            .await
            .map_err(std::io::Error::other)?;
    }
    let http_state = build_http_state(&config, repositories);

    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        completions: _,
        seed_catalogue: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Wiring selection coverage for the repository builder.

    use super::*;

    fn fixture_config() -> ServerConfig {
        ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("loopback address"),
        )
    }

    #[tokio::test]
    async fn no_pool_selects_fixture_repositories_with_an_empty_catalog() {
        let repositories = build_repositories(&fixture_config());
        let count = repositories.products.count().await.expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn seeding_populates_the_fixture_catalog() {
        let repositories = build_repositories(&fixture_config());
        let inserted = catalogue_seed::seed_if_empty(repositories.products.as_ref())
            .await
            .expect("seed succeeds");
        assert!(inserted > 0);

        let count = repositories.products.count().await.expect("count");
        assert_eq!(usize::try_from(count).expect("fits"), inserted);
    }
}
