use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{TokenError, TokenIssuer};
use crate::cache::{Cache, NoopCache, RedisCache};
use crate::config::{AppConfig, CorsConfig, DatabaseBackend};
use crate::context::Ctx;
use crate::database::{manager, MemoryStore, PgRepository, Stores};
use crate::handlers::{protected, public};
use crate::middleware::{
    jwt_auth_middleware, rate_limit_middleware, require_journal_owner, RateLimiter,
};
use crate::services::Services;

/// Everything a handler can reach
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub services: Services,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores, cache: Arc<dyn Cache>) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenIssuer::new(&config.auth)?);
        let services = Services::new(
            &stores,
            cache,
            tokens,
            Duration::from_secs(config.cache.journal_ttl_secs),
        );
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Ok(Self {
            config: Arc::new(config),
            stores,
            services,
            rate_limiter,
        })
    }

    /// Per-request context bounded by the configured request timeout
    pub fn ctx(&self) -> Ctx {
        match self.config.server.request_timeout_secs {
            0 => Ctx::background(),
            secs => Ctx::with_timeout(Duration::from_secs(secs)),
        }
    }
}

/// Open the configured store and cache. An unreachable Redis degrades to no
/// caching; an unreachable database is fatal.
pub async fn connect(config: &AppConfig) -> anyhow::Result<AppState> {
    let stores = match config.database.backend {
        DatabaseBackend::Memory => {
            warn!("Using in-memory store; data does not survive a restart");
            Stores::from_backend(MemoryStore::new())
        }
        DatabaseBackend::Postgres => {
            let pool = manager::connect(&config.database).await?;
            if config.database.run_migrations {
                manager::run_migrations(&pool).await?;
            }
            Stores::from_backend(PgRepository::new(pool))
        }
    };

    let cache: Arc<dyn Cache> = match config.cache.redis_url.as_deref() {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, journal caching disabled");
                Arc::new(NoopCache)
            }
        },
        None => {
            info!("No REDIS_URL configured, journal caching disabled");
            Arc::new(NoopCache)
        }
    };

    Ok(AppState::new(config.clone(), stores, cache)?)
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        // Public
        .route("/", get(public::health::root))
        .route("/health", get(public::health::health))
        .nest("/api/v1", api_routes(&state))
        // Global middleware
        .layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http());

    if state.config.rate_limit.enabled {
        app = app.layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit_middleware));
    }

    app.with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_public_routes())
        .merge(journal_routes(state))
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/refresh", post(auth::refresh))
}

fn journal_routes(state: &AppState) -> Router<AppState> {
    use protected::{entries, journals};

    // Every route below resolves `:id` to a journal the caller owns
    let owned = Router::new()
        .route(
            "/journals/:id",
            get(journals::get).put(journals::update).delete(journals::delete),
        )
        .route("/journals/:id/with-entries", get(journals::with_entries))
        .route(
            "/journals/:id/entries",
            get(entries::list).post(entries::create),
        )
        .route("/journals/:id/entries/statistics", get(entries::statistics))
        .route(
            "/journals/:id/entries/:entry_id",
            get(entries::get).put(entries::update).delete(entries::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_journal_owner));

    Router::new()
        .route("/journals", get(journals::list).post(journals::create))
        .merge(owned)
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "ignoring malformed CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age_secs))
}
