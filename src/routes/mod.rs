// Route exports
pub mod auth;
pub mod discovery;
pub mod matches;
pub mod profiles;

use actix_web::{error, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;

use crate::clock::Clock;
use crate::core::{Matcher, QuotaPolicy};
use crate::error::LumeError;
use crate::models::HealthResponse;
use crate::services::{
    DiscoveryService, LifecyclePolicy, MatchLifecycle, MatchNotifier, ProfileService,
    SafetyProvider, Store, StoreHealth, SwipeRecorder,
};
pub use auth::{AuthenticatedUser, Claims, JwtVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub discovery: Arc<DiscoveryService>,
    pub swipes: Arc<SwipeRecorder>,
    pub lifecycle: Arc<MatchLifecycle>,
    pub store: Arc<dyn StoreHealth>,
    pub auth: JwtVerifier,
}

/// External collaborators the services talk to
pub struct Collaborators {
    pub safety: Arc<dyn SafetyProvider>,
    pub notifier: Arc<dyn MatchNotifier>,
    pub clock: Arc<dyn Clock>,
}

/// Tunable matching policies
#[derive(Debug, Clone, Default)]
pub struct Policies {
    pub matcher: Matcher,
    pub quota: QuotaPolicy,
    pub lifecycle: LifecyclePolicy,
}

impl AppState {
    /// Wire every service onto one store
    pub fn new<S>(store: Arc<S>, collaborators: Collaborators, policies: Policies, auth: JwtVerifier) -> Self
    where
        S: Store + 'static,
    {
        let Collaborators {
            safety,
            notifier,
            clock,
        } = collaborators;

        let lifecycle = Arc::new(MatchLifecycle::new(
            store.clone(),
            store.clone(),
            notifier,
            clock.clone(),
            policies.lifecycle,
        ));

        Self {
            profiles: Arc::new(ProfileService::new(store.clone(), clock.clone())),
            discovery: Arc::new(DiscoveryService::new(
                store.clone(),
                store.clone(),
                safety,
                policies.matcher,
                policies.quota,
                clock.clone(),
            )),
            swipes: Arc::new(SwipeRecorder::new(
                store.clone(),
                store.clone(),
                lifecycle.clone(),
                policies.quota,
                clock,
            )),
            lifecycle,
            store,
            auth,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(profiles::configure)
            .configure(discovery::configure)
            .configure(matches::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    LumeError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    LumeError::Validation(format!("Invalid query: {}", err)).into()
}
