use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use lume_match::clock::SystemClock;
use lume_match::config::{Settings, StorageBackend};
use lume_match::core::Matcher;
use lume_match::routes::{self, AppState, Collaborators, JwtVerifier, Policies};
use lume_match::services::{
    CacheManager, HttpSafetyClient, LogNotifier, MatchNotifier, MemoryStore, PostgresStore,
    SafetyProvider, StaticSafety, WebhookNotifier,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn io_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Lume matching service...");
    info!("Configuration loaded successfully");

    // Two-tier cache for collaborator lookups (Redis tier optional)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(60);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s, Redis L2)", l1_cache_size, cache_ttl);
                Arc::new(c)
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with L1 cache only", e);
                Arc::new(CacheManager::in_memory(l1_cache_size, cache_ttl))
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Arc::new(CacheManager::in_memory(l1_cache_size, cache_ttl))
        }
    };

    let safety: Arc<dyn SafetyProvider> = match &settings.safety.endpoint {
        Some(endpoint) => {
            let client = HttpSafetyClient::new(
                endpoint.clone(),
                settings.safety.api_key.clone(),
                Duration::from_secs(settings.safety.timeout_secs.unwrap_or(5)),
                Some(cache.clone()),
            )
            .map_err(|e| io_error("Failed to build safety client", e))?;
            info!("Safety client initialized for {}", endpoint);
            Arc::new(client)
        }
        None => {
            warn!("No safety endpoint configured, ghost/block exclusions are empty");
            Arc::new(StaticSafety::new())
        }
    };

    let notifier: Arc<dyn MatchNotifier> = match &settings.notifications.webhook_url {
        Some(url) => {
            let webhook = WebhookNotifier::new(
                url.clone(),
                Duration::from_secs(settings.notifications.timeout_secs.unwrap_or(5)),
            )
            .map_err(|e| io_error("Failed to build notification client", e))?;
            info!("Match notifications will be posted to {}", url);
            Arc::new(webhook)
        }
        None => Arc::new(LogNotifier),
    };

    let collaborators = Collaborators {
        safety,
        notifier,
        clock: Arc::new(SystemClock),
    };

    let weights = settings.scoring.weights;
    let policies = Policies {
        matcher: Matcher::new(weights, settings.matching.page_size),
        quota: settings.matching.quota_policy(),
        lifecycle: settings.matching.lifecycle_policy(),
    };

    info!("Matcher initialized with weights: {:?}", weights);

    let auth = JwtVerifier::new(&settings.auth.jwt_secret, settings.auth.issuer.clone());

    // Build application state on the configured store
    let app_state = match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            AppState::new(Arc::new(MemoryStore::new()), collaborators, policies, auth)
        }
        StorageBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let store = PostgresStore::new(
                &settings.database.url,
                db_max_conn,
                settings.database.min_connections.unwrap_or(1),
                settings.database.acquire_timeout_secs.unwrap_or(5),
                settings.database.idle_timeout_secs.unwrap_or(600),
            )
            .await
            .map_err(|e| io_error("Failed to connect to PostgreSQL", e))?;

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            AppState::new(Arc::new(store), collaborators, policies, auth)
        }
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
