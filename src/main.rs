mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::middleware::auth_middleware;
use crate::delivery::http::v1::{admin, destinations, list_destinations, lists, reviews, users};
use crate::domain::destination::Catalog;
use crate::repository::csv::load_catalog;
use crate::repository::postgres::{create_pool, PostgresListRepository, PostgresUserRepository};
use crate::usecase::destinations::DestinationsUseCase;
use crate::usecase::jwt::JwtService;
use crate::usecase::lists::ListsUseCase;
use crate::usecase::membership::MembershipUseCase;
use crate::usecase::reviews::ReviewsUseCase;
use crate::usecase::users::UsersUseCase;

pub struct AppState {
    pub destinations_usecase: DestinationsUseCase,
    pub lists_usecase: ListsUseCase<PostgresListRepository>,
    pub reviews_usecase: ReviewsUseCase<PostgresListRepository>,
    pub membership_usecase: MembershipUseCase<PostgresListRepository>,
    pub users_usecase: UsersUseCase<PostgresUserRepository>,
    pub jwt_service: JwtService,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env()?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize tracing subscriber with optional OpenTelemetry layer
    let tracer_provider = if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig::from(&config);
        let provider = telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)
            .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;
        Some(provider)
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
        None
    };

    tracing::info!("starting wayfarer");

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!("config loaded, telemetry_enabled={}", config.telemetry_enabled);

    // An unreadable catalog leaves the service up; catalog reads answer 503.
    let catalog = match load_catalog(Path::new(&config.catalog_path)) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, path = %config.catalog_path, "failed to load destination catalog");
            Catalog::default()
        }
    };
    tracing::info!(count = catalog.len(), "destination catalog loaded");
    let catalog = Arc::new(catalog);

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let shared_state = Arc::new(AppState {
        destinations_usecase: DestinationsUseCase::new(catalog.clone()),
        lists_usecase: ListsUseCase::new(PostgresListRepository::new(pool.clone())),
        reviews_usecase: ReviewsUseCase::new(PostgresListRepository::new(pool.clone())),
        membership_usecase: MembershipUseCase::new(
            PostgresListRepository::new(pool.clone()),
            catalog,
        ),
        users_usecase: UsersUseCase::new(PostgresUserRepository::new(pool)),
        jwt_service: JwtService::new(config.jwt_secret),
        metrics_handle,
    });

    let public_api = Router::new()
        .route("/api/v1/destinations/search", get(destinations::search_destinations))
        .route("/api/v1/destinations/countries", get(destinations::list_countries))
        .route("/api/v1/destinations/{id}", get(destinations::get_destination))
        .route(
            "/api/v1/destinations/{id}/coordinates",
            get(destinations::get_coordinates),
        )
        .route("/api/v1/lists", get(lists::list_public_lists))
        .route("/api/v1/lists/{name}", get(lists::get_list))
        .route("/api/v1/lists/{name}/details", get(lists::get_list_details))
        .route("/api/v1/lists/{name}/geojson", get(lists::get_list_geojson))
        .route("/api/v1/lists/{name}/reviews", get(reviews::list_reviews));

    let protected_api = Router::new()
        .route("/api/v1/lists", post(lists::create_list))
        .route("/api/v1/lists/mine", get(lists::list_my_lists))
        .route(
            "/api/v1/lists/{name}",
            put(lists::update_list).delete(lists::delete_list),
        )
        .route("/api/v1/lists/{name}/visibility", put(lists::set_list_visibility))
        .route(
            "/api/v1/lists/{name}/destinations",
            post(list_destinations::add_destination)
                .put(list_destinations::merge_destinations),
        )
        .route(
            "/api/v1/lists/{name}/destinations/{id}",
            delete(list_destinations::remove_destination),
        )
        .route(
            "/api/v1/lists/{name}/reviews",
            post(reviews::add_review),
        )
        .route("/api/v1/users/me", get(users::get_me))
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/{email}/status", put(admin::set_user_status))
        .route("/api/v1/admin/users/{email}/admin", put(admin::set_user_admin))
        .route("/api/v1/admin/reviews", get(admin::list_all_reviews))
        .route(
            "/api/v1/admin/reviews/{list}/{index}/visibility",
            put(admin::set_review_visibility),
        )
        .layer(middleware::from_fn_with_state(
            shared_state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .merge(public_api)
        .merge(protected_api)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("wayfarer running on {}", config.listen_addr);
    axum::serve(listener, router).await?;

    if let Some(provider) = tracer_provider {
        telemetry::shutdown_telemetry(provider);
    }

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
