use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use dotenvy::dotenv;
use envconfig::Envconfig;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;
pub mod upload;
pub mod utils;
pub mod validation;

use config::Config;
use handlers::{admin, analytics, auth as auth_handlers, inventory, order};
use state::AppState;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Uploads can carry medicine images or prescription scans.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub async fn start_server() -> Result<(), Error> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting the pharmacy store backend...");

    let config = Config::init_from_env()?;
    let port = config.port;
    let state = AppState::new(config).await?;

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await?;
    log::info!("Server is running on http://{address}");

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutting down gracefully");
    Ok(())
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any);

    let super_admin_routes = Router::new()
        .route("/api/admins", get(admin::list_admins))
        .route("/api/admins/{id}", delete(admin::delete_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_super_admin,
        ));

    let protected_routes = Router::new()
        .route(
            "/api/admin/profile",
            get(admin::get_admin_profile).put(admin::update_admin_profile),
        )
        .route("/api/customer/profile", put(admin::update_customer_profile))
        .route("/api/analytics", get(analytics::get_analytics))
        .merge(super_admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::verify_token,
        ));

    Router::new()
        .route("/admin_register", post(auth_handlers::admin_register))
        .route("/admin_login", post(auth_handlers::admin_login))
        .route("/customer_register", post(auth_handlers::customer_register))
        .route("/customer_login", post(auth_handlers::customer_login))
        .route(
            "/api/medicines",
            get(inventory::list_medicines).post(inventory::create_medicine),
        )
        .route(
            "/api/medicines/{id}",
            get(inventory::get_medicine)
                .put(inventory::update_medicine)
                .delete(inventory::delete_medicine),
        )
        .route("/api/dashboard/stats", get(inventory::dashboard_stats))
        .route("/api/dashboard/activity", get(inventory::dashboard_activity))
        .route(
            "/api/orders",
            get(order::list_orders).post(order::create_order),
        )
        .route("/api/orders/{id}", put(order::update_order))
        .route("/api/orders/{id}/cancel", put(order::cancel_order))
        .route("/api/my-orders", get(order::my_orders))
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(state.config.upload_dir.clone()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        log::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
