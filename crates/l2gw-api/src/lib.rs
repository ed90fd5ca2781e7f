//! l2gw-api - Northbound REST API for the L2 gateway control plane
//!
//! Serves gateway and connection CRUD over the plugin traits, and accepts
//! hardware-state change batches and port lifecycle events.
//!
//! # Usage
//!
//! ```ignore
//! use l2gw_api::{create_router, AppState};
//!
//! let service = Arc::new(L2GatewayDb::new(store.clone()));
//! let state = AppState::new(service, Arc::new(OvsdbData::new(store)), bus);
//! let router = create_router(state);
//! ```

pub mod caller;
pub mod error;
pub mod handlers;
pub mod state;

pub use caller::Caller;
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the L2 gateway REST router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Gateway routes
        .route(
            "/v2.0/l2-gateways",
            get(handlers::gateways::list_gateways).post(handlers::gateways::create_gateway),
        )
        .route(
            "/v2.0/l2-gateways/{id}",
            get(handlers::gateways::get_gateway)
                .put(handlers::gateways::update_gateway)
                .delete(handlers::gateways::delete_gateway),
        )
        // Connection routes
        .route(
            "/v2.0/l2-gateway-connections",
            get(handlers::connections::list_connections)
                .post(handlers::connections::create_connection),
        )
        .route(
            "/v2.0/l2-gateway-connections/{id}",
            get(handlers::connections::get_connection)
                .delete(handlers::connections::delete_connection),
        )
        // Southbound ingress
        .route(
            "/v2.0/l2gw/ovsdb-changes",
            post(handlers::ovsdb::apply_changes),
        )
        .route(
            "/v2.0/l2gw/port-events",
            post(handlers::port_events::publish_port_event),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
