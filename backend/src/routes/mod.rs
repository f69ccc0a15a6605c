//! API route definitions

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::middleware::auth_middleware;
use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", order_routes())
        .nest("/products", product_routes())
        .nest("/notifications", notification_routes())
        .nest("/expiration", expiration_routes())
        .route_layer(middleware::from_fn(auth_middleware))
        .route("/health", get(handlers::health_check))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::order::list_orders).post(handlers::order::create_order),
        )
        .route("/stats", get(handlers::order::get_order_stats))
        .route("/analytics", get(handlers::order::get_order_analytics))
        .route(
            "/:id",
            get(handlers::order::get_order).patch(handlers::order::update_order),
        )
        .route("/:id/assign", post(handlers::order::assign_order))
        .route("/:id/submit-review", post(handlers::order::submit_for_review))
        .route("/:id/verify", post(handlers::order::verify_order))
        .route("/:id/pay", post(handlers::order::mark_paid))
        .route("/:id/cancel", post(handlers::order::cancel_order))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(handlers::product::list_low_stock))
        .route("/:id", get(handlers::product::get_product))
        .route("/:id/adjust-stock", post(handlers::product::adjust_stock))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::notification::list_notifications))
        .route(
            "/unread-count",
            get(handlers::notification::unread_count),
        )
        .route("/read-all", patch(handlers::notification::mark_all_as_read))
        .route("/:id/read", patch(handlers::notification::mark_as_read))
}

fn expiration_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::expiration::scheduler_status))
        .route("/start", post(handlers::expiration::start_scheduler))
        .route("/stop", post(handlers::expiration::stop_scheduler))
        .route("/run", post(handlers::expiration::run_sweep))
        .route("/expiring-soon", get(handlers::expiration::expiring_soon))
}
