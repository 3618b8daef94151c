//! Order API Module
//!
//! Static path segments are registered alongside the `{id}` routes; the
//! router gives statics priority, so `/paid`, `/pending` and friends never
//! shadow into the id parameter.

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Intake and listing
        .route("/api/orders", post(handler::create).get(handler::list))
        // Read projections
        .route("/api/orders/pending", get(handler::list_pending))
        .route("/api/orders/counts", get(handler::counts))
        .route("/api/orders/revenue", get(handler::revenue_in_range))
        .route("/api/orders/paid", get(handler::list_paid))
        .route("/api/orders/paid/total", get(handler::paid_total))
        .route("/api/orders/paid/all", delete(handler::purge_paid))
        // Lifecycle
        .route("/api/orders/{id}/status", patch(handler::set_status))
        .route("/api/orders/{id}/accept", patch(handler::accept))
        .route("/api/orders/{id}/paid", patch(handler::mark_paid))
        // Single order
        .route(
            "/api/orders/{id}",
            get(handler::get_by_id)
                .patch(handler::edit)
                .delete(handler::remove),
        )
}
