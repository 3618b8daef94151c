//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Order, OrderDraft, OrderPatch, OrderStatus};

use crate::core::ServerState;
use crate::db::OrderCounts;
use crate::orders::{RangeRevenue, TransitionRequest};
use crate::utils::AppResult;

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Generic success acknowledgement
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

/// Create a new order
pub async fn create(
    State(state): State<ServerState>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.create(draft)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders, optionally filtered by `?status=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;
    Ok(Json(state.orders.list(status)?))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(&id)?))
}

/// Transition request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: String,
    #[serde(default, alias = "cancel_reason")]
    pub cancel_reason: Option<String>,
}

/// Update order status
///
/// The status arrives as a raw string so an unrecognized value is a 400
/// with `InvalidStatus`, not a generic deserialization rejection.
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> AppResult<Json<Ack>> {
    let target: OrderStatus = payload.status.parse()?;
    state.orders.transition(
        &id,
        target,
        TransitionRequest {
            cancel_reason: payload.cancel_reason,
            print: false,
        },
    )?;
    Ok(Json(Ack { success: true }))
}

/// Accept a pending order (transition to `live`)
pub async fn accept(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Ack>> {
    state
        .orders
        .transition(&id, OrderStatus::Live, TransitionRequest::default())?;
    Ok(Json(Ack { success: true }))
}

/// Payment confirmation body
#[derive(Debug, Default, Deserialize)]
pub struct MarkPaidRequest {
    #[serde(default)]
    pub print: bool,
}

#[derive(Debug, Serialize)]
pub struct PaidResponse {
    pub success: bool,
    pub id: String,
    pub paid: bool,
}

/// Mark an order paid, optionally shipping a receipt to the print relay
///
/// Idempotent: re-confirming an already paid order succeeds without a
/// duplicate broadcast, though a requested print runs again.
pub async fn mark_paid(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<MarkPaidRequest>>,
) -> AppResult<Json<PaidResponse>> {
    let print = payload.map(|Json(p)| p.print).unwrap_or(false);
    let order = state.orders.transition(
        &id,
        OrderStatus::Paid,
        TransitionRequest {
            cancel_reason: None,
            print,
        },
    )?;
    Ok(Json(PaidResponse {
        success: true,
        id: order.id,
        paid: order.paid,
    }))
}

/// Edit note/items/type/tableNumber while the order is still pending
pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.edit(&id, patch)?))
}

/// Delete one order; removing an already absent order still succeeds
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Ack>> {
    state.orders.remove(&id)?;
    Ok(Json(Ack { success: true }))
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub success: bool,
    pub removed: usize,
}

/// Delete every paid order
pub async fn purge_paid(State(state): State<ServerState>) -> AppResult<Json<PurgeResponse>> {
    let removed = state.orders.purge_paid()?;
    Ok(Json(PurgeResponse {
        success: true,
        removed,
    }))
}

/// Paid orders, newest first
pub async fn list_paid(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list(Some(OrderStatus::Paid))?))
}

/// Pending orders, newest first
pub async fn list_pending(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list(Some(OrderStatus::Pending))?))
}

/// Per-status totals (for dashboard badges)
pub async fn counts(State(state): State<ServerState>) -> AppResult<Json<OrderCounts>> {
    Ok(Json(state.orders.counts()?))
}

#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: i64,
}

/// Total revenue across paid orders
pub async fn paid_total(State(state): State<ServerState>) -> AppResult<Json<TotalResponse>> {
    let total = state.revenue.total_paid()?;
    Ok(Json(TotalResponse { total }))
}

/// Query params for the date-range report (RFC3339 timestamps)
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Revenue report for a date range, any status
pub async fn revenue_in_range(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<RangeRevenue>> {
    Ok(Json(state.revenue.in_range(query.start, query.end)?))
}
