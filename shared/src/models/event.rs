//! Realtime lifecycle events
//!
//! One event per committed lifecycle change, published to connected staff
//! displays. Events are best-effort notifications, never a source of
//! truth: a client that missed one refetches over the HTTP API.

use super::order::{Order, OrderStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Which lifecycle change an event announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderEventKind {
    New,
    Accepted,
    Done,
    Canceled,
    Paid,
}

impl OrderEventKind {
    /// Event name on the realtime channel
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::New => "order:new",
            Self::Accepted => "order:accepted",
            Self::Done => "order:done",
            Self::Canceled => "order:canceled",
            Self::Paid => "order:paid",
        }
    }

    /// Event announcing a committed transition into `status`
    ///
    /// `Pending` maps to `New`: it is only ever entered at creation.
    pub fn for_status(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::New,
            OrderStatus::Live => Self::Accepted,
            OrderStatus::Done => Self::Done,
            OrderStatus::Canceled => Self::Canceled,
            OrderStatus::Paid => Self::Paid,
        }
    }
}

/// A lifecycle event carrying the committed order snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order: Order,
}

impl OrderEvent {
    pub fn new(kind: OrderEventKind, order: Order) -> Self {
        Self { kind, order }
    }

    /// JSON frame sent to realtime subscribers
    ///
    /// The payload always carries `{id, status}`; the full order rides
    /// along so clients can skip the refetch.
    pub fn frame(&self) -> serde_json::Value {
        json!({
            "event": self.kind.wire_name(),
            "data": {
                "id": self.order.id,
                "status": self.order.status,
                "order": self.order,
            }
        })
    }
}
