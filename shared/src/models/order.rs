//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Order lifecycle status
///
/// Transition legality lives in the server's lifecycle module; this type
/// only carries the value and its wire spelling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Just placed, waiting for staff acceptance
    #[default]
    Pending,
    /// Accepted and in preparation
    Live,
    /// Prepared and handed over
    Done,
    /// Withdrawn with a reason
    Canceled,
    /// Settled
    Paid,
}

impl OrderStatus {
    /// Terminal statuses accept no further transition except the
    /// idempotent re-confirmation of `Paid`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled | Self::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Live => "live",
            Self::Done => "done",
            Self::Canceled => "canceled",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized status value in a client request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "live" => Ok(Self::Live),
            "done" => Ok(Self::Done),
            "canceled" => Ok(Self::Canceled),
            "paid" => Ok(Self::Paid),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Order channel
///
/// Informational only: it affects receipt formatting, never transition
/// legality. `table_number` is meaningful for `Hall` orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Picked up at the counter
    #[default]
    Pickup,
    /// Served at a table
    Hall,
    /// Third-party delivery channel
    External,
}

/// One line of an order, snapshotted at creation time
///
/// `unit_price` is the price at the moment the order was placed; later menu
/// changes do not touch it. `None` marks a degraded row for which revenue
/// aggregation falls back to the live menu snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub food_id: i64,
    pub name: String,
    /// Price in minor currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<i64>,
    pub quantity: u32,
}

impl LineItem {
    /// Line total, using `fallback` for rows persisted without an embedded
    /// price. Missing from both sides counts as zero.
    pub fn line_total(&self, fallback: Option<i64>) -> i64 {
        self.unit_price.or(fallback).unwrap_or(0) * i64::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    /// Set exactly on the transition into `Canceled`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Mirrors `status == Paid`; persisted alongside it in one write
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

/// Intake request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(rename = "type", default)]
    pub kind: OrderKind,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub table_number: Option<String>,
}

/// Edit request body; absent fields stay untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(rename = "type", default)]
    pub kind: Option<OrderKind>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub table_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_from_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Live,
            OrderStatus::Done,
            OrderStatus::Canceled,
            OrderStatus::Paid,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "finished".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("finished".to_string()));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Live.is_terminal());
        assert!(OrderStatus::Done.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Canceled).unwrap(),
            "\"canceled\""
        );
    }

    #[test]
    fn line_total_prefers_embedded_price() {
        let item = LineItem {
            food_id: 1,
            name: "Burger".to_string(),
            unit_price: Some(5000),
            quantity: 2,
        };
        assert_eq!(item.line_total(Some(4000)), 10000);
    }

    #[test]
    fn line_total_falls_back_when_price_missing() {
        let item = LineItem {
            food_id: 2,
            name: "Fries".to_string(),
            unit_price: None,
            quantity: 3,
        };
        assert_eq!(item.line_total(Some(1500)), 4500);
        assert_eq!(item.line_total(None), 0);
    }

    #[test]
    fn draft_accepts_camel_case_body() {
        let draft: OrderDraft = serde_json::from_str(
            r#"{"type":"hall","tableNumber":"5","items":[{"foodId":1,"name":"Burger","unitPrice":5000,"quantity":2}]}"#,
        )
        .unwrap();
        assert_eq!(draft.kind, OrderKind::Hall);
        assert_eq!(draft.table_number.as_deref(), Some("5"));
        assert_eq!(draft.items[0].unit_price, Some(5000));
    }
}
