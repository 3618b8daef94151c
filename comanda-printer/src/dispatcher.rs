//! Dispatcher adapters for shipping order snapshots to a printer
//!
//! Supports:
//! - HTTP relay (POST to a LAN listener that renders and prints)
//! - No-op (printing disabled)

use crate::error::{DispatchError, DispatchResult};
use async_trait::async_trait;
use shared::Order;
use std::time::Duration;
use tracing::{debug, info};

/// Trait for receipt dispatch adapters
///
/// `dispatch` hands over one finalized order snapshot. Callers never block
/// order processing on the result; a failure is logged upstream and the
/// order state stays committed.
#[async_trait]
pub trait ReceiptDispatcher: Send + Sync {
    /// Ship the order snapshot to the printer
    async fn dispatch(&self, order: &Order) -> DispatchResult<()>;

    /// Adapter name for logs
    fn name(&self) -> &'static str;
}

/// HTTP relay dispatcher
///
/// POSTs the order as JSON to a relay endpoint on the restaurant LAN
/// (e.g. `http://192.168.1.12:8989/print`).
#[derive(Debug, Clone)]
pub struct HttpRelayDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayDispatcher {
    /// Create a relay dispatcher with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> DispatchResult<Self> {
        let endpoint = endpoint.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Relay endpoint this dispatcher posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReceiptDispatcher for HttpRelayDispatcher {
    async fn dispatch(&self, order: &Order) -> DispatchResult<()> {
        debug!(order_id = %order.id, endpoint = %self.endpoint, "Sending order to print relay");

        let response = self.client.post(&self.endpoint).json(order).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(order_id = %order.id, "Receipt accepted by print relay");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http-relay"
    }
}

/// No-op dispatcher for printerless deployments and tests
#[derive(Debug, Clone, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl ReceiptDispatcher for NoopDispatcher {
    async fn dispatch(&self, order: &Order) -> DispatchResult<()> {
        debug!(order_id = %order.id, "Printing disabled, receipt skipped");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{LineItem, OrderKind, OrderStatus};

    fn paid_order() -> Order {
        Order {
            id: "o-1".to_string(),
            kind: OrderKind::Hall,
            table_number: Some("5".to_string()),
            note: None,
            items: vec![LineItem {
                food_id: 1,
                name: "Burger".to_string(),
                unit_price: Some(5000),
                quantity: 2,
            }],
            status: OrderStatus::Paid,
            cancel_reason: None,
            paid: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn noop_accepts_everything() {
        let dispatcher = NoopDispatcher;
        assert!(dispatcher.dispatch(&paid_order()).await.is_ok());
        assert_eq!(dispatcher.name(), "noop");
    }

    #[tokio::test]
    async fn relay_reports_unreachable_endpoint_as_transport_error() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let relay = HttpRelayDispatcher::new(
            "http://192.0.2.1:9/print",
            Duration::from_millis(100),
        )
        .unwrap();

        let err = relay.dispatch(&paid_order()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }
}
