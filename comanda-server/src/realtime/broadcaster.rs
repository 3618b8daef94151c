//! Lifecycle event fan-out

use shared::OrderEvent;
use tokio::sync::broadcast;

/// Event channel capacity; subscribers lagging past it drop events
/// (at-most-once, no replay)
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Best-effort broadcaster of order lifecycle events
///
/// Publication is fire-and-forget: no subscribers means the event
/// evaporates, and joining late never backfills. A subscriber that needs
/// current state fetches it over the HTTP API on connect.
#[derive(Clone, Debug)]
pub struct Broadcaster {
    tx: broadcast::Sender<OrderEvent>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish to every currently connected subscriber
    pub fn publish(&self, event: OrderEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Currently connected subscriber count
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{Order, OrderEventKind, OrderKind, OrderStatus};
    use tokio::sync::broadcast::error::TryRecvError;

    fn event(kind: OrderEventKind) -> OrderEvent {
        OrderEvent::new(
            kind,
            Order {
                id: "o-1".to_string(),
                kind: OrderKind::Pickup,
                table_number: None,
                note: None,
                items: Vec::new(),
                status: OrderStatus::Pending,
                cancel_reason: None,
                paid: false,
                created_at: Utc::now(),
            },
        )
    }

    #[tokio::test]
    async fn publish_reaches_connected_subscribers() {
        let broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(event(OrderEventKind::New));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, OrderEventKind::New);
        assert_eq!(received.order.id, "o-1");
    }

    #[tokio::test]
    async fn late_subscribers_get_no_backfill() {
        let broadcaster = Broadcaster::new();
        // Keep one receiver alive so the publish is not dropped outright.
        let _early = broadcaster.subscribe();

        broadcaster.publish(event(OrderEventKind::New));

        let mut late = broadcaster.subscribe();
        assert_eq!(late.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let broadcaster = Broadcaster::new();
        broadcaster.publish(event(OrderEventKind::Done));
        assert_eq!(broadcaster.receiver_count(), 0);
    }
}
