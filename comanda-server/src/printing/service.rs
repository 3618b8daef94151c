//! Receipt print pipeline
//!
//! A bounded queue decouples the request path from the relay: the paid
//! handler enqueues and returns, the background worker dispatches and logs
//! failures. Printer trouble never reaches order state.

use comanda_printer::ReceiptDispatcher;
use shared::Order;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Queue depth; past it receipts are dropped with a warning rather than
/// blocking the paid transition
const PRINT_QUEUE_CAPACITY: usize = 64;

/// Print pipeline service
///
/// Owns the queue and the dispatcher; the worker is spawned once from
/// [`PrintService::start_background_tasks`].
#[derive(Clone)]
pub struct PrintService {
    tx: mpsc::Sender<Order>,
    rx: Arc<Mutex<Option<mpsc::Receiver<Order>>>>,
    dispatcher: Arc<dyn ReceiptDispatcher>,
    shutdown: CancellationToken,
}

impl PrintService {
    pub fn new(dispatcher: Arc<dyn ReceiptDispatcher>) -> Self {
        let (tx, rx) = mpsc::channel(PRINT_QUEUE_CAPACITY);
        Self {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
            dispatcher,
            shutdown: CancellationToken::new(),
        }
    }

    /// Queue a receipt for dispatch; never blocks the caller
    pub fn enqueue(&self, order: Order) {
        if let Err(e) = self.tx.try_send(order) {
            tracing::warn!(error = %e, "Print queue rejected receipt");
        }
    }

    /// Spawn the background worker; a second call is a no-op
    pub fn start_background_tasks(&self) {
        let Some(rx) = self.rx.lock().expect("print queue receiver lock").take() else {
            tracing::debug!("Print worker already running");
            return;
        };

        let worker = ReceiptPrintWorker {
            dispatcher: self.dispatcher.clone(),
        };
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            worker.run(rx, shutdown).await;
        });
    }

    /// Stop the worker on shutdown
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Background receipt worker
///
/// Drains the queue and hands each snapshot to the dispatcher. A failed
/// dispatch is logged and the worker moves on; the paid order it belonged
/// to is already committed.
pub struct ReceiptPrintWorker {
    dispatcher: Arc<dyn ReceiptDispatcher>,
}

impl ReceiptPrintWorker {
    pub async fn run(self, mut rx: mpsc::Receiver<Order>, shutdown: CancellationToken) {
        tracing::info!(adapter = self.dispatcher.name(), "Receipt print worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Receipt print worker received shutdown signal");
                    break;
                }
                order = rx.recv() => {
                    let Some(order) = order else {
                        tracing::info!("Print queue closed, receipt worker stopping");
                        break;
                    };
                    match self.dispatcher.dispatch(&order).await {
                        Ok(()) => {
                            tracing::info!(order_id = %order.id, "Receipt dispatched");
                        }
                        Err(e) => {
                            tracing::warn!(
                                order_id = %order.id,
                                error = %e,
                                "Receipt dispatch failed, order state unaffected"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use comanda_printer::{DispatchError, DispatchResult};
    use shared::{OrderKind, OrderStatus};

    fn order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            kind: OrderKind::Pickup,
            table_number: None,
            note: None,
            items: Vec::new(),
            status: OrderStatus::Paid,
            cancel_reason: None,
            paid: true,
            created_at: Utc::now(),
        }
    }

    struct RecordingDispatcher {
        seen: mpsc::UnboundedSender<String>,
        fail: bool,
    }

    #[async_trait]
    impl ReceiptDispatcher for RecordingDispatcher {
        async fn dispatch(&self, order: &Order) -> DispatchResult<()> {
            let _ = self.seen.send(order.id.clone());
            if self.fail {
                Err(DispatchError::Rejected { status: 503 })
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn worker_drains_the_queue() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let service = PrintService::new(Arc::new(RecordingDispatcher {
            seen: seen_tx,
            fail: false,
        }));

        service.enqueue(order("a"));
        service.enqueue(order("b"));
        service.start_background_tasks();

        assert_eq!(seen_rx.recv().await.unwrap(), "a");
        assert_eq!(seen_rx.recv().await.unwrap(), "b");
        service.shutdown();
    }

    #[tokio::test]
    async fn failing_dispatcher_keeps_the_worker_alive() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let service = PrintService::new(Arc::new(RecordingDispatcher {
            seen: seen_tx,
            fail: true,
        }));

        service.start_background_tasks();
        service.enqueue(order("a"));
        service.enqueue(order("b"));

        // Both attempts happen even though every dispatch errors.
        assert_eq!(seen_rx.recv().await.unwrap(), "a");
        assert_eq!(seen_rx.recv().await.unwrap(), "b");
        service.shutdown();
    }
}
