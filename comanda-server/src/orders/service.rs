//! Order lifecycle orchestration
//!
//! The service owns side-effect ordering around the store: validate first,
//! persist second, broadcast third, print dispatch last. A broadcast or
//! print problem never reaches the caller; a persistence problem aborts
//! before either side effect fires.

use crate::db::{OrderCounts, OrderStore, TransitionApplied};
use crate::orders::lifecycle::{TransitionContext, TransitionOutcome};
use crate::printing::PrintService;
use crate::realtime::Broadcaster;
use crate::utils::{AppError, AppResult};
use shared::{LineItem, Order, OrderDraft, OrderEvent, OrderEventKind, OrderPatch, OrderStatus};
use std::sync::{Arc, Mutex};

/// Options accompanying a transition request
#[derive(Debug, Clone, Default)]
pub struct TransitionRequest {
    pub cancel_reason: Option<String>,
    /// Ship a receipt after a committed `paid` transition
    pub print: bool,
}

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderService {
    store: Arc<OrderStore>,
    broadcaster: Broadcaster,
    printer: PrintService,
    /// Held across commit + publish so events leave in commit order.
    /// Covers only a local disk write and a channel send, never a
    /// network call.
    commit_lock: Arc<Mutex<()>>,
}

impl OrderService {
    pub fn new(store: Arc<OrderStore>, broadcaster: Broadcaster, printer: PrintService) -> Self {
        Self {
            store,
            broadcaster,
            printer,
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Intake: validate the draft, persist it as `pending`, announce it
    pub fn create(&self, draft: OrderDraft) -> AppResult<Order> {
        validate_items(&draft.items)?;

        let _guard = self.commit_lock.lock().expect("commit lock");
        let order = self.store.create(draft)?;
        tracing::info!(order_id = %order.id, kind = ?order.kind, "Order created");
        self.broadcaster
            .publish(OrderEvent::new(OrderEventKind::New, order.clone()));
        Ok(order)
    }

    /// Apply a status transition and fire the follow-up side effects
    ///
    /// An idempotent re-pay commits nothing and broadcasts nothing, but a
    /// requested print still runs: manual re-print is the recovery path
    /// for a receipt that never came out.
    pub fn transition(
        &self,
        id: &str,
        target: OrderStatus,
        req: TransitionRequest,
    ) -> AppResult<Order> {
        let ctx = TransitionContext {
            cancel_reason: req.cancel_reason,
        };

        let _guard = self.commit_lock.lock().expect("commit lock");
        let TransitionApplied { order, outcome } = self.store.apply_transition(id, target, ctx)?;

        match outcome {
            TransitionOutcome::Applied => {
                tracing::info!(order_id = %order.id, status = %order.status, "Order transition committed");
                self.broadcaster.publish(OrderEvent::new(
                    OrderEventKind::for_status(order.status),
                    order.clone(),
                ));
            }
            TransitionOutcome::AlreadyPaid => {
                tracing::debug!(order_id = %order.id, "Duplicate paid confirmation, state unchanged");
            }
        }

        // Strictly after the commit; failures stay inside the print pipeline.
        if target == OrderStatus::Paid && req.print {
            self.printer.enqueue(order.clone());
        }

        Ok(order)
    }

    /// Edit a pending order's mutable fields
    pub fn edit(&self, id: &str, patch: OrderPatch) -> AppResult<Order> {
        if let Some(items) = &patch.items {
            validate_items(items)?;
        }
        let order = self.store.update_draft(id, patch)?;
        tracing::info!(order_id = %order.id, "Order draft updated");
        Ok(order)
    }

    pub fn get(&self, id: &str) -> AppResult<Order> {
        self.store
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("Order {id}")))
    }

    pub fn list(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        Ok(self.store.list(status)?)
    }

    pub fn counts(&self) -> AppResult<OrderCounts> {
        Ok(self.store.counts()?)
    }

    /// Idempotent removal; absent targets are a no-op
    pub fn remove(&self, id: &str) -> AppResult<bool> {
        let removed = self.store.remove(id)?;
        if removed {
            tracing::info!(order_id = %id, "Order removed");
        }
        Ok(removed)
    }

    /// Administrative purge of settled orders
    pub fn purge_paid(&self) -> AppResult<usize> {
        let removed = self.store.purge_paid()?;
        if removed > 0 {
            tracing::info!(removed, "Purged paid orders");
        }
        Ok(removed)
    }
}

/// Intake validation, run before any mutation
fn validate_items(items: &[LineItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::Validation("No items provided".to_string()));
    }
    for item in items {
        if item.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Item name must not be empty".to_string(),
            ));
        }
        if item.quantity == 0 {
            return Err(AppError::Validation(format!(
                "Item '{}' has zero quantity",
                item.name
            )));
        }
        if item.unit_price.is_some_and(|p| p < 0) {
            return Err(AppError::Validation(format!(
                "Item '{}' has a negative price",
                item.name
            )));
        }
    }
    Ok(())
}
