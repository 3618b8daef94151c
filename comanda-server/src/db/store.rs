//! redb-based order store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `StoredOrder` (JSON) | Live order queue |
//!
//! Every status mutation goes through [`OrderStore::apply_transition`],
//! which reads the current row, validates the requested transition against
//! it and writes the new row inside a single write transaction. redb
//! serializes writers, so two racing transitions on the same order cannot
//! both pass validation; the loser observes the winner's committed state.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: a commit that returns is on
//! disk. Lifecycle events are only published after the commit returns.

use crate::orders::lifecycle::{self, TransitionContext, TransitionError, TransitionOutcome};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use shared::{LineItem, Order, OrderDraft, OrderKind, OrderPatch, OrderStatus};
use std::path::Path;
use thiserror::Error;

/// Table for order records: key = order id, value = JSON-serialized StoredOrder
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order {id} is locked in status {status}")]
    Locked { id: String, status: OrderStatus },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable order record
///
/// `items` stays a serialized column (the layout this system has always
/// persisted); decoding happens on read so one corrupt row degrades to an
/// empty item list instead of poisoning whole scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOrder {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub items: String,
    pub note: Option<String>,
    pub table_number: Option<String>,
    pub status: OrderStatus,
    pub cancel_reason: Option<String>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredOrder {
    /// Decode the serialized item column
    pub fn decode_items(&self) -> Result<Vec<LineItem>, serde_json::Error> {
        serde_json::from_str(&self.items)
    }

    /// Materialize the API-facing order; a corrupt item column is logged
    /// and surfaces as an empty list
    pub fn into_order(self) -> Order {
        let items = match self.decode_items() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    order_id = %self.id,
                    error = %e,
                    "Corrupt item column, returning empty items"
                );
                Vec::new()
            }
        };
        Order {
            id: self.id,
            kind: self.kind,
            table_number: self.table_number,
            note: self.note,
            items,
            status: self.status,
            cancel_reason: self.cancel_reason,
            paid: self.paid,
            created_at: self.created_at,
        }
    }
}

/// Per-status totals for dashboard badges
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCounts {
    pub pending: usize,
    pub live: usize,
    pub done: usize,
    pub canceled: usize,
    pub paid: usize,
}

/// Result of a committed (or idempotently re-confirmed) transition
#[derive(Debug, Clone)]
pub struct TransitionApplied {
    pub order: Order,
    pub outcome: TransitionOutcome,
}

/// Order store backed by redb
///
/// The single source of truth for order state. Opened once at startup and
/// shared as `Arc<OrderStore>`; methods are synchronous and hold no lock
/// across anything but the store operation itself.
pub struct OrderStore {
    db: Database,
}

impl OrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;

        // Create the table up front so first reads see it
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Persist a validated draft as a new `pending` order
    ///
    /// Assigns the id and creation timestamp. Ids are random v4 uuids and
    /// never reused.
    pub fn create(&self, draft: OrderDraft) -> StoreResult<Order> {
        let record = StoredOrder {
            id: uuid::Uuid::new_v4().to_string(),
            kind: draft.kind,
            items: serde_json::to_string(&draft.items)?,
            note: draft.note,
            table_number: draft.table_number,
            status: OrderStatus::Pending,
            cancel_reason: None,
            paid: false,
            created_at: Utc::now(),
        };

        let bytes = serde_json::to_vec(&record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            table.insert(record.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(record.into_order())
    }

    /// Fetch one order
    pub fn get(&self, id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let Some(guard) = table.get(id)? else {
            return Ok(None);
        };
        let record: StoredOrder = serde_json::from_slice(guard.value())?;
        Ok(Some(record.into_order()))
    }

    /// List orders, optionally filtered by status, newest first
    pub fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .snapshot_records()?
            .into_iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .map(StoredOrder::into_order)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Per-status totals
    pub fn counts(&self) -> StoreResult<OrderCounts> {
        let mut counts = OrderCounts::default();
        for record in self.snapshot_records()? {
            match record.status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::Live => counts.live += 1,
                OrderStatus::Done => counts.done += 1,
                OrderStatus::Canceled => counts.canceled += 1,
                OrderStatus::Paid => counts.paid += 1,
            }
        }
        Ok(counts)
    }

    /// Raw records, item column undecoded (revenue aggregation reads these)
    pub fn snapshot_records(&self) -> StoreResult<Vec<StoredOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    /// Apply a status transition, atomically against concurrent writers
    ///
    /// The only path that writes `status`, `paid` and `cancel_reason`; the
    /// three always change together, which is what keeps `paid == true`
    /// equivalent to `status == paid`.
    pub fn apply_transition(
        &self,
        id: &str,
        target: OrderStatus,
        ctx: TransitionContext,
    ) -> StoreResult<TransitionApplied> {
        let write_txn = self.db.begin_write()?;
        let applied = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let mut record: StoredOrder = match table.get(id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StoreError::NotFound(id.to_string())),
            };

            let outcome = lifecycle::check(record.status, target, ctx.cancel_reason.as_deref())?;

            if outcome == TransitionOutcome::Applied {
                record.status = target;
                record.paid = target == OrderStatus::Paid;
                record.cancel_reason = if target == OrderStatus::Canceled {
                    ctx.cancel_reason
                } else {
                    None
                };
                let bytes = serde_json::to_vec(&record)?;
                table.insert(id, bytes.as_slice())?;
            }

            TransitionApplied {
                order: record.into_order(),
                outcome,
            }
        };
        write_txn.commit()?;
        Ok(applied)
    }

    /// Edit the mutable fields of an order, permitted only while `pending`
    pub fn update_draft(&self, id: &str, patch: OrderPatch) -> StoreResult<Order> {
        let write_txn = self.db.begin_write()?;
        let order = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let mut record: StoredOrder = match table.get(id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StoreError::NotFound(id.to_string())),
            };

            if record.status != OrderStatus::Pending {
                return Err(StoreError::Locked {
                    id: id.to_string(),
                    status: record.status,
                });
            }

            if let Some(kind) = patch.kind {
                record.kind = kind;
            }
            if let Some(items) = patch.items {
                record.items = serde_json::to_string(&items)?;
            }
            if let Some(note) = patch.note {
                record.note = Some(note);
            }
            if let Some(table_number) = patch.table_number {
                record.table_number = Some(table_number);
            }

            let bytes = serde_json::to_vec(&record)?;
            table.insert(id, bytes.as_slice())?;
            record.into_order()
        };
        write_txn.commit()?;
        Ok(order)
    }

    /// Remove one order; `false` when it was already absent
    pub fn remove(&self, id: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            table.remove(id)?.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Delete every paid order, returning how many rows went away
    pub fn purge_paid(&self) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let mut ids = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let record: StoredOrder = serde_json::from_slice(value.value())?;
                if record.paid {
                    ids.push(key.value().to_string());
                }
            }
            for id in &ids {
                table.remove(id.as_str())?;
            }
            ids.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Insert a raw record directly (test fixture for corrupt/backdated rows)
    #[cfg(test)]
    pub(crate) fn insert_record(&self, record: &StoredOrder) -> StoreResult<()> {
        let bytes = serde_json::to_vec(record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            table.insert(record.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
