//! Order Ledger
//!
//! Append-only history of placed orders. `OrderLedger` is the persistence
//! seam: the core ships an in-memory implementation and the service layer
//! provides a file-backed one. Ids are sequential (count + 1), never reused,
//! and an order snapshot is frozen at placement, independent of any later
//! cart mutation.

use crate::cart::CartSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line item frozen into an order at placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: u32,
    pub quantity: u32,
}

/// A finalized order. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub lines: Vec<OrderLine>,
    pub total: u64,
    pub currency: String,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from a cart snapshot. The caller supplies the id.
    pub fn from_snapshot(id: u64, snapshot: &CartSnapshot, currency: &str) -> Self {
        Self {
            id,
            lines: snapshot
                .lines
                .iter()
                .map(|l| OrderLine {
                    product_id: l.product_id.clone(),
                    name: l.name.clone(),
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                })
                .collect(),
            total: snapshot.total,
            currency: currency.to_string(),
            placed_at: Utc::now(),
        }
    }
}

/// The append-only order store.
///
/// Callers reject empty carts before calling `place`; implementations only
/// deal with well-formed snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderLedger: Send {
    /// Appends a new order derived from the snapshot and returns it.
    async fn place(&mut self, snapshot: &CartSnapshot, currency: &str) -> Result<Order>;

    /// Returns all placed orders in placement order.
    fn orders(&self) -> Vec<Order>;
}

/// In-memory ledger used by tests and as the base of file-backed stores.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    orders: Vec<Order>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the ledger with previously persisted orders.
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn next_id(&self) -> u64 {
        self.orders.len() as u64 + 1
    }

    /// Synchronous append, building the order from a snapshot.
    pub fn append(&mut self, snapshot: &CartSnapshot, currency: &str) -> Order {
        let order = Order::from_snapshot(self.next_id(), snapshot, currency);
        self.orders.push(order.clone());
        order
    }

    /// Records an already-built order, used by file-backed wrappers that
    /// persist before recording. The caller is responsible for id
    /// continuity.
    pub fn push(&mut self, order: Order) {
        self.orders.push(order);
    }
}

#[async_trait]
impl OrderLedger for MemoryLedger {
    async fn place(&mut self, snapshot: &CartSnapshot, currency: &str) -> Result<Order> {
        Ok(self.append(snapshot, currency))
    }

    fn orders(&self) -> Vec<Order> {
        self.orders.clone()
    }
}
