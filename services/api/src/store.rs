//! Flat-File Persistence
//!
//! All persisted state lives as flat, structured records under the data
//! directory: `catalog.json` and `recipes.json` are read once at startup and
//! treated read-only for the process lifetime, and `orders.jsonl` is the
//! append-only order ledger (one JSON order per line). Missing files are
//! seeded with the built-in defaults so the store is never empty; malformed
//! files are logged and replaced by in-memory defaults, never a crash.

use anyhow::{Context, Result};
use async_trait::async_trait;
use pantry_core::cart::CartSnapshot;
use pantry_core::catalog::{Catalog, Product};
use pantry_core::ledger::{MemoryLedger, Order, OrderLedger};
use pantry_core::recipe::{Recipe, RecipeBook};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const CATALOG_FILE: &str = "catalog.json";
const RECIPES_FILE: &str = "recipes.json";
const ORDERS_FILE: &str = "orders.jsonl";

/// Loads the product catalog, seeding the default stock when the file is
/// missing and falling back to it when the file is unreadable.
pub fn load_catalog(data_dir: &Path) -> Catalog {
    let path = data_dir.join(CATALOG_FILE);
    match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str::<Vec<Product>>(&raw) {
            Ok(products) => {
                info!(count = products.len(), path = %path.display(), "catalog loaded");
                Catalog::new(products)
            }
            Err(error) => {
                warn!(%error, path = %path.display(), "unparsable catalog file; using default stock");
                Catalog::default_stock()
            }
        },
        Err(_) => {
            let catalog = Catalog::default_stock();
            seed_file(&path, catalog.products());
            catalog
        }
    }
}

/// Loads the recipe table with the same missing/corrupt contract as the
/// catalog loader.
pub fn load_recipes(data_dir: &Path) -> RecipeBook {
    let path = data_dir.join(RECIPES_FILE);
    match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str::<Vec<Recipe>>(&raw) {
            Ok(recipes) => {
                info!(count = recipes.len(), path = %path.display(), "recipes loaded");
                RecipeBook::new(recipes)
            }
            Err(error) => {
                warn!(%error, path = %path.display(), "unparsable recipe file; using defaults");
                RecipeBook::default_recipes()
            }
        },
        Err(_) => {
            let book = RecipeBook::default_recipes();
            seed_file(&path, book.recipes());
            book
        }
    }
}

/// Writes the built-in defaults so the next start reads them from disk.
/// A failed seed is logged and ignored; the in-memory defaults still apply.
fn seed_file<T: serde::Serialize>(path: &Path, records: &[T]) {
    let write = || -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(path, json)?;
        Ok(())
    };
    match write() {
        Ok(()) => info!(path = %path.display(), "seeded default records"),
        Err(error) => warn!(%error, path = %path.display(), "could not seed default records"),
    }
}

/// File-backed order ledger: `orders.jsonl`, one order per line, append-only.
///
/// The service wraps this in a `tokio::sync::Mutex`, so appends from
/// concurrent conversations are serialized and ids stay gap-free.
pub struct JsonlLedger {
    path: PathBuf,
    inner: MemoryLedger,
}

impl JsonlLedger {
    /// Opens the ledger, replaying any existing order lines. Unparsable
    /// lines are skipped with a warning so one bad record never poisons
    /// the history.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(ORDERS_FILE);
        let mut orders: Vec<Order> = Vec::new();
        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                for (lineno, line) in raw.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Order>(line) {
                        Ok(order) => orders.push(order),
                        Err(error) => {
                            warn!(%error, lineno = lineno + 1, "skipping unparsable order record")
                        }
                    }
                }
                info!(count = orders.len(), path = %path.display(), "order ledger replayed");
            }
            Err(_) => {
                info!(path = %path.display(), "no existing order ledger; starting empty");
            }
        }
        Ok(Self {
            path,
            inner: MemoryLedger::with_orders(orders),
        })
    }

    async fn append_line(&self, order: &Order) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        let mut line = serde_json::to_string(order)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderLedger for JsonlLedger {
    async fn place(&mut self, snapshot: &CartSnapshot, currency: &str) -> Result<Order> {
        // Persist first; the in-memory history only records durable orders,
        // and it records the exact order that went to disk.
        let order = Order::from_snapshot(self.inner.next_id(), snapshot, currency);
        self.append_line(&order).await?;
        self.inner.push(order.clone());
        Ok(order)
    }

    fn orders(&self) -> Vec<Order> {
        self.inner.orders()
    }
}
