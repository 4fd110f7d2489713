//! Shared Application State
//!
//! The catalog and recipe table are read-only after load and shared freely;
//! the order ledger is the one structure touched by concurrent
//! conversations, so it sits behind an async mutex and appends serialize.

use crate::config::Config;
use crate::store::JsonlLedger;
use pantry_core::catalog::Catalog;
use pantry_core::recipe::RecipeBook;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub recipes: Arc<RecipeBook>,
    pub ledger: Arc<Mutex<JsonlLedger>>,
    pub config: Arc<Config>,
}
