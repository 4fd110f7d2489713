//! Pantry API Library Crate
//!
//! This library contains all the core logic for the pantry web service:
//! configuration, flat-file stores, REST handlers, the WebSocket
//! conversation surface, and routing. The `api` binary is a thin wrapper
//! around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod store;
pub mod ws;
