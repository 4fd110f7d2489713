//! pantry-core
//!
//! The dialogue core behind the pantry voice assistant: a read-only product
//! catalog with free-text resolution, a recipe table, a per-conversation
//! shopping cart, a keyword intent parser, an append-only order ledger seam,
//! and a turn-limited improv game state machine. Everything here is driven
//! one plain-text utterance at a time; audio, speech recognition, and
//! synthesis live entirely in the external runtime.

pub mod agent;
pub mod cart;
pub mod catalog;
pub mod improv;
pub mod intent;
pub mod ledger;
pub mod recipe;
