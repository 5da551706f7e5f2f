//! # Storage Module
//!
//! Durable keyed storage for diagram state.

pub mod redb_store;

pub use redb_store::RedbStore;
