//! # Formats Module
//!
//! Durable serialization formats. Pure byte transformations only; file and
//! database I/O live in the storage module and the app layer.

pub mod persistence;

pub use persistence::{
    DiagramSnapshot, SnapshotHeader, diagram_from_bytes, diagram_to_bytes,
};
