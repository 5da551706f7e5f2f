//! # Persistence Format
//!
//! Binary serialization for diagram snapshots.
//!
//! Format: Header (5 bytes) + postcard-serialized snapshot data.
//! - 4 bytes: Magic ("ERDV")
//! - 1 byte: Version
//!
//! Pre-deserialization validation: minimum size, maximum payload size, and
//! header checks all happen before the payload is parsed, so corrupt or
//! hostile data can never trigger a large allocation.

use crate::graph::Diagram;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_SNAPSHOT_PAYLOAD_SIZE};
use crate::types::{Edge, ErdError, Node};
use serde::{Deserialize, Serialize};

/// Minimum valid data size (header only).
const MIN_DATA_SIZE: usize = 5;

// =============================================================================
// SNAPSHOT HEADER
// =============================================================================

/// The snapshot header precedes all diagram data.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a new header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), ErdError> {
        if &self.magic != MAGIC_BYTES {
            return Err(ErdError::Deserialization("invalid magic bytes".to_string()));
        }
        if self.version != FORMAT_VERSION {
            return Err(ErdError::Deserialization(format!(
                "unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ErdError> {
        if bytes.len() < MIN_DATA_SIZE {
            return Err(ErdError::Deserialization("header too short".to_string()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SNAPSHOT PAYLOAD
// =============================================================================

/// Serializable representation of the diagram: exactly the `{nodes, edges}`
/// blob the persistence contract names. Transient view state (hover, modal,
/// sync status) is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl From<&Diagram> for DiagramSnapshot {
    fn from(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram.nodes().to_vec(),
            edges: diagram.edges().to_vec(),
        }
    }
}

impl TryFrom<DiagramSnapshot> for Diagram {
    type Error = ErdError;

    fn try_from(snapshot: DiagramSnapshot) -> Result<Self, Self::Error> {
        Diagram::from_parts(snapshot.nodes, snapshot.edges)
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a diagram to bytes (header + payload). Pure transformation, no
/// file I/O.
pub fn diagram_to_bytes(diagram: &Diagram) -> Result<Vec<u8>, ErdError> {
    let header = SnapshotHeader::new();
    let snapshot = DiagramSnapshot::from(diagram);

    let payload =
        postcard::to_stdvec(&snapshot).map_err(|e| ErdError::Serialization(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_DATA_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a diagram from bytes. Pure transformation, no file I/O.
///
/// Size and header are validated before the payload is touched.
pub fn diagram_from_bytes(bytes: &[u8]) -> Result<Diagram, ErdError> {
    if bytes.len() < MIN_DATA_SIZE {
        return Err(ErdError::Deserialization(
            "data too short: minimum 5 bytes required".to_string(),
        ));
    }

    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(ErdError::Deserialization(format!(
            "data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_DATA_SIZE..];
    let snapshot: DiagramSnapshot = postcard::from_bytes(payload).map_err(|e| {
        ErdError::Deserialization(format!("failed to deserialize diagram data: {}", e))
    })?;

    Diagram::try_from(snapshot)
}

// =============================================================================
// TESTS
// =============================================================================
