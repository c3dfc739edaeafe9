//! Core data types for socgraph-rs
//!
//! This module contains the value types exchanged across the controller
//! boundary: node wiring descriptors, graph identifiers, tensor shapes,
//! and the float staging buffer for the graph input node.
//!
//! # Main Types
//!
//! - [`InputDescriptor`] - One producer output feeding a consumer input slot
//! - [`OutputDescriptor`] - Maximum byte size a node output slot may produce
//! - [`GraphId`] - Controller-issued graph handle (0 is reserved for "none")
//! - [`TensorDims`] / [`NodeShape`] - Input tensor and const-node shapes
//! - [`FloatNodeData`] - Size-checked staging buffer for the input node
//!
//! # Debug Flags
//!
//! [`SetDebugFlag`](crate::session::GraphSession::set_debug_flag) takes a
//! bitmask; [`FLAG_USE_DUMMY_GRAPH_INPUT`] (bit 0) switches the controller
//! to its built-in dummy input tensor, which is useful to exercise a graph
//! before the host-side feed path exists.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SocGraphError};

/// Debug flag bit 0: feed the controller's built-in dummy tensor into the
/// graph input node on every execute.
pub const FLAG_USE_DUMMY_GRAPH_INPUT: u64 = 0x01;

/// Identifies one producer output feeding a consumer node's input slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptor {
    /// Id of the node producing the value
    pub source_node_id: i32,
    /// Which of the producer's output ports to read
    pub output_port_index: i32,
}

/// Declares the maximum buffer size a node's output slot may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Upper bound in bytes for the slot's output buffer
    pub max_byte_size: usize,
}

/// A controller-issued graph handle
///
/// The controller uses 0 as its "no graph" value, so a `GraphId` can never
/// hold 0; sessions keep `Option<GraphId>` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(u32);

impl GraphId {
    /// Wrap a raw controller id, rejecting the reserved value 0
    pub fn new(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(GraphId(raw))
        }
    }

    /// The raw id as handed out by the controller
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dimensions of the tensor fed into the graph input node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorDims {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub d: usize,
}

impl TensorDims {
    pub fn new(x: usize, y: usize, z: usize, d: usize) -> Self {
        Self { x, y, z, d }
    }

    /// Total element count `x*y*z*d`, or `None` on overflow
    pub fn element_count(&self) -> Option<usize> {
        self.x
            .checked_mul(self.y)?
            .checked_mul(self.z)?
            .checked_mul(self.d)
    }
}

impl fmt::Display for TensorDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}x{}", self.x, self.y, self.z, self.d)
    }
}

/// Shape of a const node appended to the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeShape {
    pub batch: usize,
    pub height: usize,
    pub width: usize,
    pub depth: usize,
}

impl NodeShape {
    pub fn new(batch: usize, height: usize, width: usize, depth: usize) -> Self {
        Self {
            batch,
            height,
            width,
            depth,
        }
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}x{}",
            self.batch, self.height, self.width, self.depth
        )
    }
}

/// Staging buffer for the graph input node's float data
///
/// The controller owns one of these per session; filling it validates the
/// declared dimensions against the buffer's fixed element capacity and the
/// supplied byte length against `element_count * size_of::<f32>()`.
#[derive(Debug, Clone)]
pub struct FloatNodeData {
    dims: TensorDims,
    data: Vec<u8>,
    capacity: usize,
}

impl FloatNodeData {
    /// Create an empty buffer able to hold `capacity` f32 elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dims: TensorDims::new(0, 0, 0, 0),
            data: Vec::new(),
            capacity,
        }
    }

    /// Element capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Dimensions recorded by the last successful fill
    pub fn dims(&self) -> TensorDims {
        self.dims
    }

    /// Raw bytes staged by the last successful fill
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of f32 elements currently staged
    pub fn element_count(&self) -> usize {
        self.data.len() / std::mem::size_of::<f32>()
    }

    /// Stage `bytes` as the input tensor with the given dimensions
    ///
    /// Fails without mutating the buffer if the element count exceeds the
    /// capacity or `bytes.len()` differs from `element_count * 4`.
    pub fn fill(&mut self, dims: TensorDims, bytes: &[u8]) -> Result<()> {
        let count = dims
            .element_count()
            .ok_or(SocGraphError::DimsOverflow(dims))?;
        if count > self.capacity {
            return Err(SocGraphError::CapacityExceeded {
                what: "input node buffer",
                requested: count,
                available: self.capacity,
            });
        }
        let expected = count * std::mem::size_of::<f32>();
        if bytes.len() != expected {
            return Err(SocGraphError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.dims = dims;
        Ok(())
    }

    /// View the staged bytes as f32 values
    pub fn as_f32_vec(&self) -> Vec<f32> {
        self.data
            .chunks_exact(std::mem::size_of::<f32>())
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_id_rejects_zero() {
        assert!(GraphId::new(0).is_none());
        assert_eq!(GraphId::new(7).unwrap().raw(), 7);
    }

    #[test]
    fn test_element_count() {
        assert_eq!(TensorDims::new(1, 1, 1, 4).element_count(), Some(4));
        assert_eq!(TensorDims::new(2, 3, 4, 5).element_count(), Some(120));
        assert_eq!(
            TensorDims::new(usize::MAX, 2, 1, 1).element_count(),
            None
        );
    }

    #[test]
    fn test_fill_accepts_matching_sizes() {
        let mut buf = FloatNodeData::with_capacity(4);
        let dims = TensorDims::new(1, 1, 1, 4);
        buf.fill(dims, &[0u8; 16]).unwrap();
        assert_eq!(buf.dims(), dims);
        assert_eq!(buf.element_count(), 4);
    }

    #[test]
    fn test_fill_rejects_byte_length_mismatch() {
        let mut buf = FloatNodeData::with_capacity(4);
        let err = buf
            .fill(TensorDims::new(1, 1, 1, 4), &[0u8; 15])
            .unwrap_err();
        assert!(matches!(
            err,
            SocGraphError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
        // Nothing staged on failure
        assert_eq!(buf.element_count(), 0);
    }

    #[test]
    fn test_fill_rejects_capacity_overrun() {
        let mut buf = FloatNodeData::with_capacity(4);
        let err = buf
            .fill(TensorDims::new(1, 1, 1, 8), &[0u8; 32])
            .unwrap_err();
        assert!(matches!(err, SocGraphError::CapacityExceeded { .. }));
    }

    #[test]
    fn test_as_f32_vec_round_trip() {
        let mut buf = FloatNodeData::with_capacity(2);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-2.0f32).to_le_bytes());
        buf.fill(TensorDims::new(1, 1, 1, 2), &bytes).unwrap();
        assert_eq!(buf.as_f32_vec(), vec![1.5, -2.0]);
    }
}
