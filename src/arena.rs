//! Descriptor arena for one graph-construction session
//!
//! The controller's append-node primitive takes a node's input and output
//! descriptors as contiguous blocks. Building every node's wiring into one
//! preallocated pair of arrays avoids per-node heap churn and ties the
//! descriptor lifetime to a single construction pass: allocate once,
//! append per node, release when the graph is built.
//!
//! Appends hand out [`InputRange`]/[`OutputRange`] handles rather than raw
//! pointers; the owning arena resolves a handle back to a contiguous slice
//! when the block is forwarded to the controller.
//!
//! # Invariants
//!
//! - Each cursor only grows, and never past its fixed capacity.
//! - A failed append mutates nothing, so it is safe to retry with
//!   corrected arguments.
//! - [`release`](DescriptorArena::release) is idempotent; a released (or
//!   never-allocated) arena has zero capacity, so any nonempty append
//!   fails the ordinary capacity check.

use crate::error::{Result, SocGraphError};
use crate::types::{InputDescriptor, OutputDescriptor};

/// Contiguous range of input descriptors handed out by one append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRange {
    start: usize,
    len: usize,
}

/// Contiguous range of output descriptors handed out by one append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRange {
    start: usize,
    len: usize,
}

macro_rules! range_accessors {
    ($ty:ident) => {
        impl $ty {
            /// Index of the first entry in the owning arena
            pub fn start(&self) -> usize {
                self.start
            }

            /// Number of entries in the range
            pub fn len(&self) -> usize {
                self.len
            }

            pub fn is_empty(&self) -> bool {
                self.len == 0
            }
        }
    };
}

range_accessors!(InputRange);
range_accessors!(OutputRange);

/// Preallocated, append-only storage for a graph's node wiring
///
/// Created with [`with_capacity`](DescriptorArena::with_capacity) once the
/// total descriptor counts for the graph are known, filled by successive
/// per-node appends, and discarded with [`release`](DescriptorArena::release)
/// after the graph is constructed.
#[derive(Debug, Default)]
pub struct DescriptorArena {
    inputs: Vec<InputDescriptor>,
    outputs: Vec<OutputDescriptor>,
    input_max: usize,
    output_max: usize,
}

impl DescriptorArena {
    /// Allocate backing storage for exactly `total_inputs` input
    /// descriptors and `total_outputs` output descriptors
    ///
    /// Both cursors start at 0. Reservation failure surfaces as
    /// [`SocGraphError::Allocation`] instead of a silently unusable arena.
    pub fn with_capacity(total_inputs: usize, total_outputs: usize) -> Result<Self> {
        let mut inputs = Vec::new();
        inputs.try_reserve_exact(total_inputs)?;
        let mut outputs = Vec::new();
        outputs.try_reserve_exact(total_outputs)?;
        Ok(Self {
            inputs,
            outputs,
            input_max: total_inputs,
            output_max: total_outputs,
        })
    }

    /// Write cursor of the input array
    pub fn input_cursor(&self) -> usize {
        self.inputs.len()
    }

    /// Write cursor of the output array
    pub fn output_cursor(&self) -> usize {
        self.outputs.len()
    }

    /// Fixed capacity of the input array
    pub fn input_capacity(&self) -> usize {
        self.input_max
    }

    /// Fixed capacity of the output array
    pub fn output_capacity(&self) -> usize {
        self.output_max
    }

    /// Append one node's input descriptors, zipping `node_ids[i]` with
    /// `ports[i]`
    ///
    /// Returns a range handle covering exactly the entries just written.
    /// Fails without mutating the arena if the slices differ in length or
    /// the remaining capacity is too small.
    pub fn append_inputs(&mut self, node_ids: &[i32], ports: &[i32]) -> Result<InputRange> {
        if node_ids.len() != ports.len() {
            return Err(SocGraphError::LengthMismatch {
                ids: node_ids.len(),
                ports: ports.len(),
            });
        }
        let k = node_ids.len();
        let cursor = self.inputs.len();
        if cursor + k > self.input_max {
            return Err(SocGraphError::CapacityExceeded {
                what: "node inputs",
                requested: k,
                available: self.input_max - cursor,
            });
        }
        self.inputs.extend(
            node_ids
                .iter()
                .zip(ports)
                .map(|(&source_node_id, &output_port_index)| InputDescriptor {
                    source_node_id,
                    output_port_index,
                }),
        );
        Ok(InputRange { start: cursor, len: k })
    }

    /// Append one node's output descriptors from `max_sizes`
    ///
    /// Same contract as [`append_inputs`](DescriptorArena::append_inputs)
    /// with single-field entries.
    pub fn append_outputs(&mut self, max_sizes: &[usize]) -> Result<OutputRange> {
        let k = max_sizes.len();
        let cursor = self.outputs.len();
        if cursor + k > self.output_max {
            return Err(SocGraphError::CapacityExceeded {
                what: "node outputs",
                requested: k,
                available: self.output_max - cursor,
            });
        }
        self.outputs.extend(
            max_sizes
                .iter()
                .map(|&max_byte_size| OutputDescriptor { max_byte_size }),
        );
        Ok(OutputRange { start: cursor, len: k })
    }

    /// Resolve an input range handle to its contiguous slice
    pub fn inputs(&self, range: InputRange) -> &[InputDescriptor] {
        &self.inputs[range.start..range.start + range.len]
    }

    /// Resolve an output range handle to its contiguous slice
    pub fn outputs(&self, range: OutputRange) -> &[OutputDescriptor] {
        &self.outputs[range.start..range.start + range.len]
    }

    /// Discard both arrays and zero the capacities
    ///
    /// Idempotent; releasing an already-released arena is a no-op.
    pub fn release(&mut self) {
        self.inputs = Vec::new();
        self.outputs = Vec::new();
        self.input_max = 0;
        self.output_max = 0;
    }
}
