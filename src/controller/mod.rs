//! Controller backends for graph construction and execution
//!
//! This module defines the [`GraphController`] trait, the seam between the
//! session layer and the vendor-proprietary accelerator control library.
//! Two implementations exist:
//!
//! - [`MockController`] - a scriptable in-memory controller for tests and
//!   hardware-free development
//! - `SharedLibController` - the real backend, loading the vendor shared
//!   object at runtime (requires the `vendor-sdk` feature)
//!
//! The trait keeps the vendor's raw conventions at the seam: graph ids are
//! bare `u32` with 0 meaning failure, append/execute return `i32` status
//! codes with 0 meaning success. The session layer owns all translation
//! into typed errors, so backends stay thin.

pub mod mock;
#[cfg(feature = "vendor-sdk")]
pub mod shared_lib;

pub use mock::MockController;
#[cfg(feature = "vendor-sdk")]
pub use shared_lib::SharedLibController;

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::types::{FloatNodeData, GraphId, InputDescriptor, NodeShape, OutputDescriptor};

/// Statistics for controller operations
#[derive(Debug, Clone, Default)]
pub struct ControllerStats {
    /// Total calls forwarded to the controller
    pub calls_issued: u64,
    /// Calls that came back with a failing status
    pub calls_failed: u64,
    /// Bytes staged into the input node buffer
    pub bytes_staged: u64,
}

impl ControllerStats {
    /// Record a forwarded call and whether it failed
    pub fn record_call(&mut self, failed: bool) {
        self.calls_issued += 1;
        if failed {
            self.calls_failed += 1;
        }
    }

    /// Record bytes staged for the input node
    pub fn record_staged(&mut self, bytes: u64) {
        self.bytes_staged += bytes;
    }

    /// Calculate success rate as percentage
    pub fn success_rate(&self) -> f64 {
        if self.calls_issued == 0 {
            100.0
        } else {
            let ok = self.calls_issued - self.calls_failed;
            (ok as f64 / self.calls_issued as f64) * 100.0
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Unified interface to the accelerator control service
///
/// Implementations must be `Send` so a session can move across threads;
/// the interface itself is synchronous and expects externally serialized
/// access (one graph under construction per controller).
#[cfg_attr(test, mockall::automock)]
pub trait GraphController: Send {
    /// Version of the host-side wrapper library
    fn wrapper_version(&self) -> i32;

    /// Version of the accelerator-side controller binary
    fn binary_version(&self) -> i32;

    /// Bring up the controller with the given attributes
    fn init(&mut self, config: &ControllerConfig) -> Result<()>;

    /// Ask the controller to grow its device memory pool
    fn grow_memory(&mut self) -> Result<()>;

    /// Tear down the controller
    fn deinit(&mut self);

    /// Build the controller's baked-in graph for the given version
    ///
    /// Returns the raw graph id; 0 means failure.
    fn setup_graph(&mut self, version: i32) -> u32;

    /// Instantiate an empty graph for host-driven construction
    ///
    /// Returns the raw graph id; 0 means failure.
    fn instantiate_graph(&mut self) -> u32;

    /// Finalize a graph after all nodes are appended
    ///
    /// Returns a status code; 0 means success.
    fn construct_graph(&mut self, graph: GraphId) -> i32;

    /// Run the graph; when `use_input_buffer` is set, the staged input
    /// node buffer is fed in first
    ///
    /// Returns a status code; 0 means success.
    fn execute_graph(&mut self, graph: GraphId, use_input_buffer: bool) -> i32;

    /// Release all controller-side state for the graph
    ///
    /// Returns a status code; 0 means success.
    fn teardown_graph(&mut self, graph: GraphId) -> i32;

    /// Append a const node with inline data to the graph
    ///
    /// Returns a status code; 0 means success.
    fn append_const_node(
        &mut self,
        name: &str,
        graph: GraphId,
        node_id: i32,
        shape: NodeShape,
        data: &[u8],
    ) -> i32;

    /// Append an op node wired by contiguous descriptor blocks
    ///
    /// Returns a status code; 0 means success.
    #[allow(clippy::too_many_arguments)]
    fn append_node(
        &mut self,
        name: &str,
        graph: GraphId,
        node_id: i32,
        op_id: i32,
        padding_id: i32,
        inputs: &[InputDescriptor],
        outputs: &[OutputDescriptor],
    ) -> i32;

    /// The staging buffer for the graph input node's float data
    fn input_node_buffer(&mut self) -> &mut FloatNodeData;

    /// Read the float output of the named node
    ///
    /// A negative controller-side size surfaces as a `Controller` error.
    fn read_output_node_float(&mut self, node_name: &str) -> Result<Vec<f32>>;

    /// Toggle the controller's dummy-input debug mode
    fn set_dummy_input_enabled(&mut self, enabled: bool);

    /// Whether dummy-input debug mode is active
    fn dummy_input_enabled(&self) -> bool;

    /// Load the built-in dummy tensor for the given graph version into the
    /// input node buffer
    fn load_dummy_input(&mut self, version: i32) -> Result<()>;

    /// Forward a log-level change to the controller's own log subsystem
    fn set_log_level(&mut self, level: i32);

    /// Get controller operation statistics
    fn stats(&self) -> &ControllerStats;
}
