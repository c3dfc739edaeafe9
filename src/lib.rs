//! # socgraph-rs: SoC accelerator graph interface
//!
//! A session-oriented interface for building and executing NN graphs on a
//! SoC DSP accelerator. The vendor's control library owns graph placement,
//! op kernels, and device communication; this crate owns the host-side
//! mechanics around it: descriptor staging, argument marshaling, and
//! turning raw status codes into typed errors.
//!
//! ## Architecture
//!
//! - **Session**: [`session::GraphSession`] holds everything one graph
//!   needs — the controller backend, the descriptor arena, and the target
//!   graph id
//! - **Arena**: [`arena::DescriptorArena`] preallocates the graph's node
//!   wiring in two flat arrays and hands out contiguous range handles
//! - **Controller**: the [`controller::GraphController`] trait abstracts
//!   the vendor library; [`controller::MockController`] runs everything
//!   without hardware, and the `vendor-sdk` feature adds a backend that
//!   loads the real shared object
//!
//! ## Example
//!
//! ```
//! use socgraph_rs::{
//!     config::SessionConfig,
//!     controller::MockController,
//!     session::GraphSession,
//!     types::{NodeShape, TensorDims},
//! };
//!
//! # fn main() -> socgraph_rs::Result<()> {
//! let controller = MockController::new().with_input_capacity(4);
//! let mut session = GraphSession::new(controller, SessionConfig::default());
//!
//! session.init()?;
//! session.instantiate_graph()?;
//!
//! // One op node fed by a const node
//! session.allocate_descriptor_arrays(1, 1)?;
//! session.append_const_node("weights", 1, NodeShape::new(1, 1, 1, 4), &[0u8; 16])?;
//! let inputs = session.push_node_inputs(&[1], &[0])?;
//! let outputs = session.push_node_outputs(&[16])?;
//! session.append_node("matmul", 2, 40, 0, inputs, outputs)?;
//! session.construct_graph()?;
//! session.release_descriptor_arrays();
//!
//! session.fill_input_node_float(TensorDims::new(1, 1, 1, 4), &[0u8; 16])?;
//! session.execute_graph()?;
//!
//! session.teardown_graph()?;
//! session.finalize();
//! # Ok(())
//! # }
//! ```

pub mod arena;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use arena::{DescriptorArena, InputRange, OutputRange};
pub use config::{ControllerConfig, SessionConfig};
pub use controller::{GraphController, MockController};
pub use error::{Result, SocGraphError};
pub use session::GraphSession;
pub use types::{
    FloatNodeData, GraphId, InputDescriptor, NodeShape, OutputDescriptor, TensorDims,
    FLAG_USE_DUMMY_GRAPH_INPUT,
};

#[cfg(feature = "vendor-sdk")]
pub use controller::SharedLibController;
