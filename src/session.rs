//! Graph session: the host-facing surface of the crate
//!
//! A [`GraphSession`] owns the controller backend, the descriptor arena,
//! and the current target graph id, and exposes one method per operation
//! the host graph builder performs. Keeping the state in the session (not
//! in process globals) means each session builds one graph at a time but
//! any number of sessions can coexist.
//!
//! # Graph construction flow
//!
//! 1. [`init`](GraphSession::init) the controller
//! 2. [`instantiate_graph`](GraphSession::instantiate_graph) (or
//!    [`setup_graph_dummy`](GraphSession::setup_graph_dummy) for the
//!    baked-in graph)
//! 3. [`allocate_descriptor_arrays`](GraphSession::allocate_descriptor_arrays)
//!    with the graph's total descriptor counts
//! 4. per node: [`push_node_inputs`](GraphSession::push_node_inputs) /
//!    [`push_node_outputs`](GraphSession::push_node_outputs), then
//!    [`append_node`](GraphSession::append_node) (or
//!    [`append_const_node`](GraphSession::append_const_node))
//! 5. [`construct_graph`](GraphSession::construct_graph), then
//!    [`release_descriptor_arrays`](GraphSession::release_descriptor_arrays)
//! 6. [`fill_input_node_float`](GraphSession::fill_input_node_float),
//!    [`execute_graph`](GraphSession::execute_graph),
//!    [`read_output_node_float`](GraphSession::read_output_node_float)
//! 7. [`teardown_graph`](GraphSession::teardown_graph) and
//!    [`finalize`](GraphSession::finalize)
//!
//! Every failure is a typed [`SocGraphError`]; a failed descriptor append
//! leaves the arena unchanged, but after a failed execute or teardown the
//! controller-side state is undefined and the session should be torn down.

use crate::arena::{DescriptorArena, InputRange, OutputRange};
use crate::config::SessionConfig;
use crate::controller::GraphController;
use crate::error::{Result, SocGraphError};
use crate::logging;
use crate::types::{GraphId, NodeShape, TensorDims, FLAG_USE_DUMMY_GRAPH_INPUT};

/// One graph-construction and execution session against a controller
pub struct GraphSession<C: GraphController> {
    controller: C,
    config: SessionConfig,
    arena: DescriptorArena,
    graph_id: Option<GraphId>,
}

impl<C: GraphController> GraphSession<C> {
    /// Create a session over a controller backend
    pub fn new(controller: C, config: SessionConfig) -> Self {
        Self {
            controller,
            config,
            arena: DescriptorArena::default(),
            graph_id: None,
        }
    }

    /// Version of the host-side wrapper
    pub fn wrapper_version(&self) -> i32 {
        tracing::debug!("wrapper version");
        self.controller.wrapper_version()
    }

    /// Version of the accelerator-side controller binary
    pub fn controller_version(&self) -> i32 {
        tracing::debug!("controller version");
        self.controller.binary_version()
    }

    /// Bring up the controller with the configured attributes and grow its
    /// device memory pool
    pub fn init(&mut self) -> Result<()> {
        tracing::debug!("init");
        self.controller.init(&self.config.controller)?;
        self.controller.grow_memory()
    }

    /// Tear down the controller
    pub fn finalize(&mut self) {
        tracing::debug!("finalize");
        self.controller.deinit();
    }

    /// The current target graph id, if one is set
    pub fn graph_id(&self) -> Option<GraphId> {
        self.graph_id
    }

    /// Borrow the controller backend (mock inspection in tests)
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Build the controller's baked-in graph and make it the target
    pub fn setup_graph_dummy(&mut self, version: i32) -> Result<()> {
        tracing::debug!(version, "setup graph dummy");
        let raw = self.controller.setup_graph(version);
        let id = GraphId::new(raw).ok_or(SocGraphError::GraphSetup { version })?;
        self.graph_id = Some(id);
        Ok(())
    }

    /// Instantiate an empty graph for host-driven construction and make it
    /// the target
    pub fn instantiate_graph(&mut self) -> Result<()> {
        tracing::debug!("instantiate graph");
        let raw = self.controller.instantiate_graph();
        let id = GraphId::new(raw).ok_or(SocGraphError::GraphSetup {
            version: self.config.controller.graph_version,
        })?;
        self.graph_id = Some(id);
        Ok(())
    }

    /// Finalize the target graph after all nodes are appended
    pub fn construct_graph(&mut self) -> Result<()> {
        tracing::debug!("construct graph");
        let graph = self.require_graph()?;
        let code = self.controller.construct_graph(graph);
        self.check_code("construct_graph", code)
    }

    /// Run the target graph
    ///
    /// When debug bit 0 has switched the controller into dummy-input mode,
    /// the built-in tensor is loaded first.
    pub fn execute_graph(&mut self) -> Result<()> {
        tracing::debug!("execute graph");
        if self.controller.dummy_input_enabled() {
            self.controller
                .load_dummy_input(self.config.controller.graph_version)?;
        }
        let graph = self.require_graph()?;
        let code = self.controller.execute_graph(graph, true);
        self.check_code("execute_graph", code)
    }

    /// Release all controller-side state for the target graph
    pub fn teardown_graph(&mut self) -> Result<()> {
        tracing::debug!("teardown graph");
        let graph = self.require_graph()?;
        let code = self.controller.teardown_graph(graph);
        self.check_code("teardown_graph", code)?;
        self.graph_id = None;
        Ok(())
    }

    /// Stage `bytes` as the input node's float tensor
    ///
    /// Fails when `dims.element_count()` exceeds the controller buffer's
    /// capacity, or `bytes.len()` differs from `element_count * 4`.
    pub fn fill_input_node_float(&mut self, dims: TensorDims, bytes: &[u8]) -> Result<()> {
        tracing::debug!(%dims, len = bytes.len(), "fill input node float");
        self.controller.input_node_buffer().fill(dims, bytes)
    }

    /// Read the float output of the named node
    pub fn read_output_node_float(&mut self, node_name: &str) -> Result<Vec<f32>> {
        tracing::debug!(node = node_name, "read output node float");
        self.controller.read_output_node_float(node_name)
    }

    /// Preallocate the descriptor arrays for one construction pass
    pub fn allocate_descriptor_arrays(
        &mut self,
        total_inputs: usize,
        total_outputs: usize,
    ) -> Result<()> {
        tracing::debug!(total_inputs, total_outputs, "allocate descriptor arrays");
        self.arena = DescriptorArena::with_capacity(total_inputs, total_outputs)?;
        Ok(())
    }

    /// Discard the descriptor arrays; idempotent
    pub fn release_descriptor_arrays(&mut self) {
        tracing::debug!("release descriptor arrays");
        self.arena.release();
    }

    /// Stage one node's input wiring, zipping `node_ids[i]` with `ports[i]`
    ///
    /// Returns a contiguous range handle to pass to
    /// [`append_node`](GraphSession::append_node).
    pub fn push_node_inputs(&mut self, node_ids: &[i32], ports: &[i32]) -> Result<InputRange> {
        self.arena.append_inputs(node_ids, ports).inspect_err(|e| {
            tracing::error!(error = %e, "failed to stage node inputs");
        })
    }

    /// Stage one node's output size declarations
    pub fn push_node_outputs(&mut self, max_sizes: &[usize]) -> Result<OutputRange> {
        self.arena.append_outputs(max_sizes).inspect_err(|e| {
            tracing::error!(error = %e, "failed to stage node outputs");
        })
    }

    /// Append a const node with inline data to the target graph
    pub fn append_const_node(
        &mut self,
        name: &str,
        node_id: i32,
        shape: NodeShape,
        data: &[u8],
    ) -> Result<()> {
        tracing::debug!(name, node_id, %shape, len = data.len(), "append const node");
        let graph = self.require_graph()?;
        let code = self
            .controller
            .append_const_node(name, graph, node_id, shape, data);
        if code != 0 {
            tracing::error!(node_id, code, "failed to append const node");
            return Err(SocGraphError::Controller {
                op: "append_const_node",
                code,
            });
        }
        Ok(())
    }

    /// Append an op node wired by previously staged descriptor ranges
    pub fn append_node(
        &mut self,
        name: &str,
        node_id: i32,
        op_id: i32,
        padding_id: i32,
        inputs: InputRange,
        outputs: OutputRange,
    ) -> Result<()> {
        tracing::debug!(name, node_id, op_id, padding_id, "append node");
        let graph = self.require_graph()?;
        let code = self.controller.append_node(
            name,
            graph,
            node_id,
            op_id,
            padding_id,
            self.arena.inputs(inputs),
            self.arena.outputs(outputs),
        );
        if code != 0 {
            tracing::error!(node_id, code, "failed to append node");
            return Err(SocGraphError::Controller {
                op: "append_node",
                code,
            });
        }
        Ok(())
    }

    /// Set host- and controller-side log verbosity
    pub fn set_log_level(&mut self, level: i32) {
        self.config.log_level = level;
        logging::set_level(level);
        self.controller.set_log_level(level);
    }

    /// Apply a debug flag bitmask
    ///
    /// Bit 0 set enables the controller's dummy-input mode; a clear bit 0
    /// leaves the mode unchanged.
    pub fn set_debug_flag(&mut self, flags: u64) {
        tracing::info!("set debug flag {flags:#x}");
        if flags & FLAG_USE_DUMMY_GRAPH_INPUT != 0 {
            tracing::info!("enabling dummy graph input");
            self.controller.set_dummy_input_enabled(true);
        }
    }

    fn require_graph(&self) -> Result<GraphId> {
        self.graph_id.ok_or_else(|| {
            tracing::error!("graph id has not been set yet");
            SocGraphError::GraphNotSet
        })
    }

    fn check_code(&self, op: &'static str, code: i32) -> Result<()> {
        if code != 0 {
            tracing::error!(op, code, "controller call failed");
            return Err(SocGraphError::Controller { op, code });
        }
        Ok(())
    }
}
