//! Mock controller implementation for testing
//!
//! This module provides an in-memory controller that can stand in for the
//! vendor library, so graph construction and execution flows can be
//! exercised without the accelerator attached.
//!
//! # Features
//!
//! - **Failure injection**: any controller call can be scripted to return
//!   a failing status code or the reserved graph id 0
//! - **Call recording**: appended nodes, executed graphs, and teardowns
//!   are recorded for assertions
//! - **Output data**: per-node float outputs can be preloaded; reads of
//!   unconfigured nodes simulate the controller's negative-size failure
//!
//! # Example
//!
//! ```
//! use socgraph_rs::controller::MockController;
//! use socgraph_rs::session::GraphSession;
//! use socgraph_rs::config::SessionConfig;
//!
//! let controller = MockController::new()
//!     .with_input_capacity(1024)
//!     .with_output_node("softmax", vec![0.1, 0.9]);
//! let mut session = GraphSession::new(controller, SessionConfig::default());
//! session.setup_graph_dummy(3).unwrap();
//! session.execute_graph().unwrap();
//! ```

use std::collections::HashMap;

use super::{ControllerStats, GraphController};
use crate::config::ControllerConfig;
use crate::error::{Result, SocGraphError};
use crate::types::{FloatNodeData, GraphId, InputDescriptor, NodeShape, OutputDescriptor};

/// Default element capacity of the mock's input node buffer
const DEFAULT_INPUT_CAPACITY: usize = 1024;

/// Record of one `append_const_node` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstNodeRecord {
    pub name: String,
    pub graph: GraphId,
    pub node_id: i32,
    pub shape: NodeShape,
    pub data_len: usize,
}

/// Record of one `append_node` call, descriptors copied out of the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub name: String,
    pub graph: GraphId,
    pub node_id: i32,
    pub op_id: i32,
    pub padding_id: i32,
    pub inputs: Vec<InputDescriptor>,
    pub outputs: Vec<OutputDescriptor>,
}

/// In-memory controller for testing without the accelerator
pub struct MockController {
    wrapper_version: i32,
    binary_version: i32,
    initialized: bool,
    next_graph_id: u32,

    // Scripted failures; 0 everywhere means everything succeeds
    setup_returns_zero: bool,
    instantiate_returns_zero: bool,
    construct_code: i32,
    execute_code: i32,
    teardown_code: i32,
    append_const_code: i32,
    append_node_code: i32,

    input_buffer: FloatNodeData,
    outputs: HashMap<String, Vec<f32>>,
    dummy_input: bool,
    dummy_loads: u32,
    log_level: Option<i32>,

    const_nodes: Vec<ConstNodeRecord>,
    nodes: Vec<NodeRecord>,
    executed: Vec<(GraphId, bool)>,
    constructed: Vec<GraphId>,
    torn_down: Vec<GraphId>,
    stats: ControllerStats,
}

impl MockController {
    /// Create a mock controller that succeeds at everything
    pub fn new() -> Self {
        Self {
            wrapper_version: 1,
            binary_version: 3,
            initialized: false,
            next_graph_id: 1,
            setup_returns_zero: false,
            instantiate_returns_zero: false,
            construct_code: 0,
            execute_code: 0,
            teardown_code: 0,
            append_const_code: 0,
            append_node_code: 0,
            input_buffer: FloatNodeData::with_capacity(DEFAULT_INPUT_CAPACITY),
            outputs: HashMap::new(),
            dummy_input: false,
            dummy_loads: 0,
            log_level: None,
            const_nodes: Vec::new(),
            nodes: Vec::new(),
            executed: Vec::new(),
            constructed: Vec::new(),
            torn_down: Vec::new(),
            stats: ControllerStats::default(),
        }
    }

    /// Set the element capacity of the input node buffer
    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        self.input_buffer = FloatNodeData::with_capacity(capacity);
        self
    }

    /// Make `setup_graph` and `instantiate_graph` hand back the reserved
    /// id 0
    pub fn with_setup_failure(mut self) -> Self {
        self.setup_returns_zero = true;
        self.instantiate_returns_zero = true;
        self
    }

    /// Script the status code returned by `construct_graph`
    pub fn with_construct_code(mut self, code: i32) -> Self {
        self.construct_code = code;
        self
    }

    /// Script the status code returned by `execute_graph`
    pub fn with_execute_code(mut self, code: i32) -> Self {
        self.execute_code = code;
        self
    }

    /// Script the status code returned by `teardown_graph`
    pub fn with_teardown_code(mut self, code: i32) -> Self {
        self.teardown_code = code;
        self
    }

    /// Script the status code returned by `append_const_node`
    pub fn with_append_const_code(mut self, code: i32) -> Self {
        self.append_const_code = code;
        self
    }

    /// Script the status code returned by `append_node`
    pub fn with_append_node_code(mut self, code: i32) -> Self {
        self.append_node_code = code;
        self
    }

    /// Preload the float output of a node
    pub fn with_output_node(mut self, name: impl Into<String>, data: Vec<f32>) -> Self {
        self.outputs.insert(name.into(), data);
        self
    }

    /// Whether `init` has run and `deinit` has not
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// All `append_const_node` calls seen so far
    pub fn const_nodes(&self) -> &[ConstNodeRecord] {
        &self.const_nodes
    }

    /// All `append_node` calls seen so far
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// All `execute_graph` calls seen so far
    pub fn executed(&self) -> &[(GraphId, bool)] {
        &self.executed
    }

    /// All `construct_graph` calls seen so far
    pub fn constructed(&self) -> &[GraphId] {
        &self.constructed
    }

    /// All `teardown_graph` calls seen so far
    pub fn torn_down(&self) -> &[GraphId] {
        &self.torn_down
    }

    /// How many times the dummy tensor was loaded
    pub fn dummy_loads(&self) -> u32 {
        self.dummy_loads
    }

    /// The last log level forwarded via `set_log_level`
    pub fn log_level(&self) -> Option<i32> {
        self.log_level
    }
}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphController for MockController {
    fn wrapper_version(&self) -> i32 {
        self.wrapper_version
    }

    fn binary_version(&self) -> i32 {
        self.binary_version
    }

    fn init(&mut self, config: &ControllerConfig) -> Result<()> {
        self.stats.record_call(false);
        self.initialized = true;
        tracing::info!(
            dcvs = config.enable_dcvs,
            bus = config.bus_usage,
            version = config.graph_version,
            "mock controller initialized"
        );
        Ok(())
    }

    fn grow_memory(&mut self) -> Result<()> {
        self.stats.record_call(false);
        Ok(())
    }

    fn deinit(&mut self) {
        self.stats.record_call(false);
        self.initialized = false;
        tracing::info!("mock controller deinitialized");
    }

    fn setup_graph(&mut self, version: i32) -> u32 {
        let failed = self.setup_returns_zero;
        self.stats.record_call(failed);
        if failed {
            return 0;
        }
        tracing::debug!(version, "mock setup graph");
        let id = self.next_graph_id;
        self.next_graph_id += 1;
        id
    }

    fn instantiate_graph(&mut self) -> u32 {
        let failed = self.instantiate_returns_zero;
        self.stats.record_call(failed);
        if failed {
            return 0;
        }
        let id = self.next_graph_id;
        self.next_graph_id += 1;
        id
    }

    fn construct_graph(&mut self, graph: GraphId) -> i32 {
        self.stats.record_call(self.construct_code != 0);
        self.constructed.push(graph);
        self.construct_code
    }

    fn execute_graph(&mut self, graph: GraphId, use_input_buffer: bool) -> i32 {
        self.stats.record_call(self.execute_code != 0);
        self.executed.push((graph, use_input_buffer));
        self.execute_code
    }

    fn teardown_graph(&mut self, graph: GraphId) -> i32 {
        self.stats.record_call(self.teardown_code != 0);
        self.torn_down.push(graph);
        self.teardown_code
    }

    fn append_const_node(
        &mut self,
        name: &str,
        graph: GraphId,
        node_id: i32,
        shape: NodeShape,
        data: &[u8],
    ) -> i32 {
        self.stats.record_call(self.append_const_code != 0);
        if self.append_const_code == 0 {
            self.const_nodes.push(ConstNodeRecord {
                name: name.to_string(),
                graph,
                node_id,
                shape,
                data_len: data.len(),
            });
        }
        self.append_const_code
    }

    fn append_node(
        &mut self,
        name: &str,
        graph: GraphId,
        node_id: i32,
        op_id: i32,
        padding_id: i32,
        inputs: &[InputDescriptor],
        outputs: &[OutputDescriptor],
    ) -> i32 {
        self.stats.record_call(self.append_node_code != 0);
        if self.append_node_code == 0 {
            self.nodes.push(NodeRecord {
                name: name.to_string(),
                graph,
                node_id,
                op_id,
                padding_id,
                inputs: inputs.to_vec(),
                outputs: outputs.to_vec(),
            });
        }
        self.append_node_code
    }

    fn input_node_buffer(&mut self) -> &mut FloatNodeData {
        &mut self.input_buffer
    }

    fn read_output_node_float(&mut self, node_name: &str) -> Result<Vec<f32>> {
        match self.outputs.get(node_name) {
            Some(data) => {
                self.stats.record_call(false);
                Ok(data.clone())
            }
            None => {
                // The vendor library reports an unknown node as size -1
                self.stats.record_call(true);
                Err(SocGraphError::Controller {
                    op: "read_output_node_float",
                    code: -1,
                })
            }
        }
    }

    fn set_dummy_input_enabled(&mut self, enabled: bool) {
        self.dummy_input = enabled;
    }

    fn dummy_input_enabled(&self) -> bool {
        self.dummy_input
    }

    fn load_dummy_input(&mut self, version: i32) -> Result<()> {
        tracing::debug!(version, "mock load dummy input");
        self.dummy_loads += 1;
        Ok(())
    }

    fn set_log_level(&mut self, level: i32) {
        self.log_level = Some(level);
    }

    fn stats(&self) -> &ControllerStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_ids_are_sequential_and_nonzero() {
        let mut controller = MockController::new();
        let first = controller.setup_graph(3);
        let second = controller.instantiate_graph();
        assert_ne!(first, 0);
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_setup_failure_returns_zero() {
        let mut controller = MockController::new().with_setup_failure();
        assert_eq!(controller.setup_graph(3), 0);
        assert_eq!(controller.instantiate_graph(), 0);
        assert_eq!(controller.stats().calls_failed, 2);
    }

    #[test]
    fn test_append_node_records_descriptors() {
        let mut controller = MockController::new();
        let graph = GraphId::new(1).unwrap();
        let inputs = [InputDescriptor {
            source_node_id: 10,
            output_port_index: 0,
        }];
        let outputs = [OutputDescriptor { max_byte_size: 64 }];

        let code = controller.append_node("relu", graph, 11, 5, 0, &inputs, &outputs);
        assert_eq!(code, 0);

        let record = &controller.nodes()[0];
        assert_eq!(record.name, "relu");
        assert_eq!(record.inputs, inputs);
        assert_eq!(record.outputs, outputs);
    }

    #[test]
    fn test_scripted_append_failure_records_nothing() {
        let mut controller = MockController::new().with_append_node_code(-3);
        let graph = GraphId::new(1).unwrap();
        let code = controller.append_node("relu", graph, 11, 5, 0, &[], &[]);
        assert_eq!(code, -3);
        assert!(controller.nodes().is_empty());
    }

    #[test]
    fn test_read_unknown_output_fails_like_the_vendor() {
        let mut controller = MockController::new();
        let err = controller.read_output_node_float("missing").unwrap_err();
        assert!(matches!(
            err,
            SocGraphError::Controller { code: -1, .. }
        ));
    }

    #[test]
    fn test_preloaded_output_round_trip() {
        let mut controller = MockController::new().with_output_node("softmax", vec![0.25, 0.75]);
        let data = controller.read_output_node_float("softmax").unwrap();
        assert_eq!(data, vec![0.25, 0.75]);
    }
}
