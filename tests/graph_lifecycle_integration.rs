//! Integration tests for the graph-construction lifecycle
//!
//! These tests drive a full construction pass against the mock
//! controller:
//! - setup / instantiate and the reserved-id-0 failure path
//! - descriptor staging through the arena and forwarding to append-node
//! - execute / teardown preconditions
//! - controller status-code propagation

mod common;

use common::{mock_session, session_with};
use socgraph_rs::controller::MockController;
use socgraph_rs::types::NodeShape;
use socgraph_rs::SocGraphError;

#[test]
fn test_full_construction_pass() {
    let mut session = mock_session();
    session.init().unwrap();
    session.instantiate_graph().unwrap();
    let graph = session.graph_id().unwrap();

    // A tiny graph: const weights -> matmul -> relu
    session.allocate_descriptor_arrays(3, 2).unwrap();
    session
        .append_const_node("weights", 1, NodeShape::new(1, 1, 4, 4), &[0u8; 64])
        .unwrap();

    let matmul_inputs = session.push_node_inputs(&[0, 1], &[0, 0]).unwrap();
    let matmul_outputs = session.push_node_outputs(&[64]).unwrap();
    session
        .append_node("matmul", 2, 40, 0, matmul_inputs, matmul_outputs)
        .unwrap();

    let relu_inputs = session.push_node_inputs(&[2], &[0]).unwrap();
    let relu_outputs = session.push_node_outputs(&[64]).unwrap();
    session
        .append_node("relu", 3, 51, 0, relu_inputs, relu_outputs)
        .unwrap();

    session.construct_graph().unwrap();
    session.release_descriptor_arrays();
    session.execute_graph().unwrap();
    session.teardown_graph().unwrap();
    session.finalize();

    let controller = session.controller();
    assert_eq!(controller.const_nodes().len(), 1);
    assert_eq!(controller.nodes().len(), 2);
    assert_eq!(controller.constructed(), &[graph]);
    assert_eq!(controller.executed(), &[(graph, true)]);
    assert_eq!(controller.torn_down(), &[graph]);
    assert!(!controller.initialized());
}

#[test]
fn test_append_node_forwards_contiguous_descriptor_blocks() {
    let mut session = mock_session();
    session.instantiate_graph().unwrap();
    session.allocate_descriptor_arrays(3, 2).unwrap();

    // Two nodes staged back to back in the same arena
    let first_inputs = session.push_node_inputs(&[10], &[0]).unwrap();
    let first_outputs = session.push_node_outputs(&[32]).unwrap();
    let second_inputs = session.push_node_inputs(&[11, 12], &[0, 1]).unwrap();
    let second_outputs = session.push_node_outputs(&[64]).unwrap();

    session
        .append_node("a", 20, 1, 0, first_inputs, first_outputs)
        .unwrap();
    session
        .append_node("b", 21, 1, 0, second_inputs, second_outputs)
        .unwrap();

    let nodes = session.controller().nodes();
    assert_eq!(nodes[0].inputs.len(), 1);
    assert_eq!(nodes[0].inputs[0].source_node_id, 10);
    assert_eq!(nodes[0].outputs[0].max_byte_size, 32);
    assert_eq!(nodes[1].inputs.len(), 2);
    assert_eq!(nodes[1].inputs[1].source_node_id, 12);
    assert_eq!(nodes[1].inputs[1].output_port_index, 1);
}

#[test]
fn test_staging_past_capacity_fails_and_is_retryable() {
    let mut session = mock_session();
    session.instantiate_graph().unwrap();
    session.allocate_descriptor_arrays(2, 1).unwrap();

    session.push_node_inputs(&[1], &[0]).unwrap();
    let err = session.push_node_inputs(&[2, 3], &[0, 0]).unwrap_err();
    assert!(matches!(err, SocGraphError::CapacityExceeded { .. }));

    // The failed append mutated nothing; a corrected one still fits
    session.push_node_inputs(&[2], &[0]).unwrap();
}

#[test]
fn test_execute_and_teardown_require_graph_id() {
    let mut session = mock_session();
    assert!(matches!(
        session.execute_graph().unwrap_err(),
        SocGraphError::GraphNotSet
    ));
    assert!(matches!(
        session.teardown_graph().unwrap_err(),
        SocGraphError::GraphNotSet
    ));
    assert!(session.controller().executed().is_empty());
    assert!(session.controller().torn_down().is_empty());
}

#[test]
fn test_setup_failure_leaves_no_graph_id() {
    let mut session = session_with(MockController::new().with_setup_failure());
    let err = session.setup_graph_dummy(3).unwrap_err();
    assert!(matches!(err, SocGraphError::GraphSetup { version: 3 }));
    assert!(session.graph_id().is_none());

    let err = session.instantiate_graph().unwrap_err();
    assert!(matches!(err, SocGraphError::GraphSetup { .. }));
}

#[test]
fn test_append_errors_propagate_controller_code() {
    let mut session = session_with(MockController::new().with_append_node_code(-5));
    session.instantiate_graph().unwrap();
    session.allocate_descriptor_arrays(1, 1).unwrap();

    let inputs = session.push_node_inputs(&[1], &[0]).unwrap();
    let outputs = session.push_node_outputs(&[16]).unwrap();
    let err = session.append_node("op", 2, 1, 0, inputs, outputs).unwrap_err();
    assert!(matches!(
        err,
        SocGraphError::Controller {
            op: "append_node",
            code: -5
        }
    ));
    assert!(session.controller().nodes().is_empty());
}

#[test]
fn test_execute_failure_propagates_controller_code() {
    let mut session = session_with(MockController::new().with_execute_code(7));
    session.instantiate_graph().unwrap();
    let err = session.execute_graph().unwrap_err();
    assert!(matches!(
        err,
        SocGraphError::Controller {
            op: "execute_graph",
            code: 7
        }
    ));
}

#[test]
fn test_release_is_safe_to_repeat() {
    let mut session = mock_session();
    session.allocate_descriptor_arrays(2, 2).unwrap();
    session.release_descriptor_arrays();
    session.release_descriptor_arrays();

    // A fresh allocation opens a new bracket
    session.allocate_descriptor_arrays(1, 1).unwrap();
    session.push_node_inputs(&[1], &[0]).unwrap();
}

#[test]
fn test_versions_are_forwarded() {
    let session = mock_session();
    assert_eq!(session.wrapper_version(), 1);
    assert_eq!(session.controller_version(), 3);
}
