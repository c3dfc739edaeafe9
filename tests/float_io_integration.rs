//! Integration tests for the float input/output paths and debug flags
//!
//! Covers the size checks on filling the input node, output reads against
//! preloaded and unknown nodes, and the dummy-input debug mode.

mod common;

use common::{f32_bytes, session_with};
use socgraph_rs::controller::{GraphController, MockController};
use socgraph_rs::types::{TensorDims, FLAG_USE_DUMMY_GRAPH_INPUT};
use socgraph_rs::SocGraphError;

#[test]
fn test_fill_input_within_capacity_succeeds() {
    let mut session = session_with(MockController::new().with_input_capacity(4));
    session
        .fill_input_node_float(TensorDims::new(1, 1, 1, 4), &f32_bytes(4))
        .unwrap();
}

#[test]
fn test_fill_input_byte_length_mismatch_fails() {
    let mut session = session_with(MockController::new().with_input_capacity(4));
    let err = session
        .fill_input_node_float(TensorDims::new(1, 1, 1, 4), &[0u8; 15])
        .unwrap_err();
    assert!(matches!(
        err,
        SocGraphError::SizeMismatch {
            expected: 16,
            actual: 15
        }
    ));
}

#[test]
fn test_fill_input_over_capacity_fails() {
    let mut session = session_with(MockController::new().with_input_capacity(4));
    let err = session
        .fill_input_node_float(TensorDims::new(1, 2, 1, 4), &f32_bytes(8))
        .unwrap_err();
    assert!(matches!(
        err,
        SocGraphError::CapacityExceeded {
            requested: 8,
            available: 4,
            ..
        }
    ));
}

#[test]
fn test_read_output_of_known_node() {
    let mut session =
        session_with(MockController::new().with_output_node("softmax", vec![0.1, 0.2, 0.7]));
    let data = session.read_output_node_float("softmax").unwrap();
    assert_eq!(data, vec![0.1, 0.2, 0.7]);
}

#[test]
fn test_read_output_of_unknown_node_fails() {
    let mut session = session_with(MockController::new());
    let err = session.read_output_node_float("missing").unwrap_err();
    assert!(matches!(
        err,
        SocGraphError::Controller {
            op: "read_output_node_float",
            code: -1
        }
    ));
}

#[test]
fn test_dummy_input_loaded_on_execute_when_flag_set() {
    let mut session = session_with(MockController::new());
    session.setup_graph_dummy(3).unwrap();

    session.set_debug_flag(FLAG_USE_DUMMY_GRAPH_INPUT);
    session.execute_graph().unwrap();
    session.execute_graph().unwrap();

    assert_eq!(session.controller().dummy_loads(), 2);
}

#[test]
fn test_dummy_input_not_loaded_without_flag() {
    let mut session = session_with(MockController::new());
    session.setup_graph_dummy(3).unwrap();

    // Bit 0 clear: other bits must not enable the mode
    session.set_debug_flag(0xFE);
    session.execute_graph().unwrap();

    assert_eq!(session.controller().dummy_loads(), 0);
    assert!(!session.controller().dummy_input_enabled());
}

#[test]
fn test_log_level_forwarded_to_controller() {
    let mut session = session_with(MockController::new());
    session.set_log_level(2);
    assert_eq!(session.controller().log_level(), Some(2));
}
