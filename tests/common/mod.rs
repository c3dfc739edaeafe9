//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use socgraph_rs::config::SessionConfig;
use socgraph_rs::controller::MockController;
use socgraph_rs::session::GraphSession;

/// A session over a mock controller that succeeds at everything
pub fn mock_session() -> GraphSession<MockController> {
    GraphSession::new(MockController::new(), SessionConfig::default())
}

/// A session over a customized mock controller
pub fn session_with(controller: MockController) -> GraphSession<MockController> {
    GraphSession::new(controller, SessionConfig::default())
}

/// Bytes for `n` little-endian f32 values counting up from 0.0
pub fn f32_bytes(n: usize) -> Vec<u8> {
    (0..n).flat_map(|i| (i as f32).to_le_bytes()).collect()
}
