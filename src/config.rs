//! Session and controller configuration
//!
//! This module contains the attribute sets handed to the controller at
//! init time, plus load/save support so host applications can keep the
//! tuning in a TOML file next to their model assets.
//!
//! # Main Types
//!
//! - [`ControllerConfig`] - the attribute triple passed to controller init
//! - [`SessionConfig`] - controller attributes plus host-side log level

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Attributes handed to the controller at init time
///
/// The defaults match the tuning the controller ships with: DCVS off, full
/// bus usage, graph version 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Whether the controller may scale clocks dynamically (0 = off)
    pub enable_dcvs: i32,
    /// Bus usage hint in percent
    pub bus_usage: i32,
    /// Version of the baked-in graph and its dummy input tensor
    pub graph_version: i32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            enable_dcvs: 0,
            bus_usage: 100,
            graph_version: 3,
        }
    }
}

/// Full configuration for a graph session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Controller init attributes
    pub controller: ControllerConfig,
    /// Host-side log level (0 = error .. 4 = trace, negative = off)
    pub log_level: i32,
}

impl SessionConfig {
    /// Load a session configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save the session configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.enable_dcvs, 0);
        assert_eq!(config.bus_usage, 100);
        assert_eq!(config.graph_version, 3);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let config = SessionConfig {
            controller: ControllerConfig {
                enable_dcvs: 1,
                bus_usage: 50,
                graph_version: 4,
            },
            log_level: 3,
        };
        config.save(&path).unwrap();

        let loaded = SessionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SessionConfig::load("/nonexistent/session.toml").unwrap_err();
        assert!(matches!(err, crate::error::SocGraphError::Io(_)));
    }
}
