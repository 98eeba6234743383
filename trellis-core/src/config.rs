//! Graph Configuration
//!
//! Behavioural switches for a [`Graph`](crate::graph::Graph). Every field has
//! a default, so a config file only needs to name what it changes:
//!
//! ```rust
//! use trellis_core::GraphConfig;
//!
//! let config = GraphConfig::from_json(r#"{ "dedupe_region_members": true }"#).unwrap();
//! assert!(config.dedupe_region_members);
//! assert!(!config.mark_cross_region_edges);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Configuration applied when a graph is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Set `Edge::cross_region` when the endpoints live in different regions.
    pub mark_cross_region_edges: bool,

    /// Skip appending a node to a region it is already a member of.
    ///
    /// Off by default: every `put_into_region` call appends.
    pub dedupe_region_members: bool,

    /// Register a [`TracingListener`](crate::graph::TracingListener) on construction.
    pub log_events: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            mark_cross_region_edges: false,
            dedupe_region_members: false,
            log_events: false,
        }
    }
}

impl GraphConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = GraphConfig::from_json("{}").unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn switches_are_off_by_default() {
        let config = GraphConfig::default();
        assert!(!config.mark_cross_region_edges);
        assert!(!config.dedupe_region_members);
        assert!(!config.log_events);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = GraphConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig(_)));
    }

    #[test]
    fn round_trips_through_serde() {
        let config = GraphConfig {
            mark_cross_region_edges: false,
            dedupe_region_members: true,
            log_events: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GraphConfig::from_json(&json).unwrap(), config);
    }
}
