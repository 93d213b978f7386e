//! Engine configuration
//!
//! Everything is serde-friendly and defaulted field by field, so a JSON file
//! only needs to name what it changes.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::eval::EvalParams;

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 2;

/// Game rule variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// End the game once both players reach this many turns
    pub max_turns: Option<u16>,
    /// Three neighbors around a queen win (instead of six)
    pub simplified: bool,
}

impl RulesConfig {
    pub fn with_max_turns(mut self, max_turns: u16) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn simplified(mut self) -> Self {
        self.simplified = true;
        self
    }
}

/// Search limits and evaluation weights
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub depth: u32,
    /// Recurse only into this many best-looking children per node
    pub beam_width: Option<usize>,
    /// Stop after visiting this many nodes
    pub node_budget: Option<u64>,
    pub time_limit_ms: Option<u64>,
    pub params: EvalParams,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            beam_width: None,
            node_budget: None,
            time_limit_ms: None,
            params: EvalParams::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_beam(mut self, beam_width: usize) -> Self {
        self.beam_width = Some(beam_width);
        self
    }

    pub fn with_node_budget(mut self, nodes: u64) -> Self {
        self.node_budget = Some(nodes);
        self
    }

    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_params(mut self, params: EvalParams) -> Self {
        self.params = params;
        self
    }
}

/// Top-level configuration file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: RulesConfig,
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"search": {"depth": 3, "beam_width": 4}}"#).unwrap();
        assert_eq!(config.search.depth, 3);
        assert_eq!(config.search.beam_width, Some(4));
        assert_eq!(config.search.params, EvalParams::default());
        assert_eq!(config.rules, RulesConfig::default());
    }

    #[test]
    fn test_rules_json() {
        let config =
            EngineConfig::from_json(r#"{"rules": {"max_turns": 20, "simplified": true}}"#).unwrap();
        assert_eq!(config.rules, RulesConfig::default().with_max_turns(20).simplified());
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(EngineConfig::from_json("{\"search\": {\"depth\": -1}}").is_err());
        assert!(EngineConfig::load(Path::new("/nonexistent/hive.json")).is_err());
    }
}
