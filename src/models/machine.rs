//! Machine model.
//!
//! A CNC machine processes one task at a time and holds a limited number
//! of distinct tools in its magazine. Each production block run on it
//! starts with a setup interval.

use serde::{Deserialize, Serialize};

/// A CNC machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Maximum number of distinct tools loaded at once.
    pub tool_capacity: u32,
    /// Setup duration charged once per block (ms). `None` = scenario default.
    #[serde(default)]
    pub setup_ms: Option<i64>,
}

impl Machine {
    /// Creates a machine with the given magazine capacity.
    pub fn new(id: impl Into<String>, tool_capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            tool_capacity,
            setup_ms: None,
        }
    }

    /// Sets the machine name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the per-block setup duration.
    pub fn with_setup(mut self, setup_ms: i64) -> Self {
        self.setup_ms = Some(setup_ms);
        self
    }

    /// Setup duration for this machine, falling back to `default_ms`.
    #[inline]
    pub fn setup_or(&self, default_ms: i64) -> i64 {
        self.setup_ms.unwrap_or(default_ms)
    }

    /// Whether a tool set of `distinct_tools` fits the magazine.
    #[inline]
    pub fn can_hold(&self, distinct_tools: usize) -> bool {
        distinct_tools <= self.tool_capacity as usize
    }
}
