//! Runtime options.
//!
//! Options are fixed per tree: every node mounted beneath a root shares the
//! root's options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for a governed tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Maximum number of update passes a node may run before its work queue
    /// is considered unable to settle (e.g. a `did_update` hook that always
    /// sets state).
    pub max_update_passes: usize,

    /// Deliver the current value to a subscriber as soon as it subscribes.
    pub emit_initial_value: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_update_passes: 100,
            emit_initial_value: false,
        }
    }
}

impl Options {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)
            .map_err(|e| Error::configuration(format!("invalid options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_update_passes == 0 {
            return Err(Error::configuration("max_update_passes must be at least 1"));
        }
        Ok(())
    }
}
