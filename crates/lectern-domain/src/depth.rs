//! Analysis depth selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// How thorough the per-chunk analysis should be.
///
/// Depth selects which prompt template the oracle adapters use; the core
/// pipeline forwards it opaquely and never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// High-level concepts and arguments only
    Conceptual,
    /// Balanced coverage (the default)
    Standard,
    /// Fine-grained extraction including examples and definitions
    Detailed,
}

impl Depth {
    /// Stable lowercase name, used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Conceptual => "conceptual",
            Depth::Standard => "standard",
            Depth::Detailed => "detailed",
        }
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth::Standard
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
