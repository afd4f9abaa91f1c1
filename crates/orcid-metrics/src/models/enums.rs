//! Enumeration types for tool parameters.

use serde::{Deserialize, Serialize};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}
