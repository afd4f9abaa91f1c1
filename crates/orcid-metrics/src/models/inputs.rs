//! Input models for MCP tool parameters.

use serde::{Deserialize, Serialize};

use super::ResponseFormat;

/// Input for the per-researcher tools (metrics, time series, cited works).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherInput {
    /// ORCID iD, bare or as `https://orcid.org/...`.
    pub orcid_id: String,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for the filtered work queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkQueryInput {
    /// ORCID iD, bare or as `https://orcid.org/...`.
    pub orcid_id: String,

    /// Keep only works published in this year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Keep only works whose title or description contains this text.
    #[serde(default)]
    pub keyword: Option<String>,

    /// Maximum works to list (all when absent).
    #[serde(default)]
    pub limit: Option<usize>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}
