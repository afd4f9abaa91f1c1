//! Data models for the registry, the citation index and the computed indicators.
//!
//! Upstream payload models use `#[serde(default)]` for every optional field so
//! partially filled records still parse.

mod citation;
mod enums;
mod identifier;
mod inputs;
mod series;
mod work;

pub use citation::{CitationIds, CitationPage, CitationRecord, PageMeta};
pub use enums::ResponseFormat;
pub use identifier::{IdType, IdentifierKey, normalize};
pub use inputs::{ResearcherInput, WorkQueryInput};
pub use series::{
    CitationMap, IdentifierYearMap, MetricsReport, MetricsResult, NoIdentifierYears, YearSeries,
};
pub use work::{CitedWork, ExternalId, WorkGroup, WorkRecord, WorksPayload, decode_html_entities};
