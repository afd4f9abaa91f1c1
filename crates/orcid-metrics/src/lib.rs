//! ORCID Metrics
//!
//! Bibliometric indicators for a researcher identified by an ORCID iD: the
//! works come from the ORCID public registry, citation counts from OpenAlex.
//!
//! # Features
//!
//! - **Indicators**: h-index, i10-index, total and average citations, 2-year impact factor
//! - **Time series**: publications and citations per year
//! - **Batched lookups**: 100 identifiers per OpenAlex query, bounded concurrency
//! - **Resilient**: exponential-backoff retries on 429 and 5xx, one overall timeout
//! - **MCP server**: the same operations as tools over JSON-RPC on stdio
//!
//! # Example
//!
//! ```no_run
//! use orcid_metrics::{Config, MetricsPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = MetricsPipeline::new(&config)?;
//!
//!     let metrics = pipeline.get_metrics("0000-0002-1825-0097").await?;
//!     println!("h-index: {}", metrics.h_index);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod tools;

pub use config::Config;
pub use error::{ClientError, MetricsError, ToolError};
pub use pipeline::MetricsPipeline;
