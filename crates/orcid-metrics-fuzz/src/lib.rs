//! Fuzzing library for orcid-metrics.
//!
//! Fuzz targets for the upstream payload parsers and identifier normalization.
//!
//! # Usage
//!
//! ```bash
//! cd crates/orcid-metrics-fuzz
//! cargo +nightly fuzz run fuzz_works_parse -- -max_total_time=60
//! ```

pub use orcid_metrics::models;
