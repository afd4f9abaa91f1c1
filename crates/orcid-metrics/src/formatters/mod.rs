//! Output formatting for tool and CLI responses.

mod json;
mod markdown;

pub use json::{compact_metrics, compact_report, compact_series, compact_work};
pub use markdown::{
    format_metrics_markdown, format_records_markdown, format_report_markdown,
    format_series_markdown, format_works_markdown,
};
