//! `pricetruth-report`
//!
//! **Responsibility:** render a finished run for people (Markdown) and
//! machines (JSON). Rendering is read-only over the verdict.

pub mod render;
pub mod report;

pub use render::{
    JSON_FILE, MARKDOWN_FILE, ReportError, render_json, render_markdown, write_reports,
};
pub use report::{RunReport, SCHEMA_VERSION};
