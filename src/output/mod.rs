//! Output formatting module
//!
//! Provides the styled terminal summary and JSON export.

pub mod json;
pub mod terminal;

pub use json::{print_json, to_json, JsonOutput};
pub use terminal::{
    print_batch_summary, print_error, print_header, print_host_failure, print_host_report,
};
