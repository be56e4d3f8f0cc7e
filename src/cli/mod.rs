//! CLI support for transmute
//!
//! The `transmute` binary is a thin clap front-end over these functions, so
//! other tools can run templates or render filter docs the same way.

mod apply;
mod docs;

pub use apply::{ApplyOptions, execute_apply, load_source};
pub use docs::{filter_group_docs, filters_overview};

use std::io;

use thiserror::Error;

use crate::TransmuteError;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Transform error: {0}")]
    Transmute(#[from] TransmuteError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown filter group: '{0}'\nRun 'transmute filters' to see available groups.")]
    UnknownGroup(String),

    #[error("Invalid --now timestamp '{0}': expected RFC 3339, e.g. 2017-04-11T00:00:00Z")]
    InvalidTimestamp(String),
}
