//! Run a template against JSON input

use std::fs;

use chrono::{DateTime, Utc};

use super::CliError;
use crate::{
    Evaluator, Value,
    environment::FixedClock,
    output::{to_json, to_json_pretty},
};

/// Options for the apply command
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Template as JSON text; a bare expression is accepted too
    pub template: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// RFC 3339 instant used by `now` instead of the system clock
    pub now: Option<String>,
}

/// Read `@path` arguments from disk, pass anything else through.
pub fn load_source(arg: &str) -> Result<String, CliError> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(arg.to_string()),
    }
}

/// Parse the template text.
///
/// Text that is not JSON and does not look like an object or array is
/// taken as a single expression, so `transmute apply 'title | uppercase'`
/// works without quoting the expression as a JSON string.
fn parse_template(text: &str) -> Result<Value, CliError> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Ok(Value::from(json)),
        Err(e) if text.trim_start().starts_with(['{', '[', '"']) => Err(CliError::Json(e)),
        Err(_) => Ok(Value::String(text.trim().to_string())),
    }
}

fn parse_now(now: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(now)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| CliError::InvalidTimestamp(now.to_string()))
}

/// Execute a transmute apply operation, returning the rendered JSON
pub fn execute_apply(options: &ApplyOptions) -> Result<String, CliError> {
    let template = parse_template(&load_source(&options.template)?)?;

    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let input: serde_json::Value = serde_json::from_str(&load_source(input)?)?;
    let scope = Value::from(input);

    let mut evaluator = Evaluator::new();
    if let Some(now) = &options.now {
        evaluator = evaluator.with_clock(FixedClock(parse_now(now)?));
    }

    let output = evaluator.transform(&scope, &template)?;
    Ok(if options.pretty {
        to_json_pretty(&output)
    } else {
        to_json(&output)
    })
}
