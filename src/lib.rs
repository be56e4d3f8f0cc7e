//! # Transmute
//!
//! Reshape JSON with a template whose keys and string values are small
//! expressions evaluated against the input.
//!
//! ```
//! use serde_json::json;
//!
//! let scope = json!({
//!     "title": "ACME super soaker",
//!     "variants": [{ "color": "red" }, { "color": "blue" }]
//! });
//! let template = json!({
//!     "name": "title | uppercase",
//!     "colors[variants]": { "'color'": "color" }
//! });
//!
//! let output = transmute::transform_json(scope, template).unwrap();
//! assert_eq!(output, json!({
//!     "name": "ACME SUPER SOAKER",
//!     "colors": [{ "color": "red" }, { "color": "blue" }]
//! }));
//! ```
pub mod assign;
pub mod ast;
pub mod cli;
pub mod convert;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod filters;
pub mod lexer;
pub mod output;
pub mod transform;
pub mod value;

pub use ast::{FilterCall, KeyKind, Shape, Token, TokenKind};
pub use convert::{json_to_value, value_to_json};
pub use environment::{Clock, Fingerprint, FixedClock, Md5Fingerprint, SystemClock};
pub use error::TransmuteError;
pub use evaluator::{Context, Evaluator, ResolvedExpression};
pub use filters::{Filter, FilterGroup};
pub use lexer::{Lexer, tokenize};
pub use output::{to_json, to_json_pretty};
pub use value::Value;

/// Apply `template` to `scope` with the system clock and MD5 hashing.
pub fn transform(scope: &Value, template: &Value) -> Result<Value, TransmuteError> {
    Evaluator::new().transform(scope, template)
}

/// [`transform`] over `serde_json` values.
pub fn transform_json(
    scope: serde_json::Value,
    template: serde_json::Value,
) -> Result<serde_json::Value, TransmuteError> {
    let output = transform(&Value::from(scope), &Value::from(template))?;
    Ok(output.into())
}
