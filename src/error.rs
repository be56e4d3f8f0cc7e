use thiserror::Error;

/// Errors that abort a transform.
///
/// Missing paths, type mismatches inside filters, bad regular expressions and
/// unparseable dates all degrade to absent values instead, so an expression
/// naming a filter that does not exist is the only fatal condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransmuteError {
    #[error("Unknown filter type: {0}")]
    UnknownFilter(String),
}
