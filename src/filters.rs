//! # Filters
//!
//! Named transforms applied with `|`, or called directly as the first token
//! of an expression (`now('unix')`, `not('true')`, `get()`).
//!
//! Parameters arrive as raw expressions and are resolved against the scope
//! before the filter runs. `filter` is the exception: it resolves its
//! parameters once per array element, with the element as scope.
//!
//! Type mismatches never fail. Numeric filters produce NaN on garbage,
//! string filters pass non-strings through, and lookups into the wrong kind
//! of value come back absent.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::{Regex, RegexBuilder};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use tracing::{trace, warn};

use crate::{
    error::TransmuteError,
    evaluator::{Context, Evaluator},
    output::to_json,
    value::{Value, truthy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterGroup {
    Arithmetic,
    Comparison,
    Boolean,
    Text,
    Collection,
    Misc,
}

impl FilterGroup {
    pub const ALL: [FilterGroup; 6] = [
        FilterGroup::Arithmetic,
        FilterGroup::Comparison,
        FilterGroup::Boolean,
        FilterGroup::Text,
        FilterGroup::Collection,
        FilterGroup::Misc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterGroup::Arithmetic => "arithmetic",
            FilterGroup::Comparison => "comparison",
            FilterGroup::Boolean => "boolean",
            FilterGroup::Text => "text",
            FilterGroup::Collection => "collection",
            FilterGroup::Misc => "misc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.name().eq_ignore_ascii_case(name))
    }
}

/// Every filter an expression can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Add,
    Subtract,
    Multiply,
    Divide,
    Increment,
    Decrement,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    And,
    Or,
    Not,
    Bool,
    Default,
    If,
    Concat,
    Join,
    Split,
    Replace,
    Match,
    Trim,
    Uppercase,
    Lowercase,
    Tostring,
    Array,
    Push,
    Pop,
    Pluck,
    Prune,
    Values,
    Keys,
    Slice,
    Count,
    Get,
    Set,
    Filter,
    Reduce,
    Hash,
    Date,
    Now,
    Json,
    Int,
    Float,
}

impl Filter {
    pub const ALL: [Filter; 45] = [
        Filter::Add,
        Filter::Subtract,
        Filter::Multiply,
        Filter::Divide,
        Filter::Increment,
        Filter::Decrement,
        Filter::Eq,
        Filter::Gt,
        Filter::Gte,
        Filter::Lt,
        Filter::Lte,
        Filter::And,
        Filter::Or,
        Filter::Not,
        Filter::Bool,
        Filter::Default,
        Filter::If,
        Filter::Concat,
        Filter::Join,
        Filter::Split,
        Filter::Replace,
        Filter::Match,
        Filter::Trim,
        Filter::Uppercase,
        Filter::Lowercase,
        Filter::Tostring,
        Filter::Array,
        Filter::Push,
        Filter::Pop,
        Filter::Pluck,
        Filter::Prune,
        Filter::Values,
        Filter::Keys,
        Filter::Slice,
        Filter::Count,
        Filter::Get,
        Filter::Set,
        Filter::Filter,
        Filter::Reduce,
        Filter::Hash,
        Filter::Date,
        Filter::Now,
        Filter::Json,
        Filter::Int,
        Filter::Float,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Filter::Add => "add",
            Filter::Subtract => "subtract",
            Filter::Multiply => "multiply",
            Filter::Divide => "divide",
            Filter::Increment => "increment",
            Filter::Decrement => "decrement",
            Filter::Eq => "eq",
            Filter::Gt => "gt",
            Filter::Gte => "gte",
            Filter::Lt => "lt",
            Filter::Lte => "lte",
            Filter::And => "and",
            Filter::Or => "or",
            Filter::Not => "not",
            Filter::Bool => "bool",
            Filter::Default => "default",
            Filter::If => "if",
            Filter::Concat => "concat",
            Filter::Join => "join",
            Filter::Split => "split",
            Filter::Replace => "replace",
            Filter::Match => "match",
            Filter::Trim => "trim",
            Filter::Uppercase => "uppercase",
            Filter::Lowercase => "lowercase",
            Filter::Tostring => "tostring",
            Filter::Array => "array",
            Filter::Push => "push",
            Filter::Pop => "pop",
            Filter::Pluck => "pluck",
            Filter::Prune => "prune",
            Filter::Values => "values",
            Filter::Keys => "keys",
            Filter::Slice => "slice",
            Filter::Count => "count",
            Filter::Get => "get",
            Filter::Set => "set",
            Filter::Filter => "filter",
            Filter::Reduce => "reduce",
            Filter::Hash => "hash",
            Filter::Date => "date",
            Filter::Now => "now",
            Filter::Json => "json",
            Filter::Int => "int",
            Filter::Float => "float",
        }
    }

    pub fn group(self) -> FilterGroup {
        match self {
            Filter::Add
            | Filter::Subtract
            | Filter::Multiply
            | Filter::Divide
            | Filter::Increment
            | Filter::Decrement => FilterGroup::Arithmetic,
            Filter::Eq | Filter::Gt | Filter::Gte | Filter::Lt | Filter::Lte => {
                FilterGroup::Comparison
            }
            Filter::And
            | Filter::Or
            | Filter::Not
            | Filter::Bool
            | Filter::Default
            | Filter::If => FilterGroup::Boolean,
            Filter::Concat
            | Filter::Join
            | Filter::Split
            | Filter::Replace
            | Filter::Match
            | Filter::Trim
            | Filter::Uppercase
            | Filter::Lowercase
            | Filter::Tostring => FilterGroup::Text,
            Filter::Array
            | Filter::Push
            | Filter::Pop
            | Filter::Pluck
            | Filter::Prune
            | Filter::Values
            | Filter::Keys
            | Filter::Slice
            | Filter::Count
            | Filter::Get
            | Filter::Set
            | Filter::Filter
            | Filter::Reduce => FilterGroup::Collection,
            Filter::Hash
            | Filter::Date
            | Filter::Now
            | Filter::Json
            | Filter::Int
            | Filter::Float => FilterGroup::Misc,
        }
    }

    /// Call signature and a one-line description, for `transmute filters`.
    pub fn summary(self) -> (&'static str, &'static str) {
        match self {
            Filter::Add => ("add(x, ...)", "piped value plus every parameter"),
            Filter::Subtract => ("subtract(x, ...)", "piped value minus every parameter"),
            Filter::Multiply => ("multiply(x, ...)", "piped value times every parameter"),
            Filter::Divide => ("divide(x, ...)", "piped value divided by every parameter"),
            Filter::Increment => ("increment", "piped value plus one"),
            Filter::Decrement => ("decrement", "piped value minus one"),
            Filter::Eq => ("eq(x)", "loose equality with x"),
            Filter::Gt => ("gt(x)", "greater than x, numeric when both sides are numbers"),
            Filter::Gte => ("gte(x)", "greater than or equal to x"),
            Filter::Lt => ("lt(x)", "less than x"),
            Filter::Lte => ("lte(x)", "less than or equal to x"),
            Filter::And => ("and(x, ...)", "true when the piped value and every parameter are truthy"),
            Filter::Or => ("or(x, ...)", "true when the piped value or any parameter is truthy"),
            Filter::Not => ("not(x?)", "negated truthiness of x, or of the piped value"),
            Filter::Bool => ("bool", "truthiness of the piped value"),
            Filter::Default => ("default(x)", "x when the piped value is falsy"),
            Filter::If => ("if(then, else)", "then when the piped value is truthy, else otherwise"),
            Filter::Concat => ("concat(x, ...)", "piped value and parameters joined as text"),
            Filter::Join => ("join(sep?)", "array elements joined by sep (default `,`)"),
            Filter::Split => ("split(sep?)", "string split on sep (default `,`)"),
            Filter::Replace => (
                "replace(pattern, with, fallback?, flags?)",
                "regular expression replacement; fallback when nothing matches",
            ),
            Filter::Match => (
                "match(pattern, flags?)",
                "match and capture groups, or every match with the `g` flag",
            ),
            Filter::Trim => ("trim", "strip surrounding whitespace"),
            Filter::Uppercase => ("uppercase", "upper-case a string"),
            Filter::Lowercase => ("lowercase", "lower-case a string"),
            Filter::Tostring => ("tostring", "text form of the piped value"),
            Filter::Array => ("array(x, ...)", "piped value as an array, parameters appended"),
            Filter::Push => ("push(x, ...)", "append parameters to the piped array"),
            Filter::Pop => ("pop", "last element of an array"),
            Filter::Pluck => ("pluck(key)", "key of every element of an array"),
            Filter::Prune => ("prune(key, ...)", "keep only the listed object keys"),
            Filter::Values => (
                "values(exclude?)",
                "object values as an array, object values tagged with `_key`",
            ),
            Filter::Keys => ("keys", "object keys, or array indices"),
            Filter::Slice => ("slice(start, end?)", "part of an array or string"),
            Filter::Count => ("count", "length of an array, string or object"),
            Filter::Get => ("get(key?)", "element of an array, string or object; the scope when bare"),
            Filter::Set => (
                "set(key, value)",
                "copy of an array, string or object with key replaced; past the end appends",
            ),
            Filter::Filter => (
                "filter(predicate, ...)",
                "elements whose predicates are all truthy; legacy form filter('key', 'op', value)",
            ),
            Filter::Reduce => (
                "reduce(key?, mode)",
                "element with the largest or smallest key (longest/shortest deprecated)",
            ),
            Filter::Hash => ("hash", "MD5 hex digest of the piped value as JSON"),
            Filter::Date => ("date(format?)", "reformat a date as json, milliseconds or unix"),
            Filter::Now => ("now(format?)", "current time as json, milliseconds or unix"),
            Filter::Json => ("json", "parse a JSON string"),
            Filter::Int => ("int", "leading integer of the piped value"),
            Filter::Float => ("float(precision?)", "number rounded to precision places (default 2)"),
        }
    }
}

impl Evaluator {
    /// Apply the filter `name` to `piped`.
    ///
    /// Fails only when `name` is not a known filter.
    pub fn apply_filter(
        &self,
        name: &str,
        params: &[String],
        scope: &Value,
        root: &Value,
        piped: Option<Value>,
    ) -> Result<Option<Value>, TransmuteError> {
        let filter =
            Filter::from_name(name).ok_or_else(|| TransmuteError::UnknownFilter(name.to_string()))?;
        trace!(filter = name, params = params.len(), "applying filter");

        let args = if filter == Filter::Filter {
            Vec::new()
        } else {
            self.resolve_params(params, scope, root)?
        };

        let result = match filter {
            Filter::Add
            | Filter::Subtract
            | Filter::Multiply
            | Filter::Divide
            | Filter::Increment
            | Filter::Decrement => Some(arithmetic(filter, piped.as_ref(), &args)),

            Filter::Eq => Some(Value::Boolean(loose_eq(piped.as_ref(), arg(&args, 0)))),
            Filter::Gt | Filter::Gte | Filter::Lt | Filter::Lte => {
                let ordering = compare(piped.as_ref(), arg(&args, 0));
                Some(Value::Boolean(ordering.is_some_and(|o| match filter {
                    Filter::Gt => o.is_gt(),
                    Filter::Gte => o.is_ge(),
                    Filter::Lt => o.is_lt(),
                    _ => o.is_le(),
                })))
            }

            Filter::And => {
                let start = piped.as_ref().is_none_or(Value::is_truthy);
                Some(Value::Boolean(start && args.iter().all(|a| truthy(a.as_ref()))))
            }
            Filter::Or => {
                let start = truthy(piped.as_ref());
                Some(Value::Boolean(start || args.iter().any(|a| truthy(a.as_ref()))))
            }
            Filter::Not => {
                let subject = if params.is_empty() { piped.as_ref() } else { arg(&args, 0) };
                Some(Value::Boolean(!truthy(subject)))
            }
            Filter::Bool => Some(Value::Boolean(truthy(piped.as_ref()))),
            Filter::Default => {
                if truthy(piped.as_ref()) {
                    piped
                } else {
                    arg(&args, 0).cloned()
                }
            }
            Filter::If => {
                let index = if truthy(piped.as_ref()) { 0 } else { 1 };
                arg(&args, index).cloned()
            }

            Filter::Concat => Some(concat(piped, &args)),
            Filter::Join => piped.map(|value| join(value, arg_text(&args, 0))),
            Filter::Split => piped.map(|value| split(value, arg_text(&args, 0))),
            Filter::Replace => replace(piped, &args),
            Filter::Match => regex_match(piped, &args),
            Filter::Trim => piped.map(|value| map_string(value, |s| s.trim().to_string())),
            Filter::Uppercase => piped.map(|value| map_string(value, str::to_uppercase)),
            Filter::Lowercase => piped.map(|value| map_string(value, str::to_lowercase)),
            Filter::Tostring => piped.map(|value| Value::String(value.to_text())),

            Filter::Array | Filter::Push => Some(push(piped, args)),
            Filter::Pop => piped.and_then(pop),
            Filter::Pluck => piped.map(|value| pluck(value, arg_text(&args, 0))),
            Filter::Prune => piped.map(|value| prune(value, &args)),
            Filter::Values => piped.map(|value| values(value, arg(&args, 0))),
            Filter::Keys => piped.and_then(keys),
            Filter::Slice => piped.map(|value| slice(value, arg(&args, 0), arg(&args, 1))),
            Filter::Count => Some(Value::Integer(count(piped.as_ref()))),
            Filter::Get => {
                let target = piped.unwrap_or_else(|| scope.clone());
                if params.is_empty() {
                    Some(target)
                } else {
                    arg_text(&args, 0).and_then(|key| get(&target, &key))
                }
            }
            Filter::Set => piped.and_then(|value| {
                let key = arg_text(&args, 0)?;
                Some(set(value, &key, arg(&args, 1).cloned().unwrap_or_default()))
            }),
            Filter::Filter => return self.filter_items(params, scope, root, piped),
            Filter::Reduce => piped.map(|value| reduce(value, &args)),

            Filter::Hash => {
                let json = to_json(piped.as_ref().unwrap_or(&Value::Null));
                Some(Value::String(self.fingerprint(&json)))
            }
            Filter::Date => piped
                .as_ref()
                .and_then(parse_date)
                .map(|date| format_date(date, arg_text(&args, 0).as_deref())),
            Filter::Now => Some(format_date(self.now(), arg_text(&args, 0).as_deref())),
            Filter::Json => piped.and_then(|value| match value {
                Value::String(s) => serde_json::from_str::<serde_json::Value>(&s).ok().map(Value::from),
                other => Some(other),
            }),
            Filter::Int => Some(int(piped.as_ref())),
            Filter::Float => Some(float(piped.as_ref(), arg(&args, 0))),
        };

        Ok(result)
    }

    fn resolve_params(
        &self,
        params: &[String],
        scope: &Value,
        root: &Value,
    ) -> Result<Vec<Option<Value>>, TransmuteError> {
        params
            .iter()
            .map(|param| Ok(self.resolve(param, scope, root, Context::Value)?.value))
            .collect()
    }

    /// `filter`: keep the elements of an array that pass.
    ///
    /// A first parameter written as a quoted literal selects the legacy
    /// `filter('key', 'op', value)` form, compared against each element's
    /// `key`. Otherwise every parameter is a predicate resolved with the
    /// element as scope, and all of them must be truthy.
    fn filter_items(
        &self,
        params: &[String],
        scope: &Value,
        root: &Value,
        piped: Option<Value>,
    ) -> Result<Option<Value>, TransmuteError> {
        let items = match piped {
            Some(Value::Array(items)) => items,
            other => return Ok(other),
        };

        let legacy = params.first().is_some_and(|param| param.starts_with('\''));
        let mut kept = Vec::with_capacity(items.len());

        if legacy {
            let args = self.resolve_params(params, scope, root)?;
            let key = arg_text(&args, 0).unwrap_or_default();
            let operator = arg_text(&args, 1).unwrap_or_else(|| "=".to_string());
            let expected = arg(&args, 2);

            for item in items {
                if item
                    .get_path(&key)
                    .is_some_and(|actual| compare_with(&operator, actual, expected))
                {
                    kept.push(item);
                }
            }
            return Ok(Some(Value::Array(kept)));
        }

        'items: for item in items {
            for param in params {
                let verdict = self.resolve(param, &item, root, Context::Value)?.value;
                if !truthy(verdict.as_ref()) {
                    continue 'items;
                }
            }
            kept.push(item);
        }
        Ok(Some(Value::Array(kept)))
    }
}

fn arg(args: &[Option<Value>], index: usize) -> Option<&Value> {
    args.get(index).and_then(Option::as_ref)
}

fn arg_text(args: &[Option<Value>], index: usize) -> Option<String> {
    arg(args, index).map(Value::to_text)
}

/// Text of a scalar; collections have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Null => None,
        other => Some(other.to_text()),
    }
}

fn operand(value: Option<&Value>) -> f64 {
    value.map_or(0.0, Value::as_number)
}

fn arithmetic(filter: Filter, piped: Option<&Value>, args: &[Option<Value>]) -> Value {
    let start = operand(piped);
    let result = match filter {
        Filter::Increment => combine(Filter::Add, start, 1.0),
        Filter::Decrement => combine(Filter::Subtract, start, 1.0),
        _ => args
            .iter()
            .fold(start, |acc, a| combine(filter, acc, operand(a.as_ref()))),
    };
    Value::from_f64(result)
}

/// One arithmetic step, exact in decimal when both sides fit.
fn combine(filter: Filter, a: f64, b: f64) -> f64 {
    if let Some(x) = Decimal::from_f64(a)
        && let Some(y) = Decimal::from_f64(b)
    {
        let exact = match filter {
            Filter::Add => x.checked_add(y),
            Filter::Subtract => x.checked_sub(y),
            Filter::Multiply => x.checked_mul(y),
            _ => x.checked_div(y),
        };
        if let Some(result) = exact.and_then(|d| d.to_f64()) {
            return result;
        }
    }

    match filter {
        Filter::Add => a + b,
        Filter::Subtract => a - b,
        Filter::Multiply => a * b,
        _ => a / b,
    }
}

/// Equality that treats `'1'` and `1` alike.
///
/// Absent and null only equal each other, two strings compare as text,
/// collections compare structurally, and everything else numerically.
pub fn loose_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (None | Some(Value::Null), _) | (_, None | Some(Value::Null)) => false,
        (Some(Value::String(x)), Some(Value::String(y))) => x == y,
        (Some(x @ (Value::Array(_) | Value::Object(_))), Some(y))
        | (Some(x), Some(y @ (Value::Array(_) | Value::Object(_)))) => x == y,
        (Some(x), Some(y)) => x.as_number() == y.as_number(),
    }
}

/// Numeric order when both sides are numbers, text order otherwise.
pub fn compare(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    let (a, b) = (a?, b?);
    let (x, y) = (a.as_number(), b.as_number());
    if !x.is_nan() && !y.is_nan() {
        return x.partial_cmp(&y);
    }
    Some(a.to_text().cmp(&b.to_text()))
}

fn compare_with(operator: &str, actual: &Value, expected: Option<&Value>) -> bool {
    let order = || compare(Some(actual), expected);
    match operator {
        "!=" => !loose_eq(Some(actual), expected),
        ">" => order().is_some_and(Ordering::is_gt),
        ">=" => order().is_some_and(Ordering::is_ge),
        "<" => order().is_some_and(Ordering::is_lt),
        "<=" => order().is_some_and(Ordering::is_le),
        _ => loose_eq(Some(actual), expected),
    }
}

fn concat(piped: Option<Value>, args: &[Option<Value>]) -> Value {
    let text: String = piped
        .iter()
        .chain(args.iter().flatten())
        .filter(|value| !matches!(value, Value::Null))
        .map(Value::to_text)
        .collect();
    Value::String(text)
}

fn join(value: Value, separator: Option<String>) -> Value {
    match value {
        Value::Array(items) => {
            let separator = separator.unwrap_or_else(|| ",".to_string());
            let parts: Vec<String> = items.iter().map(Value::to_text).collect();
            Value::String(parts.join(&separator))
        }
        other => other,
    }
}

fn split(value: Value, separator: Option<String>) -> Value {
    match value {
        Value::String(s) => {
            let separator = separator.unwrap_or_else(|| ",".to_string());
            let parts = if separator.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            };
            Value::Array(parts)
        }
        other => other,
    }
}

fn map_string(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

/// Compile a pattern with JavaScript-style flags (`g` is handled by callers).
fn build_regex(pattern: &str, flags: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .ok()
}

fn replace(piped: Option<Value>, args: &[Option<Value>]) -> Option<Value> {
    let text = piped.as_ref().and_then(scalar_text)?;
    let pattern = arg_text(args, 0).unwrap_or_default();
    let replacement = arg_text(args, 1).unwrap_or_default();
    let flags = arg_text(args, 3).unwrap_or_default();

    let Some(regex) = build_regex(&pattern, &flags) else {
        return piped;
    };
    if !regex.is_match(&text) {
        return arg(args, 2).cloned().or(piped);
    }

    let replaced = if flags.contains('g') {
        regex.replace_all(&text, replacement.as_str())
    } else {
        regex.replace(&text, replacement.as_str())
    };
    Some(Value::String(replaced.into_owned()))
}

fn regex_match(piped: Option<Value>, args: &[Option<Value>]) -> Option<Value> {
    let text = piped.as_ref().and_then(scalar_text)?;
    let pattern = arg_text(args, 0).unwrap_or_default();
    let flags = arg_text(args, 1).unwrap_or_else(|| "i".to_string());
    let regex = build_regex(&pattern, &flags)?;

    if flags.contains('g') {
        let found: Vec<Value> = regex
            .find_iter(&text)
            .map(|m| Value::from(m.as_str()))
            .collect();
        return (!found.is_empty()).then_some(Value::Array(found));
    }

    let captures = regex.captures(&text)?;
    let groups = captures
        .iter()
        .map(|group| group.map_or(Value::Null, |m| Value::from(m.as_str())))
        .collect();
    Some(Value::Array(groups))
}

fn push(piped: Option<Value>, args: Vec<Option<Value>>) -> Value {
    let mut items = match piped {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };
    items.extend(args.into_iter().flatten());
    Value::Array(items)
}

fn pop(value: Value) -> Option<Value> {
    match value {
        Value::Array(mut items) => items.pop(),
        other => Some(other),
    }
}

fn pluck(value: Value, key: Option<String>) -> Value {
    let key = key.unwrap_or_default();
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter_map(|item| item.get_path(&key).cloned())
                .collect(),
        ),
        other => other,
    }
}

/// Flattened text of every parameter, expanding array parameters.
fn key_list<'a>(args: impl IntoIterator<Item = &'a Value>) -> Vec<String> {
    args.into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().map(Value::to_text).collect(),
            other => vec![other.to_text()],
        })
        .collect()
}

fn prune(value: Value, args: &[Option<Value>]) -> Value {
    match value {
        Value::Object(mut map) => {
            let keep = key_list(args.iter().flatten());
            map.retain(|key, _| keep.contains(key));
            Value::Object(map)
        }
        other => other,
    }
}

fn values(value: Value, exclude: Option<&Value>) -> Value {
    match value {
        Value::Object(map) => {
            let exclude = key_list(exclude);
            let items = map
                .into_iter()
                .filter(|(key, _)| !exclude.contains(key))
                .map(|(key, value)| match value {
                    Value::Object(mut inner) => {
                        inner.insert("_key".to_string(), Value::String(key));
                        Value::Object(inner)
                    }
                    other => other,
                })
                .collect();
            Value::Array(items)
        }
        other => other,
    }
}

fn keys(value: Value) -> Option<Value> {
    match value {
        Value::Object(map) => Some(Value::Array(map.into_keys().map(Value::String).collect())),
        Value::Array(items) => Some(Value::Array(
            (0..items.len()).map(|i| Value::String(i.to_string())).collect(),
        )),
        _ => None,
    }
}

/// Resolve a JavaScript-style slice index against `len`.
fn slice_index(index: Option<&Value>, len: usize, default: usize) -> usize {
    let Some(n) = index.map(Value::as_number).filter(|n| !n.is_nan()) else {
        return default;
    };
    let n = n.trunc();
    if n < 0.0 {
        len.saturating_sub((-n) as usize)
    } else {
        (n as usize).min(len)
    }
}

fn slice(value: Value, start: Option<&Value>, end: Option<&Value>) -> Value {
    match value {
        Value::Array(items) => {
            let from = slice_index(start, items.len(), 0);
            let to = slice_index(end, items.len(), items.len());
            Value::Array(items.get(from..to.max(from)).map(<[Value]>::to_vec).unwrap_or_default())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let from = slice_index(start, chars.len(), 0);
            let to = slice_index(end, chars.len(), chars.len());
            Value::String(chars.get(from..to.max(from)).map(|c| c.iter().collect()).unwrap_or_default())
        }
        other => other,
    }
}

fn count(value: Option<&Value>) -> i64 {
    let n = match value {
        None => 0,
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        Some(Value::String(s)) => s.chars().count(),
        Some(_) => 1,
    };
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn get(target: &Value, key: &str) -> Option<Value> {
    match target {
        Value::Array(items) => items.get(key.parse::<usize>().ok()?).cloned(),
        Value::String(s) => s
            .chars()
            .nth(key.parse::<usize>().ok()?)
            .map(|c| Value::String(c.to_string())),
        Value::Object(_) => target.get_path(key).cloned(),
        _ => None,
    }
}

fn set(target: Value, key: &str, value: Value) -> Value {
    match target {
        Value::Array(mut items) => {
            let Ok(index) = key.parse::<usize>() else {
                return Value::Array(items);
            };
            match items.get_mut(index) {
                Some(slot) => *slot = value,
                None => items.push(value),
            }
            Value::Array(items)
        }
        Value::String(s) => {
            let Ok(index) = key.parse::<usize>() else {
                return Value::String(s);
            };
            let mut chars: Vec<String> = s.chars().map(String::from).collect();
            let replacement = value.to_text();
            match chars.get_mut(index) {
                Some(slot) => *slot = replacement,
                None => chars.push(replacement),
            }
            Value::String(chars.concat())
        }
        Value::Object(mut map) => {
            map.insert(key.to_string(), value);
            Value::Object(map)
        }
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReduceMode {
    Largest,
    Smallest,
    Longest,
    Shortest,
}

/// Pick one element of an array by comparing a key of each element.
///
/// Elements lacking the key are skipped. Ties keep the earlier element.
fn reduce(value: Value, args: &[Option<Value>]) -> Value {
    let items = match value {
        Value::Array(items) => items,
        other => return other,
    };

    let (key, mode) = if args.len() >= 2 {
        (arg_text(args, 0), arg_text(args, 1))
    } else {
        (None, arg_text(args, 0))
    };
    let mode = match mode.as_deref() {
        Some("smallest") => ReduceMode::Smallest,
        Some("longest") => ReduceMode::Longest,
        Some("shortest") => ReduceMode::Shortest,
        _ => ReduceMode::Largest,
    };
    if matches!(mode, ReduceMode::Longest | ReduceMode::Shortest) {
        warn!(?mode, "reduce modes `longest` and `shortest` are deprecated");
    }

    let measure = |item: &Value| match &key {
        Some(key) => item.get_path(key).cloned(),
        None => Some(item.clone()),
    };

    let mut best: Option<(Value, Value)> = None;
    for item in items {
        let Some(candidate) = measure(&item) else {
            continue;
        };
        let replace = match &best {
            None => true,
            Some((current, _)) => match mode {
                ReduceMode::Largest => compare(Some(&candidate), Some(current)) == Some(Ordering::Greater),
                ReduceMode::Smallest => compare(Some(&candidate), Some(current)) == Some(Ordering::Less),
                ReduceMode::Longest => count(Some(&candidate)) > count(Some(current)),
                ReduceMode::Shortest => count(Some(&candidate)) < count(Some(current)),
            },
        };
        if replace {
            best = Some((candidate, item));
        }
    }

    best.map(|(_, item)| item).unwrap_or_default()
}

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const NAIVE_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Read a date from epoch milliseconds, RFC 3339 or a common calendar
/// format. Forms without an offset are taken as UTC.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Integer(ms) => DateTime::from_timestamp_millis(*ms),
        Value::Float(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms.trunc() as i64),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return DateTime::from_timestamp_millis(ms);
            }
            if let Ok(date) = DateTime::parse_from_rfc3339(s) {
                return Some(date.with_timezone(&Utc));
            }
            if let Some(date) = NAIVE_DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            {
                return Some(date.and_utc());
            }
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|date| date.and_utc())
        }
        _ => None,
    }
}

/// `json` (the default) is ISO 8601 with milliseconds; `milliseconds` and
/// `javascript` are epoch milliseconds; `unix` is epoch seconds.
pub fn format_date(date: DateTime<Utc>, format: Option<&str>) -> Value {
    match format {
        Some("milliseconds" | "javascript") => Value::Integer(date.timestamp_millis()),
        Some("unix") => Value::Integer(date.timestamp()),
        _ => Value::String(date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
    }
}

/// Leading integer of the text, like `parseInt(x, 10)`; NaN when there is none.
fn int(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Integer(n)) => Value::Integer(*n),
        Some(Value::Float(n)) if n.is_finite() => Value::from_f64(n.trunc()),
        Some(value @ (Value::String(_) | Value::Boolean(_))) => {
            let text = value.to_text();
            let text = text.trim_start();
            let digits_at = usize::from(text.starts_with(['-', '+']));
            let digits = text[digits_at..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(text.len(), |end| digits_at + end);
            text[..digits]
                .parse::<i64>()
                .map_or(Value::Float(f64::NAN), Value::Integer)
        }
        _ => Value::Float(f64::NAN),
    }
}

/// Round to `precision` decimal places (default 2).
fn float(value: Option<&Value>, precision: Option<&Value>) -> Value {
    let n = value.map_or(f64::NAN, Value::as_number);
    let places = precision
        .map(Value::as_number)
        .filter(|p| p.is_finite() && *p >= 0.0)
        .map_or(2, |p| p as u32);

    let rounded = Decimal::from_f64(n)
        .map(|d| d.round_dp(places))
        .and_then(|d| d.to_f64())
        .unwrap_or(n);
    Value::Float(rounded)
}
