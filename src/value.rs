use indexmap::IndexMap;

use crate::output::to_json;

/// A JSON value flowing through scopes, templates and filters.
///
/// Objects keep their insertion order, so templates produce keys in the order
/// they were written and `keys`/`values` report source order.
///
/// Numbers keep the integer/float distinction. Filters that compute numbers
/// go through [`Value::from_f64`], which folds whole results back into
/// [`Value::Integer`].
///
/// # Examples
///
/// ```
/// use transmute::Value;
/// use indexmap::IndexMap;
///
/// let mut obj = IndexMap::new();
/// obj.insert("color".to_string(), Value::String("red".to_string()));
/// obj.insert("stock".to_string(), Value::Integer(5));
/// let variant = Value::Object(obj);
///
/// assert_eq!(variant.get_path("stock"), Some(&Value::Integer(5)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON null
    #[default]
    Null,

    /// JSON boolean
    Boolean(bool),

    /// Floating-point number (may be NaN after a failed coercion)
    Float(f64),

    /// Integer number
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with ordered string keys
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Truthiness used by `and`, `or`, `not`, `bool`, `default` and `if`.
    ///
    /// Strings are the interesting case: a numeric string is truthy iff it is
    /// nonzero, `true|yes|t|y` are truthy and `false|no|f|n` are not (case
    /// insensitive), anything else is truthy iff non-empty.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0 && !n.is_nan(),
            Integer(n) => *n != 0,
            String(s) => string_truthiness(s),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
        }
    }

    /// `true` for `[]` and `{}`, the values the assigner prunes.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::Array(arr) => arr.is_empty(),
            Value::Object(obj) => obj.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion, modelled on JavaScript's unary plus.
    ///
    /// Empty strings and null coerce to zero, unparseable input to NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Integer(n) => *n as f64,
            Value::Float(n) => *n,
            Value::String(s) => parse_number(s).unwrap_or(f64::NAN),
            Value::Array(arr) => match arr.as_slice() {
                [] => 0.0,
                [single] => single.as_number(),
                _ => f64::NAN,
            },
            Value::Object(_) => f64::NAN,
        }
    }

    /// Build a number, preferring [`Value::Integer`] for whole results.
    pub fn from_f64(n: f64) -> Value {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
            Value::Integer(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Text used for interpolation, output keys and string filters.
    ///
    /// Arrays render their elements comma-joined, objects as compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Array(arr) => arr.iter().map(Value::to_text).collect::<Vec<_>>().join(","),
            Value::Object(_) => to_json(self),
        }
    }

    /// Walk a dotted path (`a.b.0.c`) through objects and arrays.
    ///
    /// An empty path yields the value itself. Any missing key, out of range
    /// index or scalar intermediate ends the walk with `None`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }

        let mut node = self;
        for key in path.split('.') {
            node = match node {
                Value::Object(map) => map.get(key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Truthiness of an optional value; absent is falsy.
pub fn truthy(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_truthy)
}

/// Parse a string the way numeric coercion does: trimmed, empty means zero.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok()
}

fn string_truthiness(s: &str) -> bool {
    let trimmed = s.trim();
    if !trimmed.is_empty()
        && let Ok(n) = trimmed.parse::<f64>()
    {
        return n != 0.0 && !n.is_nan();
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "yes" | "t" | "y" => true,
        "false" | "no" | "f" | "n" => false,
        _ => !s.is_empty(),
    }
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
