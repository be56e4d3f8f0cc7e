//! # Template Walker
//!
//! Templates mirror the output they produce. Each level is applied once per
//! element of its scope (a non-array scope counts as one element), object
//! keys and string leaves are resolved as expressions, and results are
//! written with [`assign`].
//!
//! ```text
//! {
//!   "@path": "Product",                      local scope for this level
//!   "title": "title | uppercase",            key and value are expressions
//!   "colors[variants]": { "'c'": "color" },  one entry per variant
//!   "!'flat'": { "a": "'b'" }                merged into this level
//! }
//! ```

use std::borrow::Cow;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    assign::{assign, assign_key},
    ast::{
        KeyKind, Shape,
        keys::{PATH_KEY, ROOT_KEY},
    },
    error::TransmuteError,
    evaluator::{Context, Evaluator},
    value::Value,
};

/// Whether `@path`/`@root` still have to be applied at this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reserved {
    Pending,
    /// Already applied by the call that fanned out over an `@path` array
    Consumed,
}

impl Evaluator {
    /// Apply `template` to `scope`.
    ///
    /// Object templates produce an object and array templates an array. A
    /// bare string template yields the value of its expression, `null` when
    /// it resolves to nothing. Other templates are returned as they are.
    pub fn transform(&self, scope: &Value, template: &Value) -> Result<Value, TransmuteError> {
        match template {
            Value::Object(_) | Value::Array(_) => {
                let mut target = empty_like(template, Shape::Object);
                self.walk(scope, template, &mut target, scope, Reserved::Pending)?;
                Ok(target)
            }
            Value::String(expr) => Ok(self
                .resolve(expr, scope, scope, Context::Value)?
                .value
                .unwrap_or_default()),
            other => Ok(other.clone()),
        }
    }

    fn walk(
        &self,
        scope: &Value,
        template: &Value,
        target: &mut Value,
        root: &Value,
        reserved: Reserved,
    ) -> Result<(), TransmuteError> {
        let elements = match scope {
            Value::Array(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };

        for element in elements {
            match template {
                Value::Object(entries) => {
                    self.walk_object(element, template, entries, target, root, reserved)?
                }
                Value::Array(items) => self.walk_array(element, items, target, root)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn walk_object(
        &self,
        element: &Value,
        template: &Value,
        entries: &IndexMap<String, Value>,
        target: &mut Value,
        root: &Value,
        reserved: Reserved,
    ) -> Result<(), TransmuteError> {
        let mut root = Cow::Borrowed(root);
        let mut local = Cow::Borrowed(element);

        if reserved == Reserved::Pending {
            if let Some(Value::String(expr)) = entries.get(ROOT_KEY) {
                root = if expr == PATH_KEY {
                    Cow::Borrowed(element)
                } else {
                    let resolved = self.resolve(expr, &root, &root, Context::Value)?;
                    Cow::Owned(resolved.value.unwrap_or_default())
                };
            }

            if let Some(Value::String(expr)) = entries.get(PATH_KEY) {
                local = if expr == ROOT_KEY {
                    root.clone()
                } else {
                    let resolved = self.resolve(expr, element, &root, Context::Value)?;
                    Cow::Owned(resolved.value.unwrap_or_default())
                };

                if local.is_array() {
                    debug!(path = %expr, "fanning out over @path array");
                    return self.walk(&local, template, target, &root, Reserved::Consumed);
                }
            }
        }

        if let Value::Array(items) = target {
            let mut item = Value::Object(IndexMap::new());
            self.fill_object(&local, entries, &mut item, &root)?;
            if !item.is_empty_collection() {
                items.push(item);
            }
            return Ok(());
        }

        self.fill_object(&local, entries, target, &root)
    }

    fn fill_object(
        &self,
        scope: &Value,
        entries: &IndexMap<String, Value>,
        out: &mut Value,
        root: &Value,
    ) -> Result<(), TransmuteError> {
        for (key, template) in entries {
            let kind = KeyKind::classify(key);
            let Some(expr) = kind.expression() else {
                continue;
            };

            let resolved = self.resolve(expr, scope, root, Context::Key)?;
            let child_scope = resolved.child_scope.as_ref().unwrap_or(scope);
            let value = self.build(child_scope, template, root, resolved.shape)?;

            if let KeyKind::Merge(_) = kind {
                match value {
                    Some(Value::Object(fields)) => {
                        for (field, value) in fields {
                            assign_key(out, &field, Some(value));
                        }
                    }
                    Some(other) => {
                        debug!(key = %key, kind = other.type_name(), "only objects merge into the parent");
                    }
                    None => {}
                }
                continue;
            }

            let destination = resolved
                .value
                .map_or_else(|| expr.to_string(), |value| value.to_text());
            assign(out, value, &destination);
        }
        Ok(())
    }

    fn walk_array(
        &self,
        element: &Value,
        items: &[Value],
        target: &mut Value,
        root: &Value,
    ) -> Result<(), TransmuteError> {
        for item in items {
            let value = self.build(element, item, root, Shape::Object)?;
            if let Value::Array(out) = target
                && let Some(value) = value
                && !value.is_empty_collection()
            {
                out.push(value);
            }
        }
        Ok(())
    }

    /// Produce the output for one template node.
    fn build(
        &self,
        scope: &Value,
        template: &Value,
        root: &Value,
        shape: Shape,
    ) -> Result<Option<Value>, TransmuteError> {
        let value = match template {
            Value::Object(_) | Value::Array(_) => {
                let mut out = empty_like(template, shape);
                self.walk(scope, template, &mut out, root, Reserved::Pending)?;
                Some(out)
            }
            Value::String(expr) => self.resolve(expr, scope, root, Context::Value)?.value,
            other => Some(other.clone()),
        };
        Ok(value)
    }
}

/// Empty output container for a nested template.
///
/// Array templates always build arrays; object templates build an array only
/// under a `name[expr]` key.
fn empty_like(template: &Value, shape: Shape) -> Value {
    match (template, shape) {
        (Value::Array(_), _) | (_, Shape::Array) => Value::Array(Vec::new()),
        _ => Value::Object(IndexMap::new()),
    }
}
