use std::borrow::Cow;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::{
    ast::{Shape, Token, TokenKind},
    environment::{Clock, Fingerprint, Md5Fingerprint, SystemClock},
    error::TransmuteError,
    lexer::tokenize,
    value::Value,
};

/// Where an expression appears in a template.
///
/// Keys fall back to their own text when a lookup misses, so
/// `"cheapestShippingCost"` names an output key even though no such path
/// exists in the data. Values that miss are absent and get pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Key,
    Value,
}

/// Result of resolving one expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedExpression {
    /// Output shape requested by a `[expr]` or `{expr}` key suffix
    pub shape: Shape,

    /// `None` when the expression resolved to nothing
    pub value: Option<Value>,

    /// Scope for nested templates, set by a key suffix or a scope switch
    pub child_scope: Option<Value>,
}

/// Resolves expressions and walks templates.
///
/// Holds the clock and fingerprint used by `now`, `date` and `hash`; every
/// other part of evaluation is a pure function of its inputs, so one
/// evaluator can be shared between threads.
pub struct Evaluator {
    clock: Box<dyn Clock>,
    fingerprint: Box<dyn Fingerprint>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            clock: Box::new(SystemClock),
            fingerprint: Box::new(Md5Fingerprint),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Fingerprint + 'static) -> Self {
        self.fingerprint = Box::new(fingerprint);
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn fingerprint(&self, input: &str) -> String {
        self.fingerprint.fingerprint(input)
    }

    /// Resolve a value expression against a scope that is also the root.
    pub fn evaluate(&self, expr: &str, scope: &Value) -> Result<Option<Value>, TransmuteError> {
        Ok(self.resolve(expr, scope, scope, Context::Value)?.value)
    }

    /// Resolve `expr` against `scope`, with `^` lookups going to `root`.
    ///
    /// An expression with a single value token keeps that token's native
    /// value. With several, each token's text replaces its source text and
    /// the result is a string.
    pub fn resolve(
        &self,
        expr: &str,
        scope: &Value,
        root: &Value,
        context: Context,
    ) -> Result<ResolvedExpression, TransmuteError> {
        let tokens = tokenize(expr);
        trace!(expr, tokens = tokens.len(), "resolving expression");

        let mut resolved = ResolvedExpression::default();
        let mut current: Cow<'_, Value> = Cow::Borrowed(scope);
        let mut results: Vec<Option<Value>> = Vec::with_capacity(tokens.len());

        for token in &tokens {
            if token.kind == TokenKind::ScopeSwitch {
                let base = if token.rooted { root } else { scope };
                let inner = token.opts.first().map_or("", String::as_str);
                let switched = self.resolve(inner, base, root, Context::Value)?.value;
                let switched = self.apply_filters(token, switched, base, root)?;
                let switched = switched.unwrap_or_default();
                resolved.child_scope = Some(switched.clone());
                current = Cow::Owned(switched);
                results.push(None);
                continue;
            }

            let value = self.resolve_token(token, &current, root, context, &mut resolved)?;
            results.push(self.apply_filters(token, value, &current, root)?);
        }

        let mut yielding = tokens
            .iter()
            .zip(&results)
            .filter(|(token, _)| token.yields_value());

        resolved.value = match (yielding.next(), yielding.next()) {
            (None, _) if !tokens.is_empty() => resolved.child_scope.clone(),
            (None, _) => None,
            (Some((_, value)), None) => value.clone(),
            (Some(_), Some(_)) => Some(Value::String(interpolate(expr, &tokens, &results))),
        };

        Ok(resolved)
    }

    fn resolve_token(
        &self,
        token: &Token,
        scope: &Value,
        root: &Value,
        context: Context,
        resolved: &mut ResolvedExpression,
    ) -> Result<Option<Value>, TransmuteError> {
        let value = match token.kind {
            TokenKind::Lookup => {
                let base = if token.rooted { root } else { scope };
                let mut value = base.get_path(&token.raw).cloned();
                if value.is_none() && context == Context::Key {
                    debug!(key = %token.raw, "key does not resolve, using it literally");
                    value = Some(Value::String(token.raw.clone()));
                }

                if let Some(shape) = token.shape {
                    let inner = token.opts.first().map_or("", String::as_str);
                    match self.resolve(inner, scope, root, Context::Value)?.value {
                        Some(child) => {
                            resolved.shape = shape;
                            resolved.child_scope = Some(child);
                        }
                        None if context == Context::Key => {
                            debug!(key = %token.literal_key(), "key scope is absent, using key literally");
                            value = Some(Value::String(token.literal_key()));
                        }
                        None => {}
                    }
                }
                value
            }
            TokenKind::Static => Some(Value::String(token.raw.clone())),
            TokenKind::Escaped => {
                let base = if token.rooted { root } else { scope };
                self.resolve(&token.raw, base, root, Context::Value)?.value
            }
            TokenKind::FilterCall => self.apply_filter(&token.raw, &token.opts, scope, root, None)?,
            TokenKind::ScopeSwitch => None,
        };
        Ok(value)
    }

    /// Run the token's filter chain left to right.
    fn apply_filters(
        &self,
        token: &Token,
        mut value: Option<Value>,
        scope: &Value,
        root: &Value,
    ) -> Result<Option<Value>, TransmuteError> {
        for filter in &token.filters {
            value = self.apply_filter(&filter.name, &filter.params, scope, root, value)?;
        }
        Ok(value)
    }
}

/// Rebuild the expression text with every token replaced by its value.
///
/// Scope switches leave nothing behind. A lookup that resolved to nothing
/// keeps its source text, so prose around `{{ }}` survives; any other
/// absent token becomes empty.
fn interpolate(expr: &str, tokens: &[Token], results: &[Option<Value>]) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let mut text = String::with_capacity(expr.len());
    let mut cursor = 0;

    for (token, result) in tokens.iter().zip(results) {
        let start = token.span.start.clamp(cursor, chars.len());
        text.extend(&chars[cursor..start]);
        match (token.kind, result) {
            (TokenKind::ScopeSwitch, _) => {}
            (_, Some(value)) => text.push_str(&value.to_text()),
            (TokenKind::Lookup, None) => text.push_str(&token.pattern),
            (_, None) => {}
        }
        cursor = token.span.end.clamp(start, chars.len());
    }
    text.extend(&chars[cursor..]);
    text
}
