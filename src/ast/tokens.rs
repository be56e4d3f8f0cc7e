use std::ops::Range;

/// What a token contributes when its expression is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    /// Dotted path looked up in the current (or root) scope
    ///
    /// # Examples
    /// ```text
    /// Product.title
    /// variants.0.color
    /// ^Product.tags
    /// ```
    #[default]
    Lookup,

    /// Quoted literal, resolved to its text unchanged
    ///
    /// # Examples
    /// ```text
    /// 'red'
    /// 'should work{}'
    /// ```
    Static,

    /// Bracketed expression at the start of a token; its value becomes the
    /// scope of every token after it
    ///
    /// # Examples
    /// ```text
    /// [Product.variants.0]color
    /// ```
    ScopeSwitch,

    /// `{{ ... }}` sub-expression whose value is substituted into the
    /// surrounding text
    ///
    /// # Examples
    /// ```text
    /// {{'red' | uppercase}}{{'blue' | lowercase}}
    /// ```
    Escaped,

    /// Filter invoked as the primary token, with no piped value
    ///
    /// # Examples
    /// ```text
    /// now('milliseconds')
    /// not('true')
    /// get()
    /// ```
    FilterCall,
}

/// Output shape requested by a `[expr]` or `{expr}` key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// `name[expr]`: one output entry per element of `expr`
    Array,

    /// `name{expr}` or no suffix: a single value, last write wins
    #[default]
    Object,
}

/// Delimiters tracked on the lexer's nesting stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Quote,
    Paren,
    Bracket,
    Brace,
    DoubleBrace,
}

impl Delimiter {
    /// Whether a single `ch` closes this delimiter. Quotes and `}}` are
    /// matched by the lexer itself.
    pub fn closed_by(self, ch: char) -> bool {
        matches!(
            (self, ch),
            (Delimiter::Paren, ')') | (Delimiter::Bracket, ']') | (Delimiter::Brace, '}')
        )
    }
}

/// A filter attached to a token with `|`.
///
/// Parameters stay raw expression text; they are resolved when the filter
/// runs, and `filter` re-resolves them once per array element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCall {
    pub name: String,
    pub params: Vec<String>,
}

impl FilterCall {
    pub fn new(name: &str, params: &[&str]) -> Self {
        FilterCall {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// One parsed unit of an expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Token {
    pub kind: TokenKind,

    /// Path for lookups, text for statics, filter name for filter calls,
    /// inner expression for escaped tokens
    pub raw: String,

    /// Exact source text covered by the token, filters included
    pub pattern: String,

    /// Character range of `pattern` within the expression
    pub span: Range<usize>,

    /// Resolve against the root scope (`^` prefix)
    pub rooted: bool,

    /// Set when a lookup carries a `[expr]` or `{expr}` suffix
    pub shape: Option<Shape>,

    /// Raw sub-expressions: the suffix or switch scope expression, or the
    /// parameters of a primary filter call
    pub opts: Vec<String>,

    pub filters: Vec<FilterCall>,
}

impl Token {
    /// A token that has not consumed anything yet.
    pub fn is_blank(&self) -> bool {
        self.kind == TokenKind::Lookup
            && self.raw.is_empty()
            && self.shape.is_none()
            && self.opts.is_empty()
            && self.filters.is_empty()
    }

    /// Tokens that produce a value; scope switches only move the scope.
    pub fn yields_value(&self) -> bool {
        self.kind != TokenKind::ScopeSwitch
    }

    /// The key text before any suffix, rebuilt with the suffix itself.
    pub fn literal_key(&self) -> String {
        match (self.shape, self.opts.first()) {
            (Some(Shape::Array), Some(expr)) => format!("{}[{}]", self.raw, expr),
            (Some(Shape::Object), Some(expr)) => format!("{}{{{}}}", self.raw, expr),
            (Some(Shape::Array), None) => format!("{}[]", self.raw),
            (Some(Shape::Object), None) => format!("{}{{}}", self.raw),
            (None, _) => self.raw.clone(),
        }
    }
}
