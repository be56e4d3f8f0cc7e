use crate::ast::{Delimiter, FilterCall, Shape, Token, TokenKind};

/// What the next plain character is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Token text: a path, a literal, a filter name or an escaped expression
    ReadingValue,
    /// A `[...]`/`{...}` suffix or the parameters of a primary filter call
    ReadingOpts,
    /// The name following `|`
    ReadingFilterName,
    /// The parameter list of a chained filter
    ReadingFilterOpts,
}

/// Single pass tokenizer for template expressions.
///
/// Never fails: unterminated delimiters simply leave whatever was collected
/// in the last token, and unknown filter names are only reported when the
/// evaluator dispatches them.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    stack: Vec<Delimiter>,
    state: State,
    tokens: Vec<Token>,
    token: Token,
    start: Option<usize>,
    end: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            stack: Vec::new(),
            state: State::ReadingValue,
            tokens: Vec::new(),
            token: Token::default(),
            start: None,
            end: 0,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(ch) = self.current_char() {
            self.step(ch);
        }
        self.finish_token();
        self.tokens
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn top(&self) -> Option<Delimiter> {
        self.stack.last().copied()
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Advance over `n` characters that belong to the current token.
    fn consume(&mut self, n: usize) {
        self.start.get_or_insert(self.position);
        self.position += n;
        self.end = self.position;
    }

    /// Advance over a separator that belongs to no token.
    fn skip(&mut self) {
        self.position += 1;
    }

    fn append(&mut self, ch: char) {
        self.push_char(ch);
        self.consume(1);
    }

    fn push_char(&mut self, ch: char) {
        match self.state {
            State::ReadingValue => self.token.raw.push(ch),
            State::ReadingOpts => {
                if let Some(opt) = self.token.opts.last_mut() {
                    opt.push(ch);
                }
            }
            State::ReadingFilterName => {
                if let Some(filter) = self.token.filters.last_mut() {
                    filter.name.push(ch);
                }
            }
            State::ReadingFilterOpts => {
                if let Some(param) = self
                    .token
                    .filters
                    .last_mut()
                    .and_then(|filter| filter.params.last_mut())
                {
                    param.push(ch);
                }
            }
        }
    }

    fn filter_has_name(&self) -> bool {
        self.token
            .filters
            .last()
            .is_some_and(|filter| !filter.name.is_empty())
    }

    fn step(&mut self, ch: char) {
        if self.top() == Some(Delimiter::Quote) {
            self.lex_quoted(ch);
            return;
        }

        match ch {
            '\'' => {
                self.stack.push(Delimiter::Quote);
                if self.depth() > 1 {
                    self.push_char(ch);
                }
                self.consume(1);
            }
            '^' if self.state == State::ReadingValue
                && self.stack.is_empty()
                && self.token.is_blank()
                && !self.token.rooted =>
            {
                self.token.rooted = true;
                self.consume(1);
            }
            '(' => self.lex_paren(),
            '[' => self.lex_bracket(),
            '{' if self.peek_char(1) == Some('{') => self.lex_escape_open(),
            '{' => self.lex_brace(),
            '}' if self.peek_char(1) == Some('}') && self.top() == Some(Delimiter::DoubleBrace) => {
                self.lex_escape_close()
            }
            ')' | ']' | '}' => self.lex_close(ch),
            '|' if self.stack.is_empty() => self.lex_pipe(),
            ',' if self.depth() == 1 => {
                if !self.lex_comma() {
                    self.append(ch);
                }
            }
            c if c.is_whitespace() => self.lex_whitespace(c),
            c => self.append(c),
        }
    }

    fn lex_quoted(&mut self, ch: char) {
        if ch == '\'' {
            self.stack.pop();
            if self.stack.is_empty() {
                if self.state == State::ReadingValue {
                    self.token.kind = TokenKind::Static;
                }
                self.consume(1);
                return;
            }
        }
        self.append(ch);
    }

    fn lex_paren(&mut self) {
        self.stack.push(Delimiter::Paren);
        if self.depth() == 1 {
            match self.state {
                State::ReadingFilterName if self.filter_has_name() => {
                    if let Some(filter) = self.token.filters.last_mut() {
                        filter.params.push(String::new());
                    }
                    self.state = State::ReadingFilterOpts;
                    self.consume(1);
                    return;
                }
                State::ReadingValue
                    if self.token.kind == TokenKind::Lookup && !self.token.raw.is_empty() =>
                {
                    self.token.kind = TokenKind::FilterCall;
                    self.token.opts = vec![String::new()];
                    self.state = State::ReadingOpts;
                    self.consume(1);
                    return;
                }
                _ => {}
            }
        }
        self.append('(');
    }

    fn lex_bracket(&mut self) {
        self.stack.push(Delimiter::Bracket);
        if self.depth() == 1
            && self.state == State::ReadingValue
            && self.token.kind == TokenKind::Lookup
            && self.token.shape.is_none()
        {
            if self.token.is_blank() {
                self.token.kind = TokenKind::ScopeSwitch;
            } else {
                self.token.shape = Some(Shape::Array);
            }
            self.token.opts = vec![String::new()];
            self.state = State::ReadingOpts;
            self.consume(1);
            return;
        }
        self.append('[');
    }

    fn lex_brace(&mut self) {
        self.stack.push(Delimiter::Brace);
        if self.depth() == 1
            && self.state == State::ReadingValue
            && self.token.kind == TokenKind::Lookup
            && self.token.shape.is_none()
            && !self.token.raw.is_empty()
        {
            self.token.shape = Some(Shape::Object);
            self.token.opts = vec![String::new()];
            self.state = State::ReadingOpts;
            self.consume(1);
            return;
        }
        self.append('{');
    }

    fn lex_escape_open(&mut self) {
        if self.stack.is_empty() && self.state == State::ReadingValue {
            let rooted = self.token.is_blank() && self.token.rooted;
            let caret = if rooted { self.start } else { None };
            if rooted {
                self.token.rooted = false;
            }
            self.finish_token();
            self.token.kind = TokenKind::Escaped;
            self.token.rooted = rooted;
            self.start = caret;
            self.stack.push(Delimiter::DoubleBrace);
            self.consume(2);
            return;
        }

        self.stack.push(Delimiter::DoubleBrace);
        self.push_char('{');
        self.push_char('{');
        self.consume(2);
    }

    fn lex_escape_close(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() && self.token.kind == TokenKind::Escaped {
            self.consume(2);
            self.finish_token();
            return;
        }

        self.push_char('}');
        self.push_char('}');
        self.consume(2);
    }

    fn lex_close(&mut self, ch: char) {
        if let Some(top) = self.top()
            && top.closed_by(ch)
        {
            self.stack.pop();
            if self.stack.is_empty() {
                match self.state {
                    State::ReadingOpts => {
                        self.consume(1);
                        self.state = State::ReadingValue;
                        if self.token.kind == TokenKind::ScopeSwitch {
                            self.finish_token();
                        }
                        return;
                    }
                    State::ReadingFilterOpts => {
                        self.consume(1);
                        self.state = State::ReadingFilterName;
                        return;
                    }
                    State::ReadingValue | State::ReadingFilterName => {}
                }
            }
        }
        self.append(ch);
    }

    fn lex_pipe(&mut self) {
        if self.state == State::ReadingValue
            && self.token.is_blank()
            && !self.token.rooted
            && let Some(previous) = self.tokens.pop()
        {
            self.start = Some(previous.span.start);
            self.token = previous;
        }
        self.token.filters.push(FilterCall::default());
        self.state = State::ReadingFilterName;
        self.consume(1);
    }

    /// Returns `false` when the comma is ordinary content.
    fn lex_comma(&mut self) -> bool {
        match self.state {
            State::ReadingFilterOpts => {
                if let Some(filter) = self.token.filters.last_mut() {
                    filter.params.push(String::new());
                }
            }
            State::ReadingOpts if self.token.kind == TokenKind::FilterCall => {
                self.token.opts.push(String::new());
            }
            _ => return false,
        }
        self.consume(1);
        true
    }

    fn lex_whitespace(&mut self, ch: char) {
        if self.stack.is_empty() {
            match self.state {
                State::ReadingFilterName if self.filter_has_name() => self.finish_token(),
                State::ReadingValue if !self.token.is_blank() => self.finish_token(),
                _ => {}
            }
            self.skip();
            return;
        }

        let in_params = self.state == State::ReadingFilterOpts
            || (self.state == State::ReadingOpts && self.token.kind == TokenKind::FilterCall);
        if self.depth() == 1 && in_params {
            self.skip();
            return;
        }
        self.append(ch);
    }

    fn finish_token(&mut self) {
        let mut token = std::mem::take(&mut self.token);
        let start = self.start.take();
        self.state = State::ReadingValue;

        if token.is_blank() {
            return;
        }

        token.span = start.map_or(self.end..self.end, |start| start..self.end);
        token.pattern = self.input[token.span.clone()].iter().collect();
        if token.opts == [""] {
            token.opts.clear();
        }
        for filter in &mut token.filters {
            if filter.params == [""] {
                filter.params.clear();
            }
        }
        self.tokens.push(token);
    }
}

/// Tokenize an expression.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

#[test]
fn test_static_with_filter() {
    let tokens = tokenize("'25' | add('1')");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Static);
    assert_eq!(tokens[0].raw, "25");
    assert_eq!(tokens[0].pattern, "'25' | add('1')");
    assert_eq!(tokens[0].span, 0..15);
    assert_eq!(tokens[0].filters, vec![FilterCall::new("add", &["'1'"])]);
}

#[test]
fn test_scope_switches() {
    let tokens = tokenize("[Product.variants.0]color [Product.variants.1]color");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::ScopeSwitch,
            TokenKind::Lookup,
            TokenKind::ScopeSwitch,
            TokenKind::Lookup
        ]
    );
    assert_eq!(tokens[0].opts, vec!["Product.variants.0".to_string()]);
    assert_eq!(tokens[0].pattern, "[Product.variants.0]");
    assert_eq!(tokens[1].raw, "color");
    assert_eq!(tokens[3].span, 46..51);
}

#[test]
fn test_escaped_expressions() {
    let tokens = tokenize("{{'red' | uppercase}}{{'blue' | lowercase}}");
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Escaped));
    assert_eq!(tokens[0].raw, "'red' | uppercase");
    assert_eq!(tokens[0].pattern, "{{'red' | uppercase}}");
    assert_eq!(tokens[1].raw, "'blue' | lowercase");
}

#[test]
fn test_nested_escapes_stay_in_one_token() {
    let tokens = tokenize("{{{{{{'red'}} | uppercase}}{{'blue' | lowercase}}}}");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].raw, "{{{{'red'}} | uppercase}}{{'blue' | lowercase}}");
}

#[test]
fn test_key_suffixes() {
    let tokens = tokenize("key{with-brackets}");
    assert_eq!(tokens[0].raw, "key");
    assert_eq!(tokens[0].shape, Some(Shape::Object));
    assert_eq!(tokens[0].opts, vec!["with-brackets".to_string()]);
    assert_eq!(tokens[0].literal_key(), "key{with-brackets}");

    let tokens = tokenize("siblingArr[^Product.carriers | filter(name | eq('FedEx'))]");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].shape, Some(Shape::Array));
    assert_eq!(
        tokens[0].opts,
        vec!["^Product.carriers | filter(name | eq('FedEx'))".to_string()]
    );
}

#[test]
fn test_quotes_make_delimiters_inert() {
    let tokens = tokenize("'should work{}'");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Static);
    assert_eq!(tokens[0].raw, "should work{}");
}

#[test]
fn test_filter_params_strip_whitespace() {
    let tokens = tokenize("Product.variants | filter(color | count | lt(stock | int))");
    assert_eq!(tokens.len(), 1);
    assert_eq!(
        tokens[0].filters,
        vec![FilterCall::new("filter", &["color|count|lt(stock | int)"])]
    );

    let tokens = tokenize("'acme' | concat(' ', 'super')");
    assert_eq!(
        tokens[0].filters,
        vec![FilterCall::new("concat", &["' '", "'super'"])]
    );
}

#[test]
fn test_primary_filter_calls() {
    let tokens = tokenize("now('milliseconds')");
    assert_eq!(tokens[0].kind, TokenKind::FilterCall);
    assert_eq!(tokens[0].raw, "now");
    assert_eq!(tokens[0].opts, vec!["'milliseconds'".to_string()]);

    let tokens = tokenize("get() | get('Product.title')");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::FilterCall);
    assert!(tokens[0].opts.is_empty());
    assert_eq!(tokens[0].filters, vec![FilterCall::new("get", &["'Product.title'"])]);
}

#[test]
fn test_chained_filters_and_root() {
    let tokens = tokenize("^Product.tags | split|count");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].rooted);
    assert_eq!(tokens[0].raw, "Product.tags");
    assert_eq!(
        tokens[0].filters,
        vec![FilterCall::new("split", &[]), FilterCall::new("count", &[])]
    );
}

#[test]
fn test_blank_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   ").is_empty());
}
