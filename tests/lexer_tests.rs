use pretty_assertions::assert_eq;
use transmute::{FilterCall, Lexer, Shape, TokenKind, tokenize};

// ============================================================================
// Token boundaries
// ============================================================================

#[test]
fn test_single_lookup() {
    let tokens = tokenize("Product.title");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Lookup);
    assert_eq!(tokens[0].raw, "Product.title");
    assert_eq!(tokens[0].pattern, "Product.title");
    assert_eq!(tokens[0].span, 0..13);
    assert!(!tokens[0].rooted);
    assert!(tokens[0].filters.is_empty());
}

#[test]
fn test_whitespace_separates_tokens() {
    let tokens = tokenize("a b  c");
    let raws: Vec<&str> = tokens.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(raws, vec!["a", "b", "c"]);
    assert_eq!(tokens[2].span, 5..6);
}

#[test]
fn test_prose_between_escapes() {
    let tokens = tokenize("{{Product.title}} costs {{Product.price}}");
    assert_eq!(tokens.len(), 3);

    assert_eq!(tokens[0].kind, TokenKind::Escaped);
    assert_eq!(tokens[0].raw, "Product.title");
    assert_eq!(tokens[0].span, 0..17);

    assert_eq!(tokens[1].kind, TokenKind::Lookup);
    assert_eq!(tokens[1].raw, "costs");
    assert_eq!(tokens[1].span, 18..23);

    assert_eq!(tokens[2].kind, TokenKind::Escaped);
    assert_eq!(tokens[2].raw, "Product.price");
    assert_eq!(tokens[2].span, 24..41);
}

#[test]
fn test_rooted_escape() {
    let tokens = tokenize("^{{Product.tags}}");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Escaped);
    assert!(tokens[0].rooted);
    assert_eq!(tokens[0].raw, "Product.tags");
    assert_eq!(tokens[0].span, 0..17);
    assert_eq!(tokens[0].pattern, "^{{Product.tags}}");
}

#[test]
fn test_caret_inside_escape_stays_in_the_expression() {
    let tokens = tokenize("{{^Product.tags}}");
    assert_eq!(tokens.len(), 1);
    assert!(!tokens[0].rooted);
    assert_eq!(tokens[0].raw, "^Product.tags");
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filters_attach_across_whitespace() {
    let tokens = tokenize("a | f | g");
    assert_eq!(tokens.len(), 1);
    assert_eq!(
        tokens[0].filters,
        vec![FilterCall::new("f", &[]), FilterCall::new("g", &[])]
    );
    assert_eq!(tokens[0].span, 0..9);
}

#[test]
fn test_static_with_chained_filters() {
    let tokens = tokenize("'x'|uppercase|lowercase");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Static);
    assert_eq!(tokens[0].raw, "x");
    assert_eq!(tokens[0].filters.len(), 2);
}

#[test]
fn test_empty_parameter_list() {
    let tokens = tokenize("a | f()");
    assert_eq!(tokens[0].filters, vec![FilterCall::new("f", &[])]);
}

#[test]
fn test_quoted_commas_stay_in_one_parameter() {
    let tokens = tokenize("'a' | concat('x,y', 'z')");
    assert_eq!(
        tokens[0].filters,
        vec![FilterCall::new("concat", &["'x,y'", "'z'"])]
    );
}

#[test]
fn test_nested_filter_parameters() {
    let tokens = tokenize("x | add(y | multiply('2'))");
    assert_eq!(tokens.len(), 1);
    assert_eq!(
        tokens[0].filters,
        vec![FilterCall::new("add", &["y|multiply('2')"])]
    );
}

#[test]
fn test_primary_call_parameters_strip_whitespace() {
    let tokens = tokenize("concat( 'a' , 'b' )");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::FilterCall);
    assert_eq!(tokens[0].raw, "concat");
    assert_eq!(tokens[0].opts, vec!["'a'".to_string(), "'b'".to_string()]);
}

#[test]
fn test_unterminated_input_does_not_panic() {
    let tokens = tokenize("Product.variants | add('1");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].raw, "Product.variants");
    assert_eq!(tokens[0].filters[0].name, "add");
    assert_eq!(tokens[0].filters[0].params, vec!["'1".to_string()]);
}

// ============================================================================
// Scope switches and key suffixes
// ============================================================================

#[test]
fn test_scope_switch_then_filtered_lookup() {
    let tokens = tokenize("[a]b | uppercase");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::ScopeSwitch);
    assert_eq!(tokens[0].opts, vec!["a".to_string()]);
    assert_eq!(tokens[0].span, 0..3);

    assert_eq!(tokens[1].raw, "b");
    assert_eq!(tokens[1].filters, vec![FilterCall::new("uppercase", &[])]);
    assert_eq!(tokens[1].pattern, "b | uppercase");
}

#[test]
fn test_lone_bracket_is_a_scope_switch() {
    let tokens = tokenize("[variants]");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::ScopeSwitch);
    assert_eq!(tokens[0].shape, None);
}

#[test]
fn test_key_suffix_shapes() {
    let tokens = tokenize("colors[variants]");
    assert_eq!(tokens[0].shape, Some(Shape::Array));
    assert_eq!(tokens[0].opts, vec!["variants".to_string()]);
    assert_eq!(tokens[0].literal_key(), "colors[variants]");

    let tokens = tokenize("first{variants.0}");
    assert_eq!(tokens[0].shape, Some(Shape::Object));
    assert_eq!(tokens[0].opts, vec!["variants.0".to_string()]);
}

#[test]
fn test_suffix_keeps_inner_whitespace() {
    let tokens = tokenize("k[a | b]");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].opts, vec!["a | b".to_string()]);
}

#[test]
fn test_leading_brace_is_plain_text() {
    let tokens = tokenize("{x}");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].raw, "{x}");
    assert_eq!(tokens[0].shape, None);
}

#[test]
fn test_lexer_matches_free_function() {
    let input = "[Product.variants.0]color | uppercase";
    assert_eq!(Lexer::new(input).tokenize(), tokenize(input));
}
