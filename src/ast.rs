//! # Transmute Expression Language - Syntax
//!
//! Templates are JSON trees whose strings are small expressions. This module
//! defines what the lexer turns those strings into, and how object-template
//! keys are classified before they are resolved.
//!
//! - **[tokens]** - tokens, filter calls and the lexer's delimiter kinds
//! - **[keys]** - reserved keys and key decorations
//!
//! ## Expression Grammar
//!
//! ```text
//! name.name.name              dotted lookup against the current scope
//! ^name.name                  dotted lookup against the root scope
//! 'literal text'              static string
//! [scopeExpr]rest             switch scope for the tokens that follow
//! text {{ expr }} text        escaped sub-expression, substituted into text
//! expr | filter('p1', p2)     filter pipeline, chainable
//! ```
//!
//! ## Key Decorations
//!
//! ```text
//! "@path": "expr"             repoint the local scope
//! "@root": "expr"             repoint the root scope
//! "!key": { ... }             merge the nested result into the parent
//! "name[expr]": { ... }       array output, one entry per element of expr
//! "name{expr}": { ... }       object output, evaluated against expr
//! ```
//!
//! ## Examples
//!
//! ```text
//! { "colors[Product.variants]": { "'color'": "color | uppercase" } }
//! { "summary": "{{title}} costs {{price | float}}" }
//! { "inStock": "Product.variants | filter(stock | int | gt('0')) | count" }
//! ```
pub mod keys;
pub mod tokens;

pub use keys::KeyKind;
pub use tokens::{Delimiter, FilterCall, Shape, Token, TokenKind};
