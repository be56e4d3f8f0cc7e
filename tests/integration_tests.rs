//! End-to-end scenarios against a small storefront document.

use pretty_assertions::assert_eq;
use serde_json::json;
use transmute::transform_json;

fn scope() -> serde_json::Value {
    json!({
        "title": "ACME super soaker",
        "price": "25.00",
        "variants": [
            { "color": "red", "stock": "5" },
            { "color": "blue", "stock": "3" },
            { "color": "green", "stock": "0" }
        ]
    })
}

fn run(template: serde_json::Value) -> serde_json::Value {
    transform_json(scope(), template).unwrap()
}

#[test]
fn test_static_arithmetic() {
    assert_eq!(run(json!({ "x": "'25' | add('1')" })), json!({ "x": 26 }));
}

#[test]
fn test_pluck_and_join() {
    assert_eq!(
        run(json!({ "x": "variants | pluck('color') | join" })),
        json!({ "x": "red,blue,green" })
    );
}

#[test]
fn test_legacy_filter() {
    assert_eq!(
        run(json!({ "x": "variants | filter('stock','>','0')" })),
        json!({
            "x": [
                { "color": "red", "stock": "5" },
                { "color": "blue", "stock": "3" }
            ]
        })
    );
}

#[test]
fn test_array_scoped_key() {
    assert_eq!(
        run(json!({ "colors[variants]": { "'color'": "color" } })),
        json!({
            "colors": [{ "color": "red" }, { "color": "blue" }, { "color": "green" }]
        })
    );
}

#[test]
fn test_missing_value_is_pruned() {
    assert_eq!(run(json!({ "x": "does.not.exist" })), json!({}));
}

#[test]
fn test_scalar_scope_iterates_once() {
    assert_eq!(
        run(json!({ "@path": "title", "x": "'literal'" })),
        json!({ "x": "literal" })
    );
}

#[test]
fn test_product_feed_entry() {
    let output = run(json!({
        "name": "title | uppercase",
        "'price'": "price | float",
        "title": "'keys resolve like values'",
        "summary": "{{title}} from {{price}}",
        "inStock": "variants | filter(stock | int | gt('0')) | pluck('color')",
        "stock{variants}": { "color": "stock | int" }
    }));

    assert_eq!(
        output,
        json!({
            "name": "ACME SUPER SOAKER",
            "price": 25.0,
            "summary": "ACME super soaker from 25.00",
            "inStock": ["red", "blue"],
            "stock": { "red": 5, "blue": 3, "green": 0 },
            "ACME super soaker": "keys resolve like values"
        })
    );
}
