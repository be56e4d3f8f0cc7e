mod common;

use common::{apply, evaluator, product_scope, scope};
use pretty_assertions::{assert_eq, assert_ne};
use serde_json::json;
use transmute::{TransmuteError, Value};

// ============================================================================
// Keys
// ============================================================================

#[test]
fn test_single_braces_in_keys_and_values() {
    let result = apply(json!({
        "filter1": { "key{with-brackets}": "'should work{}'" }
    }));
    assert_eq!(
        result,
        json!({ "filter1": { "key{with-brackets}": "should work{}" } })
    );
}

#[test]
fn test_merge_key_assigns_children_to_parent() {
    let result = apply(json!({
        "filter1": {
            "!'colors'": {
                "@path": "Product.variants",
                "color": "stock"
            }
        }
    }));
    assert_eq!(
        result,
        json!({ "filter1": { "red": "5", "blue": "3", "green": "0" } })
    );
}

#[test]
fn test_merge_key_drops_non_objects() {
    let result = apply(json!({
        "!'scalar'": "'dropped'",
        "kept": "'yes'"
    }));
    assert_eq!(result, json!({ "kept": "yes" }));
}

#[test]
fn test_merge_key_keeps_nested_structure() {
    let result = apply(json!({
        "!'m'": { "a.b": "'c'" },
        "a": { "d": "'e'" }
    }));
    assert_eq!(result, json!({ "a": { "d": "e" } }));

    let result = apply(json!({ "!'m'": { "a.b": "'c'" } }));
    assert_eq!(result, json!({ "a": { "b": "c" } }));
}

#[test]
fn test_unresolved_keys_are_literal_and_dotted_keys_nest() {
    let result = apply(json!({
        "shipping.economy.cost": "Product.shipping.options.economy.cost"
    }));
    assert_eq!(result, json!({ "shipping": { "economy": { "cost": "0.00" } } }));
}

#[test]
fn test_keys_resolve_against_data() {
    let result = apply(json!({
        "Product.title": "'x'",
        "{{Product.variants.0.color}} shirt": "'y'"
    }));
    assert_eq!(result, json!({ "ACME super soaker": "x", "red shirt": "y" }));
}

// ============================================================================
// @path and @root
// ============================================================================

#[test]
fn test_path_key() {
    let result = apply(json!({
        "@path": "Product.shipping.options",
        "cheapestShippingCost": "economy.cost",
        "expeditedShippingOptions": {
            "'nextDay'": "nextDay"
        },
        "revert": {
            "@path": "@root",
            "'title'": "Product.title"
        },
        "siblingArr[^Product.carriers | filter(name | eq('FedEx'))]": {
            "@root": "@path",
            "@path": "services",
            "^name name": "days"
        }
    }));

    assert_eq!(result["cheapestShippingCost"], json!("0.00"));
    assert_eq!(result["expeditedShippingOptions"]["nextDay"]["cost"], json!("45.00"));
    assert_eq!(result["revert"]["title"], json!("ACME super soaker"));
    assert_eq!(
        result["siblingArr"],
        json!([
            { "FedEx Next Day": "1" },
            { "FedEx Two Day": "2" },
            { "FedEx Three Day": "3" }
        ])
    );
}

#[test]
fn test_path_fan_out_into_object_merges_iterations() {
    let result = apply(json!({
        "days{^Product.carriers.0}": {
            "@root": "@path",
            "@path": "services",
            "^name name": "days"
        }
    }));
    assert_eq!(
        result,
        json!({
            "days": {
                "FedEx Next Day": "1",
                "FedEx Two Day": "2",
                "FedEx Three Day": "3"
            }
        })
    );
}

#[test]
fn test_root_key() {
    let result = apply(json!({
        "@root": "Product.shipping.options",
        "cheapestShippingCost": "^economy.cost",
        "expeditedShippingCosts": {
            "'nextDay'": "^nextDay.cost"
        },
        "revert": {
            "@root": "@path",
            "@path": "Product",
            "'title'": "^Product.title"
        }
    }));

    assert_eq!(
        result,
        json!({
            "cheapestShippingCost": "0.00",
            "expeditedShippingCosts": { "nextDay": "45.00" },
            "revert": { "title": "ACME super soaker" }
        })
    );
}

#[test]
fn test_scalar_path_iterates_once() {
    let result = apply(json!({ "@path": "Product.title", "x": "'literal'" }));
    assert_eq!(result, json!({ "x": "literal" }));
}

// ============================================================================
// Brackets and escapes
// ============================================================================

#[test]
fn test_bracket_scope_modifiers() {
    let result = apply(json!({
        "filter1": "[Product.variants.0]color",
        "filter2[Product.variants.0]": "color",
        "filter3": "[Product.variants.0]color [Product.variants.1]color",
        "filter4": { "Product.title[Product.variants.0]": "color" }
    }));

    assert_eq!(
        result,
        json!({
            "filter1": "red",
            "filter2": "red",
            "filter3": "red blue",
            "filter4": { "ACME super soaker": "red" }
        })
    );
}

#[test]
fn test_escape_delimiters() {
    let result = apply(json!({
        "filter1": "{{'red' | uppercase}}{{'blue' | lowercase}}",
        "filter2": "{{{{{{'red'}} | uppercase}}{{'blue' | lowercase}}}}",
        "filter3": "{{[Product.variants.0]color | uppercase}}{{[Product.variants.1]color | lowercase}}",
        "filter4": {
            "@path": "Product.shipping.options",
            "tags": "{{^Product.tags}}"
        }
    }));

    assert_eq!(
        result,
        json!({
            "filter1": "REDblue",
            "filter2": "REDblue",
            "filter3": "REDblue",
            "filter4": { "tags": "Mens,Shirt,Casual" }
        })
    );
}

// ============================================================================
// Array templates and shapes
// ============================================================================

#[test]
fn test_array_templates_under_array_keys() {
    let result = apply(json!({
        "filter1[Product.variants]": ["color"],
        "filter2[Product.variants]": [{ "'color'": "color" }],
        "filter3[Product.variants]": [["color"]],
        "filter4[Product.variants]": ["color", { "'color'": "color" }, ["color"]]
    }));

    assert_eq!(result["filter1"], json!(["red", "blue", "green"]));
    assert_eq!(
        result["filter2"],
        json!([{ "color": "red" }, { "color": "blue" }, { "color": "green" }])
    );
    assert_eq!(result["filter3"], json!([["red"], ["blue"], ["green"]]));
    assert_eq!(
        result["filter4"],
        json!([
            "red", { "color": "red" }, ["red"],
            "blue", { "color": "blue" }, ["blue"],
            "green", { "color": "green" }, ["green"]
        ])
    );
}

#[test]
fn test_object_suffix_keeps_last_write() {
    let result = apply(json!({
        "last{Product.variants}": { "'color'": "color" }
    }));
    assert_eq!(result, json!({ "last": { "color": "green" } }));
}

#[test]
fn test_arrays_accumulate_across_iterations() {
    let result = apply(json!({
        "@path": "Product.variants",
        "colors": "color | array",
        "last": "color"
    }));
    assert_eq!(
        result,
        json!({ "colors": ["red", "blue", "green"], "last": "green" })
    );
}

// ============================================================================
// Pruning and leaves
// ============================================================================

#[test]
fn test_absent_and_empty_values_are_pruned() {
    let result = apply(json!({
        "missing": "does.not.exist",
        "emptyArray": "does.not.exist | array",
        "emptyObject": { "x": "does.not.exist" },
        "none[Product.variants]": { "x": "does.not.exist" },
        "kept": "'x'"
    }));
    assert_eq!(result, json!({ "kept": "x" }));
}

#[test]
fn test_non_string_leaves_are_copied() {
    let result = apply(json!({ "n": 5, "f": 1.5, "b": true, "z": null }));
    assert_eq!(result, json!({ "n": 5, "f": 1.5, "b": true, "z": null }));
}

#[test]
fn test_top_level_templates() {
    assert_eq!(apply(json!("Product.title")), json!("ACME super soaker"));
    assert_eq!(apply(json!("does.not.exist")), json!(null));
    assert_eq!(
        apply(json!(["Product.title", "does.not.exist", "'x'"])),
        json!(["ACME super soaker", "x"])
    );
    assert_eq!(apply(json!(7)), json!(7));
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_outputs_are_copies() {
    let mut result = apply(json!({
        "filter1": "Product.shipping",
        "filter2": "Product.shipping"
    }));
    assert_eq!(result["filter1"], result["filter2"]);

    result["filter1"]["options"] = json!("No Options Available");
    assert_ne!(result["filter1"], result["filter2"]);
    assert_eq!(result["filter2"], product_scope()["Product"]["shipping"]);
}

#[test]
fn test_transform_leaves_scope_untouched() {
    let input = scope();
    let template = Value::from(json!({
        "@path": "Product.variants",
        "colors": "color | array",
        "v": "Product.variants | set('0', 'x')"
    }));
    evaluator().transform(&input, &template).unwrap();
    assert_eq!(input, scope());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_filter_aborts_the_transform() {
    let template = Value::from(json!({ "a": { "b": "'x' | nope" }, "c": "'fine'" }));
    let err = evaluator().transform(&scope(), &template).unwrap_err();
    assert_eq!(err, TransmuteError::UnknownFilter("nope".to_string()));

    let template = Value::from(json!({ "'k' | shout": "'v'" }));
    let err = evaluator().transform(&scope(), &template).unwrap_err();
    assert_eq!(err, TransmuteError::UnknownFilter("shout".to_string()));
}

#[test]
fn test_library_entry_points() {
    let output = transmute::transform_json(
        json!({ "title": "ACME super soaker" }),
        json!({ "name": "title | uppercase" }),
    )
    .unwrap();
    assert_eq!(output, json!({ "name": "ACME SUPER SOAKER" }));

    let output = transmute::transform(&Value::from("x"), &Value::from("get()")).unwrap();
    assert_eq!(output, Value::from("x"));
}
