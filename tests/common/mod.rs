#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use serde_json::json;
use transmute::{Evaluator, FixedClock, Value};

/// Storefront product used across the test suites.
pub fn product_scope() -> serde_json::Value {
    json!({
        "Product": {
            "title": "ACME super soaker",
            "price": "25.00",
            "tags": "Mens,Shirt,Casual",
            "discount": "8.00",
            "special": "text.with.special.characters",
            "weight": { "value": null },
            "variants": [
                { "color": "red", "stock": "5" },
                { "color": "blue", "stock": "3" },
                { "color": "green", "stock": "0" }
            ],
            "shipping": {
                "options": {
                    "nextDay": { "name": "Next Day Air", "cost": "45.00" },
                    "secondDay": { "name": "Second Day Air", "cost": "30.00" },
                    "economy": { "name": "Free Economy Shipping", "cost": "0.00" }
                }
            },
            "carriers": [
                {
                    "name": "FedEx",
                    "services": [
                        { "name": "Next Day", "days": "1" },
                        { "name": "Two Day", "days": "2" },
                        { "name": "Three Day", "days": "3" }
                    ]
                },
                {
                    "name": "UPS",
                    "services": [{ "name": "Ground", "days": "5" }]
                }
            ]
        },
        "EmbeddedJSON": "{\"product\":\"test\"}"
    })
}

pub fn scope() -> Value {
    Value::from(product_scope())
}

/// Evaluator whose clock is stopped at 2017-04-11T12:30:00Z.
pub fn evaluator() -> Evaluator {
    let instant = Utc.with_ymd_and_hms(2017, 4, 11, 12, 30, 0).unwrap();
    Evaluator::new().with_clock(FixedClock(instant))
}

/// Resolve a value expression against the product scope.
pub fn eval(expr: &str) -> Option<serde_json::Value> {
    evaluator()
        .evaluate(expr, &scope())
        .unwrap()
        .map(serde_json::Value::from)
}

/// Apply a template to the product scope.
pub fn apply(template: serde_json::Value) -> serde_json::Value {
    evaluator()
        .transform(&scope(), &Value::from(template))
        .unwrap()
        .into()
}
