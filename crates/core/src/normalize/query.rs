//! Query response flattening

use mixpanel_domain::constants::PAGINATION_FIELDS;
use mixpanel_domain::Record;
use serde_json::Value;

const RESULTS_FIELD: &str = "results";

/// Normalize a query or management response into output items.
///
/// Arrays yield one item per element. A paginated collection (an object with
/// a `results` array and at least one pagination field) yields one item per
/// result with the pagination fields copied onto it; fields already present
/// on a result are left alone. Any other object is a single item, and bare
/// scalars are wrapped as `{"value": ...}`.
pub fn normalize_query(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(map) if is_paginated(&map) => flatten_paginated(map),
        Value::Object(_) => vec![body],
        Value::Null => Vec::new(),
        scalar => {
            let mut item = Record::new();
            item.insert("value".into(), scalar);
            vec![Value::Object(item)]
        }
    }
}

fn is_paginated(map: &Record) -> bool {
    map.get(RESULTS_FIELD).is_some_and(Value::is_array)
        && PAGINATION_FIELDS.iter().any(|field| map.contains_key(*field))
}

fn flatten_paginated(mut map: Record) -> Vec<Value> {
    let results = match map.remove(RESULTS_FIELD) {
        Some(Value::Array(results)) => results,
        _ => return Vec::new(),
    };
    let meta: Vec<(&str, Value)> = PAGINATION_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).map(|value| (*field, value.clone())))
        .collect();

    results
        .into_iter()
        .map(|result| {
            let mut item = match result {
                Value::Object(item) => item,
                other => {
                    let mut item = Record::new();
                    item.insert("value".into(), other);
                    item
                }
            };
            for (field, value) in &meta {
                item.entry((*field).to_string()).or_insert_with(|| value.clone());
            }
            Value::Object(item)
        })
        .collect()
}
