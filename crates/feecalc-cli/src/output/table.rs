use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            if let Some(Value::Object(comparison)) = res_map.get("comparison") {
                print_comparison(comparison);
            } else {
                print_flat_object(result);
            }
        }
        Value::Array(points) if is_sensitivity(points) => print_sensitivity(points),
        Value::Array(arr) => print_array_table(arr),
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Metric × offer grid. The best cell per metric is starred; a delta column
/// appears when exactly two offers are compared.
fn print_comparison(comparison: &Map<String, Value>) {
    let names: Vec<String> = string_list(comparison.get("offer_names"));
    let rows = match comparison.get("rows") {
        Some(Value::Array(rows)) => rows,
        _ => return,
    };
    let has_delta = rows
        .iter()
        .any(|row| row.get("delta").is_some_and(|d| !d.is_null()));

    let mut builder = Builder::default();
    let mut header = vec!["Metric".to_string()];
    header.extend(names.iter().cloned());
    if has_delta {
        header.push("Delta".to_string());
    }
    builder.push_record(header);

    for row in rows {
        let best = row.get("best_index").and_then(Value::as_u64);
        let mut record = vec![row
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()];
        for (i, cell) in string_list(row.get("display")).into_iter().enumerate() {
            if best == Some(i as u64) {
                record.push(format!("{cell} *"));
            } else {
                record.push(cell);
            }
        }
        if has_delta {
            record.push(
                row.get("delta")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            );
        }
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
    println!("* best offer for the metric");
}

fn is_sensitivity(points: &[Value]) -> bool {
    points
        .first()
        .is_some_and(|p| p.get("exit_price").is_some() && p.get("results").is_some())
}

/// One row per exit price, net return and net MOIC per offer.
fn print_sensitivity(points: &[Value]) {
    let offer_ids: Vec<String> = points
        .first()
        .and_then(|p| p.get("results"))
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();

    let mut builder = Builder::default();
    let mut header = vec!["exit_price".to_string()];
    for id in &offer_ids {
        header.push(format!("{id} net_return"));
        header.push(format!("{id} net_moic"));
    }
    builder.push_record(header);

    for point in points {
        let mut record = vec![point.get("exit_price").map(format_value).unwrap_or_default()];
        for id in &offer_ids {
            let reduced = point.get("results").and_then(|r| r.get(id));
            for key in ["net_return", "net_moic"] {
                record.push(
                    reduced
                        .and_then(|r| r.get(key))
                        .map(format_value)
                        .unwrap_or_default(),
                );
            }
        }
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            match val {
                // One level of nesting reads better as dotted keys
                Value::Object(inner) => {
                    for (inner_key, inner_val) in inner {
                        builder.push_record([format!("{key}.{inner_key}"), format_value(inner_val)]);
                    }
                }
                _ => {
                    builder.push_record([key.clone(), format_value(val)]);
                }
            }
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(format_value).collect(),
        _ => Vec::new(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sensitivity_detection() {
        let points = vec![json!({ "exit_price": "75", "results": {} })];
        assert!(is_sensitivity(&points));
        assert!(!is_sensitivity(&[json!({ "field": 1 })]));
        assert!(!is_sensitivity(&[]));
    }

    #[test]
    fn test_string_list() {
        let v = json!(["$100,000", "3.00x", null]);
        assert_eq!(string_list(Some(&v)), vec!["$100,000", "3.00x", "null"]);
        assert!(string_list(None).is_empty());
    }
}
