use serde_json::{Map, Value};
use std::io;

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                if let Some(Value::Object(comparison)) = result.get("comparison") {
                    write_comparison_csv(&mut wtr, comparison);
                } else {
                    write_field_value_csv(&mut wtr, result);
                }
            }
            Some(Value::Array(points)) => write_array_csv(&mut wtr, points),
            _ => write_field_value_csv(&mut wtr, map),
        },
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Two-column CSV: field, value
fn write_field_value_csv(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

/// metric, one column per offer, then delta when present.
fn write_comparison_csv(wtr: &mut StdoutWriter<'_>, comparison: &Map<String, Value>) {
    let mut header = vec!["metric".to_string()];
    if let Some(Value::Array(names)) = comparison.get("offer_names") {
        header.extend(names.iter().map(format_csv_value));
    }
    let rows = match comparison.get("rows") {
        Some(Value::Array(rows)) => rows.as_slice(),
        _ => &[],
    };
    let has_delta = rows
        .iter()
        .any(|row| row.get("delta").is_some_and(|d| !d.is_null()));
    if has_delta {
        header.push("delta".to_string());
    }
    let _ = wtr.write_record(&header);

    for row in rows {
        let mut record = vec![row.get("metric").map(format_csv_value).unwrap_or_default()];
        if let Some(Value::Array(values)) = row.get("values") {
            record.extend(values.iter().map(format_csv_value));
        }
        if has_delta {
            record.push(row.get("delta").map(format_csv_value).unwrap_or_default());
        }
        let _ = wtr.write_record(&record);
    }
}

/// Flatten nested objects one level deep into `outer.inner` columns, so
/// sensitivity points become one row per exit price.
fn flatten_row(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut cells = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (inner_key, inner_val) in inner {
                    match inner_val {
                        Value::Object(leaf) => {
                            for (leaf_key, leaf_val) in leaf {
                                cells.push((
                                    format!("{inner_key}.{leaf_key}"),
                                    format_csv_value(leaf_val),
                                ));
                            }
                        }
                        _ => cells.push((format!("{key}.{inner_key}"), format_csv_value(inner_val))),
                    }
                }
            }
            _ => cells.push((key.clone(), format_csv_value(val))),
        }
    }
    cells
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = flatten_row(first).into_iter().map(|(k, _)| k).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let cells = flatten_row(map);
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        cells
                            .iter()
                            .find(|(k, _)| k == h)
                            .map(|(_, v)| v.clone())
                            .unwrap_or_default()
                    })
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sensitivity_point_flattens_per_offer() {
        let point = json!({
            "exit_price": "75",
            "results": {
                "offer-1": { "net_return": "-25000", "net_moic": "0.75", "net_irr": null }
            }
        });
        let cells = flatten_row(point.as_object().unwrap());
        let keys: Vec<&str> = cells.iter().map(|(k, _)| k.as_str()).collect();
        // serde_json maps iterate in key order
        assert_eq!(
            keys,
            vec!["exit_price", "offer-1.net_irr", "offer-1.net_moic", "offer-1.net_return"]
        );
        assert_eq!(cells[1].1, "");
        assert_eq!(cells[3].1, "-25000");
    }

    #[test]
    fn test_single_level_nesting() {
        let row = json!({ "carry": { "rate": "0.2" }, "name": "Fund A" });
        let cells = flatten_row(row.as_object().unwrap());
        assert_eq!(cells[0], ("carry.rate".to_string(), "0.2".to_string()));
        assert_eq!(cells[1], ("name".to_string(), "Fund A".to_string()));
    }
}
