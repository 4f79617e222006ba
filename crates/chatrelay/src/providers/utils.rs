use serde_json::Value;

/// Pull the reply text out of an upstream response body.
///
/// Upstreams disagree on shape: the first truthy `response` or `text` field
/// wins, any other JSON is returned serialized, and a body that is not JSON
/// at all is returned verbatim.
pub fn extract_reply(body: &str) -> String {
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(_) => return body.to_string(),
    };

    ["response", "text"]
        .iter()
        .filter_map(|field| data.get(field))
        .find(|value| is_truthy(value))
        .map(value_to_text)
        .unwrap_or_else(|| data.to_string())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
