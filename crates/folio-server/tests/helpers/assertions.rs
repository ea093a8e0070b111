//! Custom assertions para tests.

use serde_json::Value;

/// Verifica que una respuesta de error tenga el formato `{error, message}`.
pub fn assert_error_body(json: &Value, error: &str) {
    assert!(json.is_object(), "Error response should be a JSON object");
    assert_eq!(json["error"], error, "Unexpected error kind: {json}");
    assert!(
        json["message"].as_str().is_some_and(|m| !m.is_empty()),
        "Error response missing 'message': {json}"
    );
}

/// Retorna los valores de `field` de un array JSON, en orden.
pub fn field_values<'a>(json: &'a Value, field: &str) -> Vec<&'a str> {
    json.as_array()
        .expect("Response should be a JSON array")
        .iter()
        .map(|item| item[field].as_str().unwrap_or_default())
        .collect()
}

/// Extrae el JSON del campo `data:` de un evento SSE.
pub fn sse_data(chunk: &str) -> Value {
    let data: String = chunk
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect();
    serde_json::from_str(&data).expect("SSE data is not JSON")
}

/// Retorna el nombre del evento SSE.
pub fn sse_event(chunk: &str) -> Option<&str> {
    chunk
        .lines()
        .find_map(|line| line.strip_prefix("event:"))
        .map(str::trim)
}
