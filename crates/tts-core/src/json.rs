pub use serde_json::Value as JsonValue;

/// Insertion-ordered because `serde_json` is built with `preserve_order`;
/// state-variant and tab ordering in the source document is significant.
pub type JsonDict = serde_json::Map<String, JsonValue>;

pub fn dict_get_str<'a>(dict: &'a JsonDict, key: &str) -> Option<&'a str> {
    dict.get(key).and_then(JsonValue::as_str)
}

pub fn dict_get_dict<'a>(dict: &'a JsonDict, key: &str) -> Option<&'a JsonDict> {
    dict.get(key).and_then(JsonValue::as_object)
}

pub fn dict_get_array<'a>(dict: &'a JsonDict, key: &str) -> Option<&'a Vec<JsonValue>> {
    dict.get(key).and_then(JsonValue::as_array)
}
