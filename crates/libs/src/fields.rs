use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a custom field list, e.g. `{"id": 360001, "value": "Tokyo"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub value: Value,
}

/// Flattens `[{id, value}, ...]` into `{id: value, ...}`.
///
/// A repeated id keeps the last value seen.
pub fn fields_to_map<I>(fields: I) -> HashMap<String, Value>
where
    I: IntoIterator<Item = Field>,
{
    fields.into_iter().map(|f| (f.id, f.value)).collect()
}

// Field ids arrive as numbers from some sources and as strings from others.
fn id_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "field id must be a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shapes_list_into_map() {
        let fields: Vec<Field> = serde_json::from_value(json!([
            {"id": "tz", "value": "Tokyo"},
            {"id": 42, "value": true},
            {"id": "empty", "value": null},
        ]))
        .unwrap();

        let map = fields_to_map(fields);
        assert_eq!(map.len(), 3);
        assert_eq!(map["tz"], json!("Tokyo"));
        assert_eq!(map["42"], json!(true));
        assert_eq!(map["empty"], Value::Null);
    }

    #[test]
    fn last_duplicate_wins() {
        let map = fields_to_map(vec![
            Field { id: "a".into(), value: json!(1) },
            Field { id: "a".into(), value: json!(2) },
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], json!(2));
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(fields_to_map(Vec::new()).is_empty());
    }

    #[test]
    fn rejects_object_ids() {
        let res: Result<Field, _> = serde_json::from_value(json!({"id": {"x": 1}, "value": 1}));
        assert!(res.is_err());
    }
}
