use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw JSON record from the API.
///
/// Endpoint payloads are loosely shaped and vary by district
/// configuration, so records stay dynamic: a field map plus typed
/// accessors for the handful of fields this crate itself touches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    pub fn new() -> Self {
        Default::default()
    }

    /// Raw field access.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: Value) -> Option<Value> {
        self.0.insert(field.to_string(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field as a string slice.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Field as an integer. The API sends ids both as numbers and as
    /// strings depending on the endpoint.
    pub fn id_field(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Number(number) => number.as_i64(),
            Value::String(raw) => raw.parse().ok(),
            _ => None,
        }
    }

    /// `recipient_ids` arrives as a comma-separated string of user ids.
    /// `None` when the field is absent, non-string, or not all-numeric.
    pub fn recipient_ids(&self) -> Option<Vec<i64>> {
        self.str_field("recipient_ids")?
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(fields: Map<String, Value>) -> Self {
        Resource(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(value: Value) -> Resource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn str_and_id_accessors() {
        let record = resource(json!({
            "name_display": "Ada Lovelace",
            "uid": "12345",
            "id": 67890,
            "active": true,
        }));
        assert_eq!(record.str_field("name_display"), Some("Ada Lovelace"));
        assert_eq!(record.id_field("uid"), Some(12345));
        assert_eq!(record.id_field("id"), Some(67890));
        assert_eq!(record.id_field("active"), None);
        assert_eq!(record.str_field("missing"), None);
    }

    #[test]
    fn recipient_ids_parses_comma_separated_string() {
        let record = resource(json!({ "recipient_ids": "123,456" }));
        assert_eq!(record.recipient_ids(), Some(vec![123, 456]));
    }

    #[test]
    fn recipient_ids_tolerates_spaces_and_rejects_junk() {
        assert_eq!(
            resource(json!({ "recipient_ids": " 7 , 8 " })).recipient_ids(),
            Some(vec![7, 8])
        );
        assert_eq!(
            resource(json!({ "recipient_ids": "7,x" })).recipient_ids(),
            None
        );
        assert_eq!(resource(json!({})).recipient_ids(), None);
    }
}
