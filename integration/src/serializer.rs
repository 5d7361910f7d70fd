use serde::de::Error as _;
use serde_json::{Map, Value};

/// Converts cache payloads to and from bytes.
pub trait Serializer: Send + Sync {
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, serde_json::Error>;
    /// Payloads are always maps at the top level.
    fn deserialize(&self, data: &[u8]) -> Result<Map<String, Value>, serde_json::Error>;
}

pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(value)
    }

    fn deserialize(&self, data: &[u8]) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::from_slice(data)? {
            Value::Object(map) => Ok(map),
            _ => Err(serde_json::Error::custom("expected a map")),
        }
    }
}
