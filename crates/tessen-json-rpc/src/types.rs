use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifying ID of a JSON-RPC message.
///
/// A string or a number identifies a request that expects a reply; `Null`
/// signals a notification. The empty string and zero are valid request ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    String(String),
    Number(i64),
    Null,
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::String(s) => write!(f, "{}", s),
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::Null => write!(f, "null"),
        }
    }
}

impl Default for MessageId {
    fn default() -> Self {
        MessageId::Null
    }
}

impl From<i64> for MessageId {
    fn from(n: i64) -> Self {
        MessageId::Number(n)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId::String(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId::String(s)
    }
}

impl MessageId {
    /// True when this id marks a notification (no reply expected).
    pub fn is_null(&self) -> bool {
        matches!(self, MessageId::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MessageId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MessageId::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The id as a wire value (`null` for notifications).
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            MessageId::String(s) => serde_json::Value::String(s.clone()),
            MessageId::Number(n) => serde_json::Value::Number((*n).into()),
            MessageId::Null => serde_json::Value::Null,
        }
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonRpcVersion {
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => "2.0",
        }
    }
}

impl Default for JsonRpcVersion {
    fn default() -> Self {
        JsonRpcVersion::V2_0
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "2.0" => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_serialization() {
        let id_str = MessageId::String("test".to_string());
        let id_num = MessageId::Number(42);
        let id_null = MessageId::Null;

        assert_eq!(serde_json::to_string(&id_str).unwrap(), r#""test""#);
        assert_eq!(serde_json::to_string(&id_num).unwrap(), "42");
        assert_eq!(serde_json::to_string(&id_null).unwrap(), "null");
    }

    #[test]
    fn test_message_id_deserialization() {
        let id: MessageId = serde_json::from_str("null").unwrap();
        assert!(id.is_null());

        let id: MessageId = serde_json::from_str("0").unwrap();
        assert_eq!(id, MessageId::Number(0));
        assert!(!id.is_null());

        let id: MessageId = serde_json::from_str(r#""""#).unwrap();
        assert_eq!(id, MessageId::String(String::new()));
        assert!(!id.is_null());
    }

    #[test]
    fn test_json_rpc_version() {
        let version = JsonRpcVersion::V2_0;
        assert_eq!(version.as_str(), "2.0");
        assert_eq!(serde_json::to_string(&version).unwrap(), r#""2.0""#);
    }
}
