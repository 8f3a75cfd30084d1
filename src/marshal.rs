//! Key/value codec seam for the map layer
//!
//! Values stored in Redis are strings; a [`Marshaler`] converts between
//! domain types and their stored representation. JSON is the default.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts values to and from the string representation stored in Redis.
pub trait Marshaler<T>: Send + Sync {
    /// Encode a value into its stored string form.
    fn marshal(&self, value: &T) -> Result<String>;

    /// Decode a value from its stored string form.
    fn unmarshal(&self, raw: &str) -> Result<T>;
}

/// JSON codec for any serde-compatible type. The default marshaler.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMarshaler;

impl<T> Marshaler<T> for JsonMarshaler
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn unmarshal(&self, raw: &str) -> Result<T> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[test]
    fn marshals_structs_as_json() {
        let marshaler = JsonMarshaler;
        let payload = Payload {
            name: "worker-a".to_string(),
            count: 3,
        };

        let raw = marshaler.marshal(&payload).unwrap();
        assert_eq!(raw, r#"{"name":"worker-a","count":3}"#);

        let decoded: Payload = marshaler.unmarshal(&raw).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn marshals_scalars() {
        let marshaler = JsonMarshaler;
        assert_eq!(marshaler.marshal(&42u64).unwrap(), "42");
        assert_eq!(marshaler.marshal(&"key".to_string()).unwrap(), r#""key""#);
    }

    #[test]
    fn unmarshal_rejects_malformed_input() {
        let marshaler = JsonMarshaler;
        let err = Marshaler::<Payload>::unmarshal(&marshaler, "{not json").unwrap_err();
        assert!(matches!(err, Error::Marshal { .. }));
    }
}
