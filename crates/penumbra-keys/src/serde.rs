use base64_serde::base64_serde_type;

base64_serde_type!(pub(crate) Base64Standard, base64::engine::general_purpose::STANDARD);

/// Serde of [`bytes::Bytes`] fields as standard base64 strings.
pub(crate) mod base64_bytes {
    use bytes::Bytes;
    use serde::{
        Deserializer,
        Serializer,
    };

    use super::Base64Standard;

    pub(crate) fn serialize<S>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Base64Standard::serialize(value, serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Base64Standard::deserialize(deserializer)?;
        Ok(bytes.into())
    }
}
