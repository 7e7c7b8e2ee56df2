//! Codec trait and the JSON implementation.
//!
//! The dispatcher is written against the [`Codec`] trait, not a
//! concrete format. JSON is the wire format the clients speak; a
//! binary codec could be slotted in without touching anything above
//! this layer.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, ServerEvent};

    #[test]
    fn test_json_codec_round_trips_client_event() {
        let codec = JsonCodec;
        let event = ClientEvent::SetUsername {
            username: "alice".into(),
        };
        let bytes = codec.encode(&event).unwrap();
        let back: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_error() {
        let codec = JsonCodec;
        let result: Result<ServerEvent, _> =
            codec.decode(b"not json at all");
        assert!(result.is_err());
    }

    #[test]
    fn test_json_codec_decode_wrong_shape_returns_error() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> =
            codec.decode(br#"{"name":"hello"}"#);
        assert!(result.is_err());
    }
}
