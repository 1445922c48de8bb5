//! Codec trait and implementations for framing room messages.
//!
//! A codec turns [`ClientMessage`](crate::ClientMessage)s,
//! [`ServerMessage`](crate::ServerMessage)s and room snapshots into bytes
//! and back. The room itself only handles typed values; the codec is used
//! at the edge, where frames enter and leave a client connection.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to frames and decodes frames back to values.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or does
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Browser clients speak JSON natively, and frames stay readable in
/// DevTools and logs.
///
/// ```rust
/// use arena_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame = br#"{"type":"shoot","data":{"x":1.5,"dir":"n"}}"#;
/// let msg: ClientMessage = codec.decode(frame).unwrap();
/// assert_eq!(msg, ClientMessage::Shoot(serde_json::json!({"x": 1.5, "dir": "n"})));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
