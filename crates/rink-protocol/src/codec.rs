//! Codec seam between typed frames and raw transport bytes.
//!
//! The engine doesn't care how frames become bytes — it goes through
//! the [`Codec`] trait so the encoding can be swapped without touching
//! the engine, transport, or registries. The shipped implementation is
//! [`ProstCodec`] (length-free binary; the transport's message framing
//! supplies the boundaries).

use prost::Message;

use crate::ProtocolError;

/// Encodes and decodes wire frames.
///
/// `Send + Sync + 'static` because the codec is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a frame into bytes.
    fn encode<M: Message>(&self, value: &M) -> Vec<u8>;

    /// Deserializes bytes back into a frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// truncated. Fields with unknown tags are skipped, which is what
    /// makes the schema evolvable.
    fn decode<M: Message + Default>(
        &self,
        data: &[u8],
    ) -> Result<M, ProtocolError>;
}

/// A [`Codec`] backed by prost's binary encoding.
///
/// Encoding into a growable buffer cannot fail, so `encode` returns
/// the bytes directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProstCodec;

impl Codec for ProstCodec {
    fn encode<M: Message>(&self, value: &M) -> Vec<u8> {
        value.encode_to_vec()
    }

    fn decode<M: Message + Default>(
        &self,
        data: &[u8],
    ) -> Result<M, ProtocolError> {
        M::decode(data).map_err(ProtocolError::Decode)
    }
}
