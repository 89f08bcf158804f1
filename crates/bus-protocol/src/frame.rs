//! Byte-level frame codec
//!
//! Frames are delimited by a fixed header and tail sentinel:
//!
//! ```text
//! 7E [msg_id] [payload...] 7F
//! ```
//!
//! [`encode`] is total over any payload. [`decode`] checks only the frame
//! shape and the message id; payload length is validated by
//! [`Message::parse`](crate::Message::parse).

use crate::error::DecodeError;
use crate::{MessageKind, ProtocolCodec};

/// Frame header sentinel
pub const HEADER: u8 = 0x7E;
/// Frame tail sentinel
pub const TAIL: u8 = 0x7F;
/// Header + message id + tail
pub const MIN_FRAME_LEN: usize = 3;

/// Longest frame the streaming codec waits for before giving up on a header
const MAX_FRAME_LEN: usize = 64;

/// Encode a message kind and payload into a complete frame
///
/// The result is always `3 + payload.len()` bytes long. Payload bytes equal
/// to [`HEADER`] or [`TAIL`] are not escaped.
pub fn encode(kind: MessageKind, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(MIN_FRAME_LEN + payload.len());
    frame.push(HEADER);
    frame.push(kind.as_byte());
    frame.extend_from_slice(payload);
    frame.push(TAIL);
    frame
}

/// A frame whose message id has not been interpreted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Message id byte
    pub id: u8,
    /// Bytes between the message id and the tail
    pub payload: Vec<u8>,
}

impl RawFrame {
    /// Interpret the id byte as a [`MessageKind`]
    pub fn kind(&self) -> Result<MessageKind, DecodeError> {
        MessageKind::try_from(self.id)
    }
}

/// Decode a frame without interpreting the message id
pub fn decode_raw(bytes: &[u8]) -> Result<RawFrame, DecodeError> {
    if bytes.len() < MIN_FRAME_LEN {
        return Err(DecodeError::MalformedFrame("frame too short"));
    }
    if bytes[0] != HEADER {
        return Err(DecodeError::MalformedFrame("missing header"));
    }
    if bytes[bytes.len() - 1] != TAIL {
        return Err(DecodeError::MalformedFrame("missing tail"));
    }

    Ok(RawFrame {
        id: bytes[1],
        payload: bytes[2..bytes.len() - 1].to_vec(),
    })
}

/// Decode a complete frame into its message kind and payload
///
/// Shape failures are reported as [`DecodeError::MalformedFrame`] before the
/// message id is looked at.
pub fn decode(bytes: &[u8]) -> Result<(MessageKind, Vec<u8>), DecodeError> {
    let raw = decode_raw(bytes)?;
    let kind = raw.kind()?;
    Ok((kind, raw.payload))
}

/// Streaming frame codec
///
/// Bytes ahead of a header are discarded. A frame ends at the first tail
/// after its header, so a payload containing `0x7F` is cut short.
pub struct FrameCodec {
    buffer: Vec<u8>,
}

impl FrameCodec {
    /// Create a new frame codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Number of bytes waiting for a complete frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for FrameCodec {
    type Command = RawFrame;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn next_command(&mut self) -> Option<Self::Command> {
        self.next_command_with_bytes().map(|(frame, _)| frame)
    }

    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)> {
        loop {
            let Some(header_pos) = self.buffer.iter().position(|&b| b == HEADER) else {
                self.buffer.clear();
                return None;
            };

            // Discard noise before the header
            if header_pos > 0 {
                self.buffer.drain(..header_pos);
            }

            let tail_pos = self
                .buffer
                .iter()
                .take(MAX_FRAME_LEN)
                .position(|&b| b == TAIL);

            let Some(tail_pos) = tail_pos else {
                if self.buffer.len() >= MAX_FRAME_LEN {
                    tracing::warn!("No tail within {} bytes, resyncing", MAX_FRAME_LEN);
                    self.buffer.drain(..1);
                    continue;
                }
                // Partial frame, wait for more bytes
                return None;
            };

            let bytes: Vec<u8> = self.buffer.drain(..=tail_pos).collect();
            match decode_raw(&bytes) {
                Ok(frame) => return Some((frame, bytes)),
                Err(e) => tracing::warn!("Dropping frame {:02X?}: {}", bytes, e),
            }
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
