//! Error types for bus frame decoding and message parsing

use thiserror::Error;

use crate::MessageKind;

/// Errors that can occur while decoding a frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame shape is wrong: too short, bad header or bad tail
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// Message id is outside the closed set of known kinds
    #[error("unknown message kind: 0x{0:02X}")]
    UnknownMessageKind(u8),
}

/// Errors that can occur while interpreting a frame's payload
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Frame-level failure
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Payload is shorter than the message kind requires
    #[error("{kind:?} payload too short: need {needed} bytes, got {actual}")]
    PayloadTooShort {
        kind: MessageKind,
        needed: usize,
        actual: usize,
    },

    /// Status payload carries a state code outside Idle/Moving/Error
    #[error("unknown device status: {0}")]
    UnknownDeviceStatus(u8),
}
