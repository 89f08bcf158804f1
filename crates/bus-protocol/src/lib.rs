//! Seat Controller Bus Protocol Library
//!
//! This crate provides encoding and decoding for the point-to-point serial
//! bus spoken between a seat controller ECU and a host-side sniffer.
//!
//! # Frame Format
//! ```text
//! 7E [msg_id] [payload...] 7F
//! ```
//!
//! - `7E`: Header sentinel
//! - `msg_id`: One byte selecting the [`MessageKind`]
//! - `payload`: Variable length, meaning depends on the message kind
//! - `7F`: Tail sentinel
//!
//! There is no length field, no checksum and no escaping. A payload byte
//! equal to a sentinel value is sent as-is.
//!
//! # Architecture
//!
//! - [`frame`]: the byte-level codec (`encode`, `decode`) and a streaming
//!   [`FrameCodec`] that pulls frames out of a noisy byte stream
//! - [`message`]: typed payloads layered on top of raw frames
//!
//! # Example
//!
//! ```rust
//! use bus_protocol::{decode, encode, MessageKind};
//!
//! let frame = encode(MessageKind::Status, &[1, 0, 0, 0]);
//! assert_eq!(frame, vec![0x7E, 0x20, 0x01, 0x00, 0x00, 0x00, 0x7F]);
//!
//! let (kind, payload) = decode(&frame).unwrap();
//! assert_eq!(kind, MessageKind::Status);
//! assert_eq!(payload, vec![1, 0, 0, 0]);
//! ```

pub mod error;
pub mod frame;
pub mod message;

pub use error::{DecodeError, ParseError};
pub use frame::{decode, decode_raw, encode, FrameCodec, RawFrame, HEADER, MIN_FRAME_LEN, TAIL};
pub use message::{
    AlivePayload, ControlRequestPayload, DeviceStatus, Message, StatusPayload,
};

/// Message identifier carried in the second byte of every frame
///
/// The set is closed; ids outside it are rejected by [`MessageKind::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageKind {
    /// Periodic liveness announcement (timestamp + counter)
    Alive = 0x10,
    /// Seat position request from the host
    ControlRequest = 0x14,
    /// Device state report
    Status = 0x20,
    /// Positive acknowledgment of a host command
    Ack = 0x30,
    /// Negative acknowledgment of a host command
    Nack = 0x31,
}

impl MessageKind {
    /// All message kinds, in id order
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Alive,
        MessageKind::ControlRequest,
        MessageKind::Status,
        MessageKind::Ack,
        MessageKind::Nack,
    ];

    /// Wire value of this message kind
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns a human-readable name for the message kind
    pub fn name(&self) -> &'static str {
        match self {
            MessageKind::Alive => "Alive",
            MessageKind::ControlRequest => "ControlReq",
            MessageKind::Status => "Status",
            MessageKind::Ack => "ACK",
            MessageKind::Nack => "NACK",
        }
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x10 => Ok(Self::Alive),
            0x14 => Ok(Self::ControlRequest),
            0x20 => Ok(Self::Status),
            0x30 => Ok(Self::Ack),
            0x31 => Ok(Self::Nack),
            _ => Err(DecodeError::UnknownMessageKind(value)),
        }
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> u8 {
        kind.as_byte()
    }
}

/// Trait for codecs that pull complete frames out of an incoming byte stream
pub trait ProtocolCodec {
    /// The command type produced by this codec
    type Command;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete command from the buffer
    fn next_command(&mut self) -> Option<Self::Command>;

    /// Try to extract the next complete command along with its raw bytes
    ///
    /// Useful for traffic monitoring where the exact bytes that were parsed
    /// should be shown next to the decoded command.
    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind_wire_values() {
        assert_eq!(MessageKind::Alive.as_byte(), 0x10);
        assert_eq!(MessageKind::ControlRequest.as_byte(), 0x14);
        assert_eq!(MessageKind::Status.as_byte(), 0x20);
        assert_eq!(MessageKind::Ack.as_byte(), 0x30);
        assert_eq!(MessageKind::Nack.as_byte(), 0x31);
    }

    #[test]
    fn test_message_kind_try_from() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::try_from(kind.as_byte()), Ok(kind));
        }
        assert_eq!(
            MessageKind::try_from(0x40),
            Err(DecodeError::UnknownMessageKind(0x40))
        );
    }
}
