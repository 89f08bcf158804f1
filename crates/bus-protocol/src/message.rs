//! Typed message payloads
//!
//! Each [`MessageKind`] has a fixed payload layout. Multi-byte fields are
//! big-endian.
//!
//! | Kind           | Payload                                        |
//! |----------------|------------------------------------------------|
//! | Alive          | `ts_hi ts_lo cnt_hi cnt_lo`                    |
//! | ControlRequest | `h_hi h_lo s_hi s_lo i_hi i_lo`                |
//! | Status         | `state error_code 00 00`                       |
//! | Ack            | `[acked_id]`                                   |
//! | Nack           | `[rejected_id [reason]]`                       |
//!
//! Parsing is lenient in the same way as the host-side sniffer: a payload
//! must be at least as long as its layout, extra bytes are ignored. Ack and
//! Nack bytes are all optional, so an empty acknowledgment still parses.

use std::fmt;

use crate::error::ParseError;
use crate::frame::{decode, encode};
use crate::{EncodeCommand, MessageKind};

/// Device state code carried in a Status payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DeviceStatus {
    Idle = 0,
    Moving = 1,
    Error = 2,
}

impl TryFrom<u8> for DeviceStatus {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, ParseError> {
        match value {
            0 => Ok(DeviceStatus::Idle),
            1 => Ok(DeviceStatus::Moving),
            2 => Ok(DeviceStatus::Error),
            _ => Err(ParseError::UnknownDeviceStatus(value)),
        }
    }
}

/// Status report: `[state, error_code, reserved, reserved]`
///
/// `error_code` is only meaningful when `state` is [`DeviceStatus::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPayload {
    pub state: DeviceStatus,
    pub error_code: u8,
}

impl StatusPayload {
    pub const LEN: usize = 4;

    pub fn idle() -> Self {
        Self {
            state: DeviceStatus::Idle,
            error_code: 0,
        }
    }

    pub fn moving() -> Self {
        Self {
            state: DeviceStatus::Moving,
            error_code: 0,
        }
    }

    pub fn error(code: u8) -> Self {
        Self {
            state: DeviceStatus::Error,
            error_code: code,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        [self.state as u8, self.error_code, 0, 0]
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        require_len(MessageKind::Status, data, Self::LEN)?;
        Ok(Self {
            state: DeviceStatus::try_from(data[0])?,
            error_code: data[1],
        })
    }
}

/// Liveness announcement: 16-bit timestamp and 16-bit counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlivePayload {
    /// Wall-clock seconds truncated to 16 bits
    pub timestamp: u16,
    /// Emission counter truncated to 16 bits
    pub counter: u16,
}

impl AlivePayload {
    pub const LEN: usize = 4;

    /// Build from full-width values, keeping the low 16 bits of each
    pub fn new(unix_seconds: u64, counter: u64) -> Self {
        Self {
            timestamp: (unix_seconds & 0xFFFF) as u16,
            counter: (counter & 0xFFFF) as u16,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let [ts_hi, ts_lo] = self.timestamp.to_be_bytes();
        let [cnt_hi, cnt_lo] = self.counter.to_be_bytes();
        [ts_hi, ts_lo, cnt_hi, cnt_lo]
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        require_len(MessageKind::Alive, data, Self::LEN)?;
        Ok(Self {
            timestamp: u16::from_be_bytes([data[0], data[1]]),
            counter: u16::from_be_bytes([data[2], data[3]]),
        })
    }
}

/// Seat position request sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequestPayload {
    pub height: u16,
    pub slide: u16,
    pub incline: u16,
}

impl ControlRequestPayload {
    pub const LEN: usize = 6;

    pub fn to_bytes(&self) -> [u8; 6] {
        let [h_hi, h_lo] = self.height.to_be_bytes();
        let [s_hi, s_lo] = self.slide.to_be_bytes();
        let [i_hi, i_lo] = self.incline.to_be_bytes();
        [h_hi, h_lo, s_hi, s_lo, i_hi, i_lo]
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        require_len(MessageKind::ControlRequest, data, Self::LEN)?;
        Ok(Self {
            height: u16::from_be_bytes([data[0], data[1]]),
            slide: u16::from_be_bytes([data[2], data[3]]),
            incline: u16::from_be_bytes([data[4], data[5]]),
        })
    }
}

/// A decoded bus message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Alive(AlivePayload),
    ControlRequest(ControlRequestPayload),
    Status(StatusPayload),
    /// Acknowledges the command with the given message id, if present
    Ack { command: Option<u8> },
    /// Rejects the command with the given message id, if present
    Nack {
        command: Option<u8>,
        reason: Option<u8>,
    },
}

impl Message {
    /// Acknowledgment of a host command
    pub fn ack(command: MessageKind) -> Self {
        Message::Ack {
            command: Some(command.as_byte()),
        }
    }

    /// Message kind used as the frame's message id
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Alive(_) => MessageKind::Alive,
            Message::ControlRequest(_) => MessageKind::ControlRequest,
            Message::Status(_) => MessageKind::Status,
            Message::Ack { .. } => MessageKind::Ack,
            Message::Nack { .. } => MessageKind::Nack,
        }
    }

    /// Payload bytes (without header, id or tail)
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Message::Alive(p) => p.to_bytes().to_vec(),
            Message::ControlRequest(p) => p.to_bytes().to_vec(),
            Message::Status(p) => p.to_bytes().to_vec(),
            Message::Ack { command } => command.iter().copied().collect(),
            // A reason without a command cannot be expressed on the wire
            Message::Nack { command, reason } => match command {
                Some(cmd) => std::iter::once(*cmd).chain(*reason).collect(),
                None => Vec::new(),
            },
        }
    }

    /// Interpret a payload according to its message kind
    pub fn parse(kind: MessageKind, payload: &[u8]) -> Result<Self, ParseError> {
        match kind {
            MessageKind::Alive => Ok(Message::Alive(AlivePayload::from_bytes(payload)?)),
            MessageKind::ControlRequest => Ok(Message::ControlRequest(
                ControlRequestPayload::from_bytes(payload)?,
            )),
            MessageKind::Status => Ok(Message::Status(StatusPayload::from_bytes(payload)?)),
            MessageKind::Ack => Ok(Message::Ack {
                command: payload.first().copied(),
            }),
            MessageKind::Nack => Ok(Message::Nack {
                command: payload.first().copied(),
                reason: payload.get(1).copied(),
            }),
        }
    }

    /// Decode a complete frame and interpret its payload
    pub fn from_frame(bytes: &[u8]) -> Result<Self, ParseError> {
        let (kind, payload) = decode(bytes)?;
        Self::parse(kind, &payload)
    }
}

impl EncodeCommand for Message {
    fn encode(&self) -> Vec<u8> {
        encode(self.kind(), &self.payload())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Alive(p) => write!(f, "Alive: ts={} cnt={}", p.timestamp, p.counter),
            Message::ControlRequest(p) => write!(
                f,
                "ControlReq H={} S={} I={}",
                p.height, p.slide, p.incline
            ),
            Message::Status(p) => {
                write!(f, "Status state={:?} err={}", p.state, p.error_code)
            }
            Message::Ack { command } => write!(f, "ACK for cmd={}", CommandId(*command)),
            Message::Nack { command, reason } => {
                write!(f, "NACK for cmd={}", CommandId(*command))?;
                match reason {
                    Some(r) => write!(f, " reason={}", r),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Acknowledged command id, `none` when the payload was empty
struct CommandId(Option<u8>);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "0x{:02X}", id),
            None => f.write_str("none"),
        }
    }
}

fn require_len(kind: MessageKind, data: &[u8], needed: usize) -> Result<(), ParseError> {
    if data.len() < needed {
        return Err(ParseError::PayloadTooShort {
            kind,
            needed,
            actual: data.len(),
        });
    }
    Ok(())
}
