//! Delimiter-free text packets.
//!
//! A packet is a single type character (`'0' + id`) followed by fixed-width or
//! length-prefixed fields, concatenated without separators. Lengths are counted
//! in characters, never bytes.

use crate::logic::game::StateError;
use thiserror::Error;

pub mod ai;
pub mod packet_in;
pub mod packet_out;
pub mod registry;

pub use packet_in::PacketIn;
pub use packet_out::PacketOut;
pub use registry::{Packet, PacketDirection, PacketSet, ReadPacket};

pub const ZERO_CHAR: char = '0';
pub const GAME_ID_LENGTH: usize = 6;
pub const UUID_LENGTH: usize = 36;
pub const DEFAULT_VAR_STRING_LENGTH_CHARS: usize = 2;
/// A type id must fit in one decimal character.
pub const MAX_PACKET_TYPE_ID: u8 = 9;

/// The character that carries `id` on the wire.
pub fn type_char(id: u8) -> Option<char> {
    if id > MAX_PACKET_TYPE_ID {
        return None;
    }
    char::from_u32(u32::from(ZERO_CHAR) + u32::from(id))
}

pub fn type_id(ch: char) -> Option<u8> {
    let id = u32::from(ch).checked_sub(u32::from(ZERO_CHAR))?;
    u8::try_from(id).ok().filter(|&id| id <= MAX_PACKET_TYPE_ID)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("packet is empty, expected a type character")]
    MissingType,
    #[error("invalid packet type character {0:?}")]
    InvalidType(char),
    #[error("unknown incoming packet type {id} in {set}")]
    UnknownIncomingType { set: String, id: u8 },
    #[error("unknown outgoing packet type {name:?} in {set}")]
    UnknownOutgoingType { set: String, name: String },
    #[error("expected {needed} more characters, {remaining} left")]
    Truncated { needed: usize, remaining: usize },
    #[error("expected packet to be fully read, {0} characters left")]
    TrailingData(usize),
    #[error("expected a number, got {0:?}")]
    InvalidNumber(String),
    #[error("expected a boolean 't' or 'f', got {0:?}")]
    InvalidBool(char),
    #[error("invalid player {0}")]
    InvalidPlayer(u8),
    #[error("invalid location ({x}, {y})")]
    InvalidLocation { x: u8, y: u8 },
    #[error("invalid game state: {0}")]
    InvalidState(#[from] StateError),
    #[error("{0} is not a single digit")]
    DigitOutOfRange(u32),
    #[error("{value} does not fit in {width} digits")]
    IntegerTooWide { value: u32, width: usize },
    #[error("field width must be positive")]
    ZeroWidth,
    #[error("string of {length} characters does not fit a {width}-digit length")]
    StringTooLong { length: usize, width: usize },
    #[error("expected exactly {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
