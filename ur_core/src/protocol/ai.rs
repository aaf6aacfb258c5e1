//! Packets exchanged between a game and its background search worker.

use crate::logic::board::Location;
use crate::logic::game::GameState;
use crate::protocol::{Packet, PacketError, PacketIn, PacketOut, PacketSet};

pub const AI_FUNCTIONALITY: &str = "ai_functionality";
pub const AI_MOVE_REQUEST: &str = "ai_move_request";
pub const AI_MOVE_RESPONSE: &str = "ai_move_response";
pub const AI_PANDA_MOVE_REQUEST: &str = "ai_panda_move_request";

const DEPTH_DIGITS: usize = 2;

/// What the worker can currently do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AiFunctionality {
    pub available: bool,
    pub panda_available: bool,
    pub panda_unsupported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMoveRequest {
    pub depth: u8,
    pub use_panda: bool,
    pub state: GameState,
    pub roll: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMoveResponse {
    pub move_from: Location,
}

/// The request body handed to the secondary engine, without its type character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiPandaMoveRequest {
    pub depth: u8,
    pub state: GameState,
    pub roll: u8,
}

impl AiPandaMoveRequest {
    pub fn to_engine_request(&self) -> Result<String, PacketError> {
        let mut out = PacketOut::new(0);
        self.write(&mut out)?;
        Ok(out.data_no_type().to_owned())
    }

    /// The engine answers with a bare location.
    pub fn read_response(reply: &str) -> Result<Location, PacketError> {
        let mut packet = PacketIn::without_type(reply);
        let from = packet.next_location()?;
        packet.assert_empty()?;
        Ok(from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPacket {
    Functionality(AiFunctionality),
    MoveRequest(AiMoveRequest),
    MoveResponse(AiMoveResponse),
    PandaMoveRequest(AiPandaMoveRequest),
}

impl Packet for AiPacket {
    fn name(&self) -> &'static str {
        match self {
            Self::Functionality(_) => AI_FUNCTIONALITY,
            Self::MoveRequest(_) => AI_MOVE_REQUEST,
            Self::MoveResponse(_) => AI_MOVE_RESPONSE,
            Self::PandaMoveRequest(_) => AI_PANDA_MOVE_REQUEST,
        }
    }

    fn write(&self, out: &mut PacketOut) -> Result<(), PacketError> {
        match self {
            Self::Functionality(functionality) => {
                functionality.write(out);
                Ok(())
            }
            Self::MoveRequest(request) => request.write(out),
            Self::MoveResponse(response) => out.push_location(response.move_from),
            Self::PandaMoveRequest(request) => request.write(out),
        }
    }
}

impl AiFunctionality {
    fn write(&self, out: &mut PacketOut) {
        out.push_bool(self.available);
        out.push_bool(self.panda_available);
        out.push_bool(self.panda_unsupported);
    }
}

impl AiMoveRequest {
    fn write(&self, out: &mut PacketOut) -> Result<(), PacketError> {
        out.push_int(u32::from(self.depth), DEPTH_DIGITS)?;
        out.push_bool(self.use_panda);
        out.push_game_state(&self.state)?;
        out.push_digit(self.roll)
    }
}

impl AiPandaMoveRequest {
    fn write(&self, out: &mut PacketOut) -> Result<(), PacketError> {
        out.push_int(u32::from(self.depth), DEPTH_DIGITS)?;
        out.push_game_state(&self.state)?;
        out.push_digit(self.roll)
    }
}

fn read_depth(packet: &mut PacketIn<'_>) -> Result<u8, PacketError> {
    let depth = packet.next_int(DEPTH_DIGITS)?;
    u8::try_from(depth).map_err(|_| PacketError::InvalidNumber(depth.to_string()))
}

fn read_functionality(packet: &mut PacketIn<'_>) -> Result<AiPacket, PacketError> {
    Ok(AiPacket::Functionality(AiFunctionality {
        available: packet.next_bool()?,
        panda_available: packet.next_bool()?,
        panda_unsupported: packet.next_bool()?,
    }))
}

fn read_move_request(packet: &mut PacketIn<'_>) -> Result<AiPacket, PacketError> {
    Ok(AiPacket::MoveRequest(AiMoveRequest {
        depth: read_depth(packet)?,
        use_panda: packet.next_bool()?,
        state: packet.next_game_state()?,
        roll: packet.next_digit()?,
    }))
}

fn read_move_response(packet: &mut PacketIn<'_>) -> Result<AiPacket, PacketError> {
    Ok(AiPacket::MoveResponse(AiMoveResponse {
        move_from: packet.next_location()?,
    }))
}

/// Both ends of the worker channel use the same set.
pub fn ai_packet_set() -> PacketSet<AiPacket> {
    PacketSet::new("AI", true)
        .add_bidirectional(AI_FUNCTIONALITY, read_functionality)
        .add_bidirectional(AI_MOVE_REQUEST, read_move_request)
        .add_bidirectional(AI_MOVE_RESPONSE, read_move_response)
        .add_outgoing(AI_PANDA_MOVE_REQUEST)
}
