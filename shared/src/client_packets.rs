use crate::{PROTOCOL_VERSION, PROTOCOL_VERSION_DIGITS};
use ur_core::logic::board::Location;
use ur_core::protocol::registry::DecodeFn;
use ur_core::protocol::{Packet, PacketError, PacketIn, PacketOut};

/// Packets a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    Open { version: u32, name: String },
    Reopen { version: u32, previous_id: String, name: String },
    JoinGame { game_id: String },
    FindGame,
    CreateGame,
    Roll,
    Move { from: Location },
}

/// Registration order fixes the type ids.
pub(crate) const NAMES: [(&str, DecodeFn<ClientPacket>); 7] = [
    ("open", read_open),
    ("reopen", read_reopen),
    ("join_game", read_join_game),
    ("find_game", |_| Ok(ClientPacket::FindGame)),
    ("create_game", |_| Ok(ClientPacket::CreateGame)),
    ("roll", |_| Ok(ClientPacket::Roll)),
    ("move", read_move),
];

impl ClientPacket {
    pub fn open(name: impl Into<String>) -> Self {
        Self::Open {
            version: PROTOCOL_VERSION,
            name: name.into(),
        }
    }

    pub fn reopen(previous_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Reopen {
            version: PROTOCOL_VERSION,
            previous_id: previous_id.into(),
            name: name.into(),
        }
    }
}

impl Packet for ClientPacket {
    fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Reopen { .. } => "reopen",
            Self::JoinGame { .. } => "join_game",
            Self::FindGame => "find_game",
            Self::CreateGame => "create_game",
            Self::Roll => "roll",
            Self::Move { .. } => "move",
        }
    }

    fn write(&self, out: &mut PacketOut) -> Result<(), PacketError> {
        match self {
            Self::Open { version, name } => {
                out.push_int(*version, PROTOCOL_VERSION_DIGITS)?;
                out.push_var_string(name)
            }
            Self::Reopen {
                version,
                previous_id,
                name,
            } => {
                out.push_int(*version, PROTOCOL_VERSION_DIGITS)?;
                out.push_uuid(previous_id)?;
                out.push_var_string(name)
            }
            Self::JoinGame { game_id } => out.push_game_id(game_id),
            Self::FindGame | Self::CreateGame | Self::Roll => Ok(()),
            Self::Move { from } => out.push_location(*from),
        }
    }
}

fn read_open(packet: &mut PacketIn<'_>) -> Result<ClientPacket, PacketError> {
    Ok(ClientPacket::Open {
        version: packet.next_int(PROTOCOL_VERSION_DIGITS)?,
        name: packet.next_var_string()?.to_owned(),
    })
}

fn read_reopen(packet: &mut PacketIn<'_>) -> Result<ClientPacket, PacketError> {
    Ok(ClientPacket::Reopen {
        version: packet.next_int(PROTOCOL_VERSION_DIGITS)?,
        previous_id: packet.next_uuid()?.to_owned(),
        name: packet.next_var_string()?.to_owned(),
    })
}

fn read_join_game(packet: &mut PacketIn<'_>) -> Result<ClientPacket, PacketError> {
    Ok(ClientPacket::JoinGame {
        game_id: packet.next_game_id()?.to_owned(),
    })
}

fn read_move(packet: &mut PacketIn<'_>) -> Result<ClientPacket, PacketError> {
    Ok(ClientPacket::Move {
        from: packet.next_location()?,
    })
}
