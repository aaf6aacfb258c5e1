use ur_core::logic::board::{Location, Seat};
use ur_core::logic::dice::{Dice, DICE_COUNT};
use ur_core::logic::game::{GameState, StateError};
use ur_core::protocol::registry::DecodeFn;
use ur_core::protocol::{Packet, PacketError, PacketIn, PacketOut};

/// The opening snapshot of a game, from one participant's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub game_id: String,
    pub own_seat: Seat,
    pub light_name: String,
    pub dark_name: String,
    pub light_connected: bool,
    pub dark_connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollInfo {
    pub dice: Dice,
    pub has_moves: bool,
}

/// Full board state, plus the current roll once the mover has rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub state: GameState,
    pub roll: Option<RollInfo>,
}

/// Packets the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    Error { message: String },
    SetId { id: String },
    InvalidGame { game_id: String },
    GamePending { game_id: String },
    Game(GameInfo),
    GameEnd { reason: String },
    Message { title: String, subtitle: String },
    PlayerStatus { seat: Seat, connected: bool },
    State(StateUpdate),
    Move { from: Location, to: Location },
}

/// Registration order fixes the type ids.
pub(crate) const NAMES: [(&str, DecodeFn<ServerPacket>); 10] = [
    ("error", read_error),
    ("set_id", read_set_id),
    ("invalid_game", read_invalid_game),
    ("game_pending", read_game_pending),
    ("game", read_game),
    ("game_end", read_game_end),
    ("message", read_message),
    ("player_status", read_player_status),
    ("state", read_state),
    ("move", read_move),
];

impl Packet for ServerPacket {
    fn name(&self) -> &'static str {
        match self {
            Self::Error { .. } => "error",
            Self::SetId { .. } => "set_id",
            Self::InvalidGame { .. } => "invalid_game",
            Self::GamePending { .. } => "game_pending",
            Self::Game(_) => "game",
            Self::GameEnd { .. } => "game_end",
            Self::Message { .. } => "message",
            Self::PlayerStatus { .. } => "player_status",
            Self::State(_) => "state",
            Self::Move { .. } => "move",
        }
    }

    fn write(&self, out: &mut PacketOut) -> Result<(), PacketError> {
        match self {
            Self::Error { message } => out.push_rest(message),
            Self::SetId { id } => out.push_uuid(id)?,
            Self::InvalidGame { game_id } | Self::GamePending { game_id } => {
                out.push_game_id(game_id)?;
            }
            Self::Game(info) => {
                out.push_game_id(&info.game_id)?;
                out.push_seat(info.own_seat)?;
                out.push_var_string(&info.light_name)?;
                out.push_var_string(&info.dark_name)?;
                out.push_bool(info.light_connected);
                out.push_bool(info.dark_connected);
            }
            Self::GameEnd { reason } => out.push_rest(reason),
            Self::Message { title, subtitle } => {
                out.push_var_string(title)?;
                out.push_var_string(subtitle)?;
            }
            Self::PlayerStatus { seat, connected } => {
                out.push_seat(*seat)?;
                out.push_bool(*connected);
            }
            Self::State(update) => write_state(out, update)?,
            Self::Move { from, to } => {
                out.push_location(*from)?;
                out.push_location(*to)?;
            }
        }
        Ok(())
    }
}

fn write_state(out: &mut PacketOut, update: &StateUpdate) -> Result<(), PacketError> {
    let state = &update.state;
    out.push_player_state(&state.light)?;
    out.push_player_state(&state.dark)?;
    out.push_board(&state.board)?;
    out.push_bool(state.won);
    out.push_player(state.active_player)?;
    out.push_bool(update.roll.is_some());
    if let Some(roll) = &update.roll {
        for value in roll.dice.values() {
            out.push_digit(value)?;
        }
        out.push_bool(roll.has_moves);
    }
    Ok(())
}

fn read_error(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::Error {
        message: packet.consume_all().to_owned(),
    })
}

fn read_set_id(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::SetId {
        id: packet.next_uuid()?.to_owned(),
    })
}

fn read_invalid_game(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::InvalidGame {
        game_id: packet.next_game_id()?.to_owned(),
    })
}

fn read_game_pending(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::GamePending {
        game_id: packet.next_game_id()?.to_owned(),
    })
}

fn read_game(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::Game(GameInfo {
        game_id: packet.next_game_id()?.to_owned(),
        own_seat: packet.next_seat()?,
        light_name: packet.next_var_string()?.to_owned(),
        dark_name: packet.next_var_string()?.to_owned(),
        light_connected: packet.next_bool()?,
        dark_connected: packet.next_bool()?,
    }))
}

fn read_game_end(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::GameEnd {
        reason: packet.consume_all().to_owned(),
    })
}

fn read_message(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::Message {
        title: packet.next_var_string()?.to_owned(),
        subtitle: packet.next_var_string()?.to_owned(),
    })
}

fn read_player_status(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::PlayerStatus {
        seat: packet.next_seat()?,
        connected: packet.next_bool()?,
    })
}

fn read_state(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    let light = packet.next_player_state()?;
    let dark = packet.next_player_state()?;
    let board = packet.next_board()?;
    let won = packet.next_bool()?;
    let active_player = packet.next_player()?;

    let state = GameState::from_parts(board, light, dark, active_player)?;
    if state.won != won {
        return Err(StateError::WonFlagMismatch { flagged: won }.into());
    }

    let roll = if packet.next_bool()? {
        let mut values = [0; DICE_COUNT];
        for value in &mut values {
            *value = packet.next_digit()?;
        }
        Some(RollInfo {
            dice: Dice::from_values(values),
            has_moves: packet.next_bool()?,
        })
    } else {
        None
    };
    Ok(ServerPacket::State(StateUpdate { state, roll }))
}

fn read_move(packet: &mut PacketIn<'_>) -> Result<ServerPacket, PacketError> {
    Ok(ServerPacket::Move {
        from: packet.next_location()?,
        to: packet.next_location()?,
    })
}
