use crate::logic::board::{Board, Location, Player, Seat, TILE_COUNT};
use crate::logic::game::{GameState, PlayerState};
use crate::protocol::{
    type_id, PacketError, DEFAULT_VAR_STRING_LENGTH_CHARS, GAME_ID_LENGTH, UUID_LENGTH,
};

/// Read cursor over one incoming packet.
#[derive(Debug, Clone)]
pub struct PacketIn<'a> {
    data: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    id: Option<u8>,
    raw_start: usize,
}

impl<'a> PacketIn<'a> {
    /// Reads the type character and leaves the cursor on the first field.
    pub fn new(data: &'a str) -> Result<Self, PacketError> {
        let mut packet = Self::without_type(data);
        let type_char = packet.next_char().map_err(|_| PacketError::MissingType)?;
        let id = type_id(type_char).ok_or(PacketError::InvalidType(type_char))?;
        packet.id = Some(id);
        packet.raw_start = packet.pos;
        Ok(packet)
    }

    /// A cursor over an untyped field stream, such as a secondary engine reply.
    pub const fn without_type(data: &'a str) -> Self {
        Self {
            data,
            pos: 0,
            id: None,
            raw_start: 0,
        }
    }

    pub const fn id(&self) -> Option<u8> {
        self.id
    }

    /// Everything after the type character.
    pub fn raw_data(&self) -> &'a str {
        self.data.get(self.raw_start..).unwrap_or_default()
    }

    fn rest(&self) -> &'a str {
        self.data.get(self.pos..).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.rest().chars().count()
    }

    pub fn assert_empty(&self) -> Result<(), PacketError> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(PacketError::TrailingData(left)),
        }
    }

    pub fn consume_all(&mut self) -> &'a str {
        let rest = self.rest();
        self.pos = self.data.len();
        rest
    }

    pub fn next_char(&mut self) -> Result<char, PacketError> {
        let ch = self.rest().chars().next().ok_or(PacketError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }

    pub fn next_string(&mut self, length: usize) -> Result<&'a str, PacketError> {
        let rest = self.rest();
        let end = if length == 0 {
            0
        } else {
            rest.char_indices()
                .nth(length - 1)
                .map(|(offset, ch)| offset + ch.len_utf8())
                .ok_or_else(|| PacketError::Truncated {
                    needed: length,
                    remaining: rest.chars().count(),
                })?
        };
        let value = rest.get(..end).unwrap_or_default();
        self.pos += end;
        Ok(value)
    }

    pub fn next_var_string(&mut self) -> Result<&'a str, PacketError> {
        self.next_var_string_with(DEFAULT_VAR_STRING_LENGTH_CHARS)
    }

    pub fn next_var_string_with(&mut self, length_chars: usize) -> Result<&'a str, PacketError> {
        let length = self.next_int(length_chars)?;
        let length =
            usize::try_from(length).map_err(|_| PacketError::InvalidNumber(length.to_string()))?;
        self.next_string(length)
    }

    /// A zero-padded decimal of exactly `width` characters.
    pub fn next_int(&mut self, width: usize) -> Result<u32, PacketError> {
        if width == 0 {
            return Err(PacketError::ZeroWidth);
        }
        let digits = self.next_string(width)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PacketError::InvalidNumber(digits.to_owned()));
        }
        digits
            .parse()
            .map_err(|_| PacketError::InvalidNumber(digits.to_owned()))
    }

    pub fn next_digit(&mut self) -> Result<u8, PacketError> {
        let ch = self.next_char()?;
        ch.to_digit(10)
            .and_then(|digit| u8::try_from(digit).ok())
            .ok_or_else(|| PacketError::InvalidNumber(ch.to_string()))
    }

    pub fn next_bool(&mut self) -> Result<bool, PacketError> {
        match self.next_char()? {
            't' => Ok(true),
            'f' => Ok(false),
            other => Err(PacketError::InvalidBool(other)),
        }
    }

    pub fn next_location(&mut self) -> Result<Location, PacketError> {
        let x = self.next_digit()?;
        let y = self.next_digit()?;
        let loc = Location::new(x, y);
        if loc.is_valid() {
            Ok(loc)
        } else {
            Err(PacketError::InvalidLocation { x, y })
        }
    }

    pub fn next_player(&mut self) -> Result<Player, PacketError> {
        let digit = self.next_digit()?;
        Player::from_digit(digit).ok_or(PacketError::InvalidPlayer(digit))
    }

    pub fn next_seat(&mut self) -> Result<Seat, PacketError> {
        let digit = self.next_digit()?;
        Seat::from_digit(digit).ok_or(PacketError::InvalidPlayer(digit))
    }

    pub fn next_player_state(&mut self) -> Result<PlayerState, PacketError> {
        let tiles = self.next_digit()?;
        let score = self.next_digit()?;
        Ok(PlayerState::new(tiles, score))
    }

    pub fn next_board(&mut self) -> Result<Board, PacketError> {
        let mut flat = [0u8; TILE_COUNT];
        for cell in &mut flat {
            *cell = self.next_digit()?;
        }
        let mut board = Board::new();
        board.load_tile_state(&flat)?;
        Ok(board)
    }

    /// Light counts, dark counts, the board, then the active player. The
    /// result is checked for tile conservation before it is returned.
    pub fn next_game_state(&mut self) -> Result<GameState, PacketError> {
        let light = self.next_player_state()?;
        let dark = self.next_player_state()?;
        let board = self.next_board()?;
        let active_player = self.next_player()?;
        Ok(GameState::from_parts(board, light, dark, active_player)?)
    }

    pub fn next_uuid(&mut self) -> Result<&'a str, PacketError> {
        self.next_string(UUID_LENGTH)
    }

    pub fn next_game_id(&mut self) -> Result<&'a str, PacketError> {
        self.next_string(GAME_ID_LENGTH)
    }
}
