use crate::logic::board::{Board, Location, Player, Seat};
use crate::logic::game::{GameState, PlayerState};
use crate::protocol::{
    type_char, PacketError, DEFAULT_VAR_STRING_LENGTH_CHARS, GAME_ID_LENGTH, UUID_LENGTH,
};
use std::fmt::Write;

/// Append-only builder for one outgoing packet. Every push validates its
/// field, so a malformed packet cannot be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    id: u8,
    data: String,
}

impl PacketOut {
    /// # Panics
    ///
    /// Panics if `id` does not fit in a single type character.
    pub fn new(id: u8) -> Self {
        let Some(ch) = type_char(id) else {
            panic!("packet type id {id} does not fit in one character");
        };
        Self {
            id,
            data: ch.to_string(),
        }
    }

    pub const fn id(&self) -> u8 {
        self.id
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// The packet without its type character.
    pub fn data_no_type(&self) -> &str {
        self.data.get(1..).unwrap_or_default()
    }

    pub fn into_data(self) -> String {
        self.data
    }

    pub fn push_rest(&mut self, value: &str) {
        self.data.push_str(value);
    }

    pub fn push_digit(&mut self, digit: u8) -> Result<(), PacketError> {
        let ch = char::from_digit(u32::from(digit), 10)
            .ok_or(PacketError::DigitOutOfRange(u32::from(digit)))?;
        self.data.push(ch);
        Ok(())
    }

    /// Zero-padded to exactly `width` characters.
    pub fn push_int(&mut self, value: u32, width: usize) -> Result<(), PacketError> {
        if width == 0 {
            return Err(PacketError::ZeroWidth);
        }
        let encoded = value.to_string();
        if encoded.len() > width {
            return Err(PacketError::IntegerTooWide { value, width });
        }
        // Writing to a String cannot fail.
        let _ = write!(self.data, "{value:0>width$}");
        Ok(())
    }

    pub fn push_bool(&mut self, value: bool) {
        self.data.push(if value { 't' } else { 'f' });
    }

    pub fn push_fixed_string(&mut self, value: &str, length: usize) -> Result<(), PacketError> {
        let actual = value.chars().count();
        if actual != length {
            return Err(PacketError::WrongLength {
                expected: length,
                actual,
            });
        }
        self.data.push_str(value);
        Ok(())
    }

    pub fn push_var_string(&mut self, value: &str) -> Result<(), PacketError> {
        self.push_var_string_with(value, DEFAULT_VAR_STRING_LENGTH_CHARS)
    }

    pub fn push_var_string_with(
        &mut self,
        value: &str,
        length_chars: usize,
    ) -> Result<(), PacketError> {
        let length = value.chars().count();
        let too_long = PacketError::StringTooLong {
            length,
            width: length_chars,
        };
        let encoded_length = u32::try_from(length).map_err(|_| too_long.clone())?;
        self.push_int(encoded_length, length_chars).map_err(|err| match err {
            PacketError::IntegerTooWide { .. } => too_long,
            other => other,
        })?;
        self.data.push_str(value);
        Ok(())
    }

    pub fn push_location(&mut self, loc: Location) -> Result<(), PacketError> {
        if !loc.is_valid() {
            return Err(PacketError::InvalidLocation { x: loc.x, y: loc.y });
        }
        self.push_digit(loc.x)?;
        self.push_digit(loc.y)
    }

    pub fn push_player(&mut self, player: Player) -> Result<(), PacketError> {
        self.push_digit(player.digit())
    }

    pub fn push_seat(&mut self, seat: Seat) -> Result<(), PacketError> {
        self.push_digit(seat.digit())
    }

    /// Runs a multi-field write, rolling the data back if any field fails.
    fn all_or_nothing(
        &mut self,
        write: impl FnOnce(&mut Self) -> Result<(), PacketError>,
    ) -> Result<(), PacketError> {
        let len = self.data.len();
        let result = write(self);
        if result.is_err() {
            self.data.truncate(len);
        }
        result
    }

    pub fn push_player_state(&mut self, state: &PlayerState) -> Result<(), PacketError> {
        self.all_or_nothing(|out| {
            out.push_digit(state.tiles)?;
            out.push_digit(state.score)
        })
    }

    pub fn push_board(&mut self, board: &Board) -> Result<(), PacketError> {
        self.all_or_nothing(|out| {
            for tile in board.tiles() {
                out.push_digit(tile.digit())?;
            }
            Ok(())
        })
    }

    pub fn push_game_state(&mut self, state: &GameState) -> Result<(), PacketError> {
        self.all_or_nothing(|out| {
            out.push_player_state(&state.light)?;
            out.push_player_state(&state.dark)?;
            out.push_board(&state.board)?;
            out.push_player(state.active_player)
        })
    }

    pub fn push_uuid(&mut self, uuid: &str) -> Result<(), PacketError> {
        self.push_fixed_string(uuid, UUID_LENGTH)
    }

    pub fn push_game_id(&mut self, game_id: &str) -> Result<(), PacketError> {
        self.push_fixed_string(game_id, GAME_ID_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PacketIn;

    #[test]
    fn test_type_character_leads() {
        let mut out = PacketOut::new(4);
        out.push_bool(false);
        assert_eq!(out.data(), "4f");
        assert_eq!(out.data_no_type(), "f");
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_wide_type_id_panics() {
        let _ = PacketOut::new(10);
    }

    #[test]
    fn test_int_is_zero_padded() {
        let mut out = PacketOut::new(0);
        out.push_int(7, 3).unwrap();
        out.push_int(42, 2).unwrap();
        assert_eq!(out.data_no_type(), "00742");
        assert_eq!(
            out.push_int(100, 2),
            Err(PacketError::IntegerTooWide {
                value: 100,
                width: 2
            })
        );
        assert_eq!(out.push_int(1, 0), Err(PacketError::ZeroWidth));
        assert_eq!(out.data_no_type(), "00742");
    }

    #[test]
    fn test_rejects_malformed_fields() {
        let mut out = PacketOut::new(0);
        assert_eq!(out.push_digit(10), Err(PacketError::DigitOutOfRange(10)));
        assert_eq!(
            out.push_game_id("abc"),
            Err(PacketError::WrongLength {
                expected: 6,
                actual: 3
            })
        );
        assert_eq!(
            out.push_location(Location::new(3, 0)),
            Err(PacketError::InvalidLocation { x: 3, y: 0 })
        );
        let long = "x".repeat(100);
        assert_eq!(
            out.push_var_string(&long),
            Err(PacketError::StringTooLong {
                length: 100,
                width: 2
            })
        );
        assert_eq!(out.data_no_type(), "");
    }

    #[test]
    fn test_var_string_counts_characters() {
        let mut out = PacketOut::new(0);
        out.push_var_string("héé").unwrap();
        assert_eq!(out.data_no_type(), "03héé");
    }

    #[test]
    fn test_game_state_reads_back() {
        let mut state = GameState::new();
        state.apply_move(Board::start(Player::Light), 3).unwrap();
        let mut out = PacketOut::new(2);
        out.push_game_state(&state).unwrap();

        let mut packet = PacketIn::new(out.data()).unwrap();
        assert_eq!(packet.id(), Some(2));
        let decoded = packet.next_game_state().unwrap();
        packet.assert_empty().unwrap();
        assert_eq!(decoded.board, state.board);
        assert_eq!(decoded.light, state.light);
        assert_eq!(decoded.dark, state.dark);
        assert_eq!(decoded.active_player, state.active_player);
    }

    #[test]
    fn test_failed_compound_write_leaves_no_trace() {
        let mut out = PacketOut::new(4);
        out.push_bool(true);
        assert_eq!(
            out.push_player_state(&PlayerState::new(3, 10)),
            Err(PacketError::DigitOutOfRange(10))
        );
        assert_eq!(out.data(), "4t");

        let mut state = GameState::new();
        state.dark = PlayerState::new(12, 0);
        assert_eq!(
            out.push_game_state(&state),
            Err(PacketError::DigitOutOfRange(12))
        );
        assert_eq!(out.data(), "4t");
    }
}
