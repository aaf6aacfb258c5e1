use crate::engine::move_list::MoveList;
use crate::logic::board::{Board, Location, Player, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TILES_PER_PLAYER: u8 = 7;
pub const WINNING_SCORE: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already won")]
    GameOver,
    #[error("no valid move from {from} with a roll of {roll}")]
    InvalidMove { from: Location, roll: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("expected {expected} tiles, got {actual}")]
    WrongTileCount { expected: usize, actual: usize },
    #[error("invalid tile {value} at index {index}")]
    InvalidTile { index: usize, value: u8 },
    #[error("{player} has {total} tiles in total, expected 7")]
    TileCountMismatch { player: Player, total: u8 },
    #[error("{player} tile at {loc} is not on its path")]
    TileOffPath { player: Player, loc: Location },
    #[error("won flag {flagged} disagrees with the scores")]
    WonFlagMismatch { flagged: bool },
}

/// Scalar weights of the board-value heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityWeights {
    pub score: i32,
    pub advancement: i32,
    pub win: i32,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            score: 16,
            advancement: 1,
            win: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub tiles: u8,
    pub score: u8,
}

impl PlayerState {
    pub const fn new(tiles: u8, score: u8) -> Self {
        Self { tiles, score }
    }

    pub const fn starting() -> Self {
        Self::new(TILES_PER_PLAYER, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub light: PlayerState,
    pub dark: PlayerState,
    pub active_player: Player,
    pub won: bool,
    pub last_move_from: Option<Location>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A fresh game: empty board, every tile in hand, light to move.
    #[must_use]
    pub fn new() -> Self {
        let mut state = Self {
            board: Board::new(),
            light: PlayerState::starting(),
            dark: PlayerState::starting(),
            active_player: Player::Light,
            won: false,
            last_move_from: None,
        };
        state.update_start_tiles();
        state
    }

    /// Builds a state from decoded parts and checks it before handing it out.
    pub fn from_parts(
        board: Board,
        light: PlayerState,
        dark: PlayerState,
        active_player: Player,
    ) -> Result<Self, StateError> {
        let mut state = Self {
            board,
            light,
            dark,
            active_player,
            won: light.score >= WINNING_SCORE || dark.score >= WINNING_SCORE,
            last_move_from: None,
        };
        state.update_start_tiles();
        state.check_invariants()?;
        Ok(state)
    }

    pub const fn player(&self, player: Player) -> &PlayerState {
        match player {
            Player::Light => &self.light,
            Player::Dark => &self.dark,
        }
    }

    pub fn player_mut(&mut self, player: Player) -> &mut PlayerState {
        match player {
            Player::Light => &mut self.light,
            Player::Dark => &mut self.dark,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        if self.light.score >= WINNING_SCORE {
            Some(Player::Light)
        } else if self.dark.score >= WINNING_SCORE {
            Some(Player::Dark)
        } else {
            None
        }
    }

    pub fn copy_from(&mut self, other: &Self) {
        *self = *other;
    }

    /// The start marker shows a tile exactly while its owner has tiles in hand.
    pub fn update_start_tiles(&mut self) {
        for player in [Player::Light, Player::Dark] {
            let tile = if self.player(player).tiles > 0 {
                Tile::of(player)
            } else {
                Tile::Empty
            };
            self.board.set_tile(Board::start(player), tile);
        }
    }

    pub fn check_invariants(&self) -> Result<(), StateError> {
        for player in [Player::Light, Player::Dark] {
            let counts = self.player(player);
            let total = counts
                .tiles
                .saturating_add(counts.score)
                .saturating_add(self.board.count_on_board(player));
            if total != TILES_PER_PLAYER {
                return Err(StateError::TileCountMismatch { player, total });
            }
        }

        for (index, &tile) in self.board.tiles().iter().enumerate() {
            let (Some(owner), Some(loc)) = (tile.owner(), Location::from_index(index)) else {
                continue;
            };
            if Board::is_end(owner, loc) || Board::path_index(owner, loc).is_none() {
                return Err(StateError::TileOffPath { player: owner, loc });
            }
        }
        Ok(())
    }

    pub fn get_valid_moves<'a>(&self, roll: u8, out: &'a mut MoveList) -> &'a [Location] {
        self.board.valid_moves(self.active_player, roll, out)
    }

    /// Moves the active player's tile at `from` by `roll` and returns where it landed.
    pub fn apply_move(&mut self, from: Location, roll: u8) -> Result<Location, MoveError> {
        if self.won {
            return Err(MoveError::GameOver);
        }
        let player = self.active_player;
        if !self.board.is_valid_move_from(player, from, roll) {
            return Err(MoveError::InvalidMove { from, roll });
        }
        let to = Board::move_dest(player, from, roll).ok_or(MoveError::InvalidMove { from, roll })?;
        let captured = self.board.get_tile(to).owner();

        self.board.set_tile(from, Tile::Empty);
        if Board::is_start(player, from) {
            let hand = self.player_mut(player);
            hand.tiles = hand.tiles.saturating_sub(1);
        }

        if Board::is_end(player, to) {
            let counts = self.player_mut(player);
            counts.score += 1;
            if counts.score >= WINNING_SCORE {
                self.won = true;
            }
        } else {
            self.board.set_tile(to, Tile::of(player));
            if let Some(owner) = captured {
                self.player_mut(owner).tiles += 1;
            }
        }

        if !Board::is_rosette(to) {
            self.swap_active_player();
        }
        self.last_move_from = Some(from);
        self.update_start_tiles();
        Ok(to)
    }

    pub fn swap_active_player(&mut self) {
        self.active_player = self.active_player.opposite();
        self.last_move_from = None;
    }

    pub fn calculate_utility(&self, player: Player) -> i32 {
        self.weighted_utility(player, &UtilityWeights::default())
    }

    /// Score differential plus path advancement, from `player`'s point of view.
    /// Start markers sit at step zero and the end cell never holds a tile, so
    /// neither contributes.
    pub fn weighted_utility(&self, player: Player, weights: &UtilityWeights) -> i32 {
        let light_score = i32::from(self.light.score);
        let dark_score = i32::from(self.dark.score);
        let mut light_utility = weights.score * (light_score - dark_score);

        for (step, (&light_loc, &dark_loc)) in
            (0i32..).zip(Board::path(Player::Light).iter().zip(Board::path(Player::Dark)))
        {
            if self.board.get_tile(light_loc) == Tile::Light {
                light_utility += weights.advancement * step;
            }
            if self.board.get_tile(dark_loc) == Tile::Dark {
                light_utility -= weights.advancement * step;
            }
        }

        match self.winner() {
            Some(Player::Light) => light_utility += weights.win,
            Some(Player::Dark) => light_utility -= weights.win,
            None => {}
        }

        match player {
            Player::Light => light_utility,
            Player::Dark => -light_utility,
        }
    }
}
