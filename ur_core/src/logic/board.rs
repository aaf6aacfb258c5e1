use crate::engine::move_list::MoveList;
use crate::logic::game::StateError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const WIDTH: u8 = 3;
pub const HEIGHT: u8 = 8;
pub const TILE_COUNT: usize = (WIDTH as usize) * (HEIGHT as usize);
pub const PATH_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Dark = 1,
    Light = 2,
}

impl Player {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub const fn digit(self) -> u8 {
        self as u8
    }

    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::Dark),
            2 => Some(Self::Light),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => f.write_str("dark"),
            Self::Light => f.write_str("light"),
        }
    }
}

/// A participant slot as seen by the network layer, which also knows spectators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    Dark = 1,
    Light = 2,
    Spectator = 3,
}

impl Seat {
    pub const fn digit(self) -> u8 {
        self as u8
    }

    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::Dark),
            2 => Some(Self::Light),
            3 => Some(Self::Spectator),
            _ => None,
        }
    }

    pub const fn player(self) -> Option<Player> {
        match self {
            Self::Dark => Some(Player::Dark),
            Self::Light => Some(Player::Light),
            Self::Spectator => None,
        }
    }
}

impl From<Player> for Seat {
    fn from(player: Player) -> Self {
        match player {
            Player::Dark => Self::Dark,
            Player::Light => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty = 0,
    Dark = 1,
    Light = 2,
}

impl Tile {
    pub const fn digit(self) -> u8 {
        self as u8
    }

    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::Empty),
            1 => Some(Self::Dark),
            2 => Some(Self::Light),
            _ => None,
        }
    }

    pub const fn of(player: Player) -> Self {
        match player {
            Player::Dark => Self::Dark,
            Player::Light => Self::Light,
        }
    }

    pub const fn owner(self) -> Option<Player> {
        match self {
            Self::Empty => None,
            Self::Dark => Some(Player::Dark),
            Self::Light => Some(Player::Light),
        }
    }
}

/// A cell position on the 3x8 grid. Start and end markers are valid
/// locations but are not on the board proper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: u8,
    pub y: u8,
}

impl Location {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub const fn is_valid(self) -> bool {
        self.x < WIDTH && self.y < HEIGHT
    }

    /// Valid and not one of the four start/end markers.
    pub const fn is_on_board(self) -> bool {
        self.is_valid() && (self.x == 1 || (self.y != 4 && self.y != 5))
    }

    pub const fn index(self) -> usize {
        self.x as usize + self.y as usize * WIDTH as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        let width = usize::from(WIDTH);
        let x = u8::try_from(index % width).ok()?;
        let y = u8::try_from(index / width).ok()?;
        let loc = Self::new(x, y);
        loc.is_valid().then_some(loc)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

const fn loc(x: u8, y: u8) -> Location {
    Location::new(x, y)
}

pub const DARK_PATH: [Location; PATH_LENGTH] = [
    loc(0, 4),
    loc(0, 3),
    loc(0, 2),
    loc(0, 1),
    loc(0, 0),
    loc(1, 0),
    loc(1, 1),
    loc(1, 2),
    loc(1, 3),
    loc(1, 4),
    loc(1, 5),
    loc(1, 6),
    loc(1, 7),
    loc(0, 7),
    loc(0, 6),
    loc(0, 5),
];

pub const LIGHT_PATH: [Location; PATH_LENGTH] = [
    loc(2, 4),
    loc(2, 3),
    loc(2, 2),
    loc(2, 1),
    loc(2, 0),
    loc(1, 0),
    loc(1, 1),
    loc(1, 2),
    loc(1, 3),
    loc(1, 4),
    loc(1, 5),
    loc(1, 6),
    loc(1, 7),
    loc(2, 7),
    loc(2, 6),
    loc(2, 5),
];

pub const ROSETTES: [Location; 5] = [loc(0, 0), loc(2, 0), loc(1, 3), loc(0, 6), loc(2, 6)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: [Tile; TILE_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tiles: [Tile::Empty; TILE_COUNT],
        }
    }

    /// Cells in wire order, `x + y * WIDTH`.
    pub const fn tiles(&self) -> &[Tile; TILE_COUNT] {
        &self.tiles
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.tiles = other.tiles;
    }

    pub fn clear(&mut self) {
        self.tiles = [Tile::Empty; TILE_COUNT];
    }

    /// Returns `Tile::Empty` for locations off the grid.
    pub fn get_tile(&self, loc: Location) -> Tile {
        if !loc.is_valid() {
            return Tile::Empty;
        }
        self.tiles.get(loc.index()).copied().unwrap_or_default()
    }

    pub fn set_tile(&mut self, loc: Location, tile: Tile) {
        debug_assert!(loc.is_valid(), "invalid tile location {loc}");
        if !loc.is_valid() {
            return;
        }
        if let Some(cell) = self.tiles.get_mut(loc.index()) {
            *cell = tile;
        }
    }

    /// Loads a flat snapshot of tile digits, rejecting anything that is not a tile.
    pub fn load_tile_state(&mut self, flat: &[u8]) -> Result<(), StateError> {
        if flat.len() != TILE_COUNT {
            return Err(StateError::WrongTileCount {
                expected: TILE_COUNT,
                actual: flat.len(),
            });
        }
        let mut tiles = [Tile::Empty; TILE_COUNT];
        for (index, (cell, &value)) in tiles.iter_mut().zip(flat).enumerate() {
            *cell = Tile::from_digit(value).ok_or(StateError::InvalidTile { index, value })?;
        }
        self.tiles = tiles;
        Ok(())
    }

    /// Counts the player's tiles on the board proper (start and end markers excluded).
    pub fn count_on_board(&self, player: Player) -> u8 {
        let tile = Tile::of(player);
        let count = self
            .tiles
            .iter()
            .enumerate()
            .filter(|&(index, &cell)| {
                cell == tile && Location::from_index(index).is_some_and(Location::is_on_board)
            })
            .count();
        u8::try_from(count).unwrap_or(u8::MAX)
    }

    pub const fn path(player: Player) -> &'static [Location; PATH_LENGTH] {
        match player {
            Player::Dark => &DARK_PATH,
            Player::Light => &LIGHT_PATH,
        }
    }

    pub const fn start(player: Player) -> Location {
        Self::path(player)[0]
    }

    pub const fn end(player: Player) -> Location {
        Self::path(player)[PATH_LENGTH - 1]
    }

    pub fn is_start(player: Player, loc: Location) -> bool {
        Self::start(player) == loc
    }

    pub fn is_end(player: Player, loc: Location) -> bool {
        Self::end(player) == loc
    }

    pub fn is_rosette(loc: Location) -> bool {
        ROSETTES.contains(&loc)
    }

    pub fn path_index(player: Player, loc: Location) -> Option<usize> {
        Self::path(player).iter().position(|&step| step == loc)
    }

    /// Where a tile at `from` lands after `roll` steps, if that stays on the path.
    pub fn move_dest(player: Player, from: Location, roll: u8) -> Option<Location> {
        let from_index = Self::path_index(player, from)?;
        Self::path(player)
            .get(from_index + usize::from(roll))
            .copied()
    }

    pub fn is_valid_move_from(&self, player: Player, from: Location, roll: u8) -> bool {
        if roll == 0 {
            return false;
        }
        let Some(to) = Self::move_dest(player, from, roll) else {
            return false;
        };

        let own = Tile::of(player);
        let from_tile = self.get_tile(from);
        let to_tile = self.get_tile(to);
        if from_tile != own || to_tile == own {
            return false;
        }
        to_tile == Tile::Empty || !Self::is_rosette(to)
    }

    /// Collects every origin along the player's path that can move `roll` steps.
    pub fn valid_moves<'a>(&self, player: Player, roll: u8, out: &'a mut MoveList) -> &'a [Location] {
        out.clear();
        if roll == 0 {
            return out.as_slice();
        }
        for &from in Self::path(player).iter() {
            if self.is_valid_move_from(player, from, roll) {
                out.push(from);
            }
        }
        out.as_slice()
    }
}
