use shared::{GameInfo, RollInfo, ServerPacket, StateUpdate};
use std::time::Instant;
use tokio::sync::mpsc;
use ur_core::logic::board::{Player, Seat};
use ur_core::logic::game::GameState;

pub type Tx = mpsc::UnboundedSender<ServerPacket>;

/// A connected socket. `opened` flips once the client has sent a valid `open`.
pub struct Client {
    pub tx: Tx,
    pub name: String,
    pub opened: bool,
    pub last_msg_at: Option<Instant>,
}

pub struct GameSession {
    pub game_id: String,
    pub light_player: String,
    pub dark_player: String,
    pub light_name: String,
    pub dark_name: String,
    pub state: GameState,
    /// The mover's roll for this turn, cleared once the turn passes.
    pub roll: Option<RollInfo>,
    pub light_connected: bool,
    pub dark_connected: bool,
    pub game_ended: bool,
    pub last_activity: Instant,
}

impl GameSession {
    pub fn new(
        game_id: String,
        (light_player, light_name): (String, String),
        (dark_player, dark_name): (String, String),
    ) -> Self {
        Self {
            game_id,
            light_player,
            dark_player,
            light_name,
            dark_name,
            state: GameState::new(),
            roll: None,
            light_connected: true,
            dark_connected: true,
            game_ended: false,
            last_activity: Instant::now(),
        }
    }

    pub fn color_of(&self, player_id: &str) -> Option<Player> {
        if self.light_player == player_id {
            Some(Player::Light)
        } else if self.dark_player == player_id {
            Some(Player::Dark)
        } else {
            None
        }
    }

    pub fn id_of(&self, player: Player) -> &str {
        match player {
            Player::Light => &self.light_player,
            Player::Dark => &self.dark_player,
        }
    }

    pub fn name_of(&self, player: Player) -> &str {
        match player {
            Player::Light => &self.light_name,
            Player::Dark => &self.dark_name,
        }
    }

    pub fn set_connected(&mut self, player: Player, connected: bool) {
        match player {
            Player::Light => self.light_connected = connected,
            Player::Dark => self.dark_connected = connected,
        }
    }

    pub fn player_ids(&self) -> [String; 2] {
        [self.light_player.clone(), self.dark_player.clone()]
    }

    pub fn state_update(&self) -> ServerPacket {
        ServerPacket::State(StateUpdate {
            state: self.state,
            roll: self.roll,
        })
    }

    pub fn game_info(&self, own_seat: Seat) -> ServerPacket {
        ServerPacket::Game(GameInfo {
            game_id: self.game_id.clone(),
            own_seat,
            light_name: self.light_name.clone(),
            dark_name: self.dark_name.clone(),
            light_connected: self.light_connected,
            dark_connected: self.dark_connected,
        })
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
