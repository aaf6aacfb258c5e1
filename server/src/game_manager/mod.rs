use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{server_packet_set, ClientPacket, ServerPacket};
use std::collections::HashSet;
use std::sync::PoisonError;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use ur_core::protocol::PacketSet;

pub mod lifecycle;
pub mod matchmaking;
pub mod move_handler;
pub mod session;
#[cfg(test)]
pub mod tests;

pub use session::{Client, GameSession, Tx};

const MIN_MESSAGE_INTERVAL: Duration = Duration::from_millis(100);

pub struct AppState {
    pub clients: DashMap<String, Client>,
    pub games: DashMap<String, RwLock<GameSession>>,
    /// Private games waiting for their second player, keyed by game id.
    pub pending_games: DashMap<String, String>,
    pub player_to_game: DashMap<String, String>,
    pub matchmaking_queue: Mutex<HashSet<String>>,
    pub packets: PacketSet<ClientPacket>,
    rng: std::sync::Mutex<StdRng>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            clients: DashMap::new(),
            games: DashMap::new(),
            pending_games: DashMap::new(),
            player_to_game: DashMap::new(),
            matchmaking_queue: Mutex::new(HashSet::new()),
            packets: server_packet_set(cfg!(debug_assertions)),
            rng: std::sync::Mutex::new(rng),
        }
    }

    /// Dice and colour draws share one generator. Never held across an await.
    pub(crate) fn with_rng_mut<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    pub fn check_rate_limit(&self, player_id: &str) -> bool {
        let Some(mut client) = self.clients.get_mut(player_id) else {
            return false;
        };
        let now = Instant::now();
        if client
            .last_msg_at
            .is_some_and(|last| now.duration_since(last) < MIN_MESSAGE_INTERVAL)
        {
            return false;
        }
        client.last_msg_at = Some(now);
        true
    }

    pub fn send(&self, player_id: &str, packet: ServerPacket) {
        if let Some(client) = self.clients.get(player_id) {
            // The socket may already be closing.
            let _ = client.tx.send(packet);
        }
    }

    pub fn broadcast(&self, player_ids: &[String], packet: &ServerPacket) {
        for id in player_ids {
            self.send(id, packet.clone());
        }
    }

    pub fn send_error(&self, player_id: &str, message: impl Into<String>) {
        self.send(
            player_id,
            ServerPacket::Error {
                message: message.into(),
            },
        );
    }

    /// Dispatches one decoded packet. Returns the connection's new id when a
    /// `reopen` adopted a previous one.
    pub async fn handle_packet(&self, player_id: &str, packet: ClientPacket) -> Option<String> {
        let opened = self
            .clients
            .get(player_id)
            .is_some_and(|client| client.opened);
        match packet {
            ClientPacket::Open { version, name } => {
                self.handle_open(player_id, version, name);
                None
            }
            ClientPacket::Reopen {
                version,
                previous_id,
                name,
            } => self.handle_reopen(player_id, version, &previous_id, name),
            _ if !opened => {
                tracing::warn!(player_id = %player_id, "Packet before open, rejecting");
                self.send_error(player_id, "Connection has not been opened");
                None
            }
            ClientPacket::FindGame => {
                self.find_game(player_id).await;
                None
            }
            ClientPacket::CreateGame => {
                self.create_game(player_id).await;
                None
            }
            ClientPacket::JoinGame { game_id } => {
                self.join_game(player_id, &game_id).await;
                None
            }
            ClientPacket::Roll => {
                self.handle_roll(player_id).await;
                None
            }
            ClientPacket::Move { from } => {
                self.handle_move(player_id, from).await;
                None
            }
        }
    }
}
