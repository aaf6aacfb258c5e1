use crate::game_manager::{AppState, Client, Tx};
use shared::{ServerPacket, PROTOCOL_VERSION};
use std::sync::Arc;
use std::time::{Duration, Instant};
use ur_core::logic::board::Seat;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
const GAME_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

impl AppState {
    pub fn add_player(&self, id: String, tx: Tx) {
        tracing::info!(player_id = %id, "Player connected");
        self.clients.insert(
            id,
            Client {
                tx,
                name: String::new(),
                opened: false,
                last_msg_at: None,
            },
        );
    }

    fn check_version(&self, player_id: &str, version: u32) -> bool {
        if version == PROTOCOL_VERSION {
            return true;
        }
        tracing::warn!(player_id = %player_id, version, "Unsupported protocol version");
        self.send_error(
            player_id,
            format!("Unsupported protocol version {version}, expected {PROTOCOL_VERSION}"),
        );
        false
    }

    pub fn handle_open(&self, player_id: &str, version: u32, name: String) {
        if !self.check_version(player_id, version) {
            return;
        }
        if let Some(mut client) = self.clients.get_mut(player_id) {
            client.name = name;
            client.opened = true;
        }
        tracing::info!(player_id = %player_id, "Connection opened");
        self.send(
            player_id,
            ServerPacket::SetId {
                id: player_id.to_owned(),
            },
        );
    }

    /// Adopts `previous_id` when no live connection or game holds it.
    pub fn handle_reopen(
        &self,
        player_id: &str,
        version: u32,
        previous_id: &str,
        name: String,
    ) -> Option<String> {
        if !self.check_version(player_id, version) {
            return None;
        }
        let in_use = previous_id == player_id
            || self.clients.contains_key(previous_id)
            || self.player_to_game.contains_key(previous_id);
        if in_use {
            tracing::info!(player_id = %player_id, previous_id = %previous_id, "Previous id in use, keeping new id");
            self.handle_open(player_id, version, name);
            return None;
        }

        let (_, mut client) = self.clients.remove(player_id)?;
        client.name = name;
        client.opened = true;
        self.clients.insert(previous_id.to_owned(), client);
        tracing::info!(player_id = %player_id, previous_id = %previous_id, "Connection reopened with previous id");
        self.send(
            previous_id,
            ServerPacket::SetId {
                id: previous_id.to_owned(),
            },
        );
        Some(previous_id.to_owned())
    }

    pub async fn remove_player(&self, id: &str) {
        tracing::info!(player_id = %id, "Removing player");
        self.clients.remove(id);

        {
            let mut queue = self.matchmaking_queue.lock().await;
            if queue.remove(id) {
                tracing::info!(player_id = %id, "Player removed from matchmaking queue");
            }
        }
        self.pending_games.retain(|_, creator| creator != id);

        let Some((_, game_id)) = self.player_to_game.remove(id) else {
            return;
        };
        let Some((_, game_lock)) = self.games.remove(&game_id) else {
            return;
        };
        let mut game = game_lock.write().await;
        let Some(color) = game.color_of(id) else {
            return;
        };
        game.set_connected(color, false);
        let opponent_id = game.id_of(color.opposite()).to_owned();
        let game_ended = game.game_ended;
        drop(game);

        self.player_to_game.remove(&opponent_id);
        if game_ended {
            return;
        }
        tracing::info!(game_id = %game_id, player_id = %id, opponent_id = %opponent_id, "Game ended by disconnect");
        self.send(
            &opponent_id,
            ServerPacket::PlayerStatus {
                seat: Seat::from(color),
                connected: false,
            },
        );
        self.send(
            &opponent_id,
            ServerPacket::GameEnd {
                reason: "Opponent disconnected".to_owned(),
            },
        );
    }

    /// Drops the bookkeeping of a finished game.
    pub(crate) fn close_game(&self, game_id: &str, player_ids: &[String]) {
        self.games.remove(game_id);
        for id in player_ids {
            self.player_to_game.remove(id);
        }
    }

    pub fn spawn_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                self.remove_idle_games(Instant::now(), GAME_IDLE_TIMEOUT).await;
            }
        });
    }

    pub async fn remove_idle_games(&self, now: Instant, timeout: Duration) {
        let mut idle = Vec::new();
        for entry in self.games.iter() {
            let game = entry.value().read().await;
            if now.duration_since(game.last_activity) > timeout {
                idle.push((entry.key().clone(), game.player_ids()));
            }
        }

        for (game_id, player_ids) in idle {
            tracing::info!(game_id = %game_id, "Cleaning up inactive game");
            self.close_game(&game_id, &player_ids);
        }
    }
}
