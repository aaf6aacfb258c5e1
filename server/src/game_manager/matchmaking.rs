use crate::game_manager::{AppState, GameSession};
use rand::Rng;
use shared::ServerPacket;
use tokio::sync::RwLock;
use ur_core::logic::board::{Player, Seat};
use ur_core::protocol::GAME_ID_LENGTH;

const GAME_ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

impl AppState {
    fn is_busy(&self, player_id: &str) -> bool {
        self.player_to_game.contains_key(player_id)
            || self
                .pending_games
                .iter()
                .any(|entry| entry.value() == player_id)
    }

    pub async fn find_game(&self, player_id: &str) {
        if self.is_busy(player_id) {
            tracing::warn!(player_id = %player_id, "Player already in a game, ignoring find_game");
            self.send_error(player_id, "You are already in a game");
            return;
        }

        let mut queue = self.matchmaking_queue.lock().await;
        if queue.contains(player_id) {
            tracing::debug!(player_id = %player_id, "Player already in queue");
            return;
        }

        let opponent = queue.iter().next().cloned();
        if let Some(opponent_id) = opponent {
            tracing::info!(player_id = %player_id, opponent_id = %opponent_id, "Opponent found, starting game");
            queue.remove(&opponent_id);
            drop(queue);
            let game_id = self.new_game_id();
            self.start_game(game_id, &opponent_id, player_id).await;
        } else {
            tracing::info!(player_id = %player_id, "No opponent found, adding to queue");
            queue.insert(player_id.to_owned());
        }
    }

    pub async fn create_game(&self, player_id: &str) {
        if self.is_busy(player_id) {
            tracing::warn!(player_id = %player_id, "Player already in a game, ignoring create_game");
            self.send_error(player_id, "You are already in a game");
            return;
        }
        self.matchmaking_queue.lock().await.remove(player_id);

        let game_id = self.new_game_id();
        tracing::info!(player_id = %player_id, game_id = %game_id, "Private game created");
        self.pending_games
            .insert(game_id.clone(), player_id.to_owned());
        self.send(player_id, ServerPacket::GamePending { game_id });
    }

    pub async fn join_game(&self, player_id: &str, game_id: &str) {
        if self.is_busy(player_id) {
            tracing::warn!(player_id = %player_id, game_id = %game_id, "Player already in a game, ignoring join_game");
            self.send_error(player_id, "You are already in a game");
            return;
        }

        let creator = self
            .pending_games
            .remove(game_id)
            .map(|(_, creator)| creator)
            .filter(|creator| self.clients.contains_key(creator));
        let Some(creator_id) = creator else {
            tracing::info!(player_id = %player_id, game_id = %game_id, "Join rejected, no such game");
            self.send(
                player_id,
                ServerPacket::InvalidGame {
                    game_id: game_id.to_owned(),
                },
            );
            return;
        };

        self.matchmaking_queue.lock().await.remove(player_id);
        self.start_game(game_id.to_owned(), &creator_id, player_id)
            .await;
    }

    async fn start_game(&self, game_id: String, first_id: &str, second_id: &str) {
        let first_is_light = self.with_rng_mut(|rng| rng.gen_bool(0.5));
        let (light_id, dark_id) = if first_is_light {
            (first_id, second_id)
        } else {
            (second_id, first_id)
        };
        let name_of = |id: &str| {
            self.clients
                .get(id)
                .map(|client| client.name.clone())
                .unwrap_or_default()
        };

        let game = GameSession::new(
            game_id.clone(),
            (light_id.to_owned(), name_of(light_id)),
            (dark_id.to_owned(), name_of(dark_id)),
        );
        tracing::info!(game_id = %game_id, light = %light_id, dark = %dark_id, "Created new game session");

        let light_info = game.game_info(Seat::from(Player::Light));
        let dark_info = game.game_info(Seat::from(Player::Dark));
        let state = game.state_update();

        self.games.insert(game_id.clone(), RwLock::new(game));
        self.player_to_game
            .insert(light_id.to_owned(), game_id.clone());
        self.player_to_game.insert(dark_id.to_owned(), game_id);

        self.send(light_id, light_info);
        self.send(light_id, state.clone());
        self.send(dark_id, dark_info);
        self.send(dark_id, state);
    }

    /// A fresh game id that no running or pending game uses.
    pub fn new_game_id(&self) -> String {
        loop {
            let id: String = self.with_rng_mut(|rng| {
                (0..GAME_ID_LENGTH)
                    .map(|_| {
                        let index = rng.gen_range(0..GAME_ID_ALPHABET.len());
                        char::from(GAME_ID_ALPHABET.get(index).copied().unwrap_or(b'A'))
                    })
                    .collect()
            });
            if !self.games.contains_key(&id) && !self.pending_games.contains_key(&id) {
                return id;
            }
        }
    }
}
