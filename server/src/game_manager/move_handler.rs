use crate::game_manager::AppState;
use shared::{RollInfo, ServerPacket};
use ur_core::engine::move_list::MoveList;
use ur_core::logic::board::{Location, Player};
use ur_core::logic::dice::Dice;

/// What a turn action produced, sent once the session lock is released.
struct TurnOutcome {
    player_ids: [String; 2],
    packets: Vec<ServerPacket>,
    finished: bool,
}

impl AppState {
    fn game_of(&self, player_id: &str) -> Option<String> {
        self.player_to_game
            .get(player_id)
            .map(|game_id| game_id.value().clone())
    }

    fn publish(&self, game_id: &str, outcome: TurnOutcome) {
        for packet in &outcome.packets {
            self.broadcast(&outcome.player_ids, packet);
        }
        if outcome.finished {
            tracing::info!(game_id = %game_id, "Game finished");
            self.close_game(game_id, &outcome.player_ids);
        }
    }

    /// Why a player of `color` may not act right now, if anything stops them.
    fn mover_error(game_ended: bool, color: Option<Player>, active: Player) -> Option<&'static str> {
        if game_ended {
            Some("The game is over")
        } else if color != Some(active) {
            Some("It is not your turn")
        } else {
            None
        }
    }

    pub async fn handle_roll(&self, player_id: &str) {
        let Some(game_id) = self.game_of(player_id) else {
            tracing::warn!(player_id = %player_id, "Roll from player without a game");
            self.send_error(player_id, "You are not in a game");
            return;
        };

        let outcome = {
            let Some(game_lock) = self.games.get(&game_id) else {
                return;
            };
            let mut game = game_lock.write().await;

            let color = game.color_of(player_id);
            if let Some(error) = Self::mover_error(game.game_ended, color, game.state.active_player) {
                tracing::warn!(player_id = %player_id, game_id = %game_id, error, "Roll rejected");
                self.send_error(player_id, error);
                return;
            }
            if game.roll.is_some() {
                tracing::warn!(player_id = %player_id, game_id = %game_id, "Roll rejected, already rolled");
                self.send_error(player_id, "You have already rolled");
                return;
            }

            let dice = self.with_rng_mut(|rng| Dice::roll(rng));
            let mut moves = MoveList::new();
            let has_moves = !game
                .state
                .get_valid_moves(dice.value(), &mut moves)
                .is_empty();
            tracing::info!(game_id = %game_id, player_id = %player_id, roll = dice.value(), has_moves, "Dice rolled");

            game.touch();
            game.roll = Some(RollInfo { dice, has_moves });
            let mut packets = vec![game.state_update()];
            if !has_moves {
                game.state.swap_active_player();
                game.roll = None;
                packets.push(game.state_update());
            }
            TurnOutcome {
                player_ids: game.player_ids(),
                packets,
                finished: false,
            }
        };
        self.publish(&game_id, outcome);
    }

    pub async fn handle_move(&self, player_id: &str, from: Location) {
        let Some(game_id) = self.game_of(player_id) else {
            tracing::warn!(player_id = %player_id, "Move from player without a game");
            self.send_error(player_id, "You are not in a game");
            return;
        };

        let outcome = {
            let Some(game_lock) = self.games.get(&game_id) else {
                return;
            };
            let mut game = game_lock.write().await;

            let color = game.color_of(player_id);
            if let Some(error) = Self::mover_error(game.game_ended, color, game.state.active_player) {
                tracing::warn!(player_id = %player_id, game_id = %game_id, error, "Move rejected");
                self.send_error(player_id, error);
                return;
            }
            let Some(roll) = game.roll else {
                tracing::warn!(player_id = %player_id, game_id = %game_id, "Move rejected, no roll yet");
                self.send_error(player_id, "You must roll before moving");
                return;
            };

            let to = match game.state.apply_move(from, roll.dice.value()) {
                Ok(to) => to,
                Err(err) => {
                    tracing::warn!(player_id = %player_id, game_id = %game_id, error = %err, "Move rejected");
                    self.send_error(player_id, err.to_string());
                    return;
                }
            };
            tracing::info!(game_id = %game_id, player_id = %player_id, from = %from, to = %to, "Move applied");

            game.touch();
            game.roll = None;
            let mut packets = vec![ServerPacket::Move { from, to }, game.state_update()];
            if let Some(winner) = game.state.winner() {
                game.game_ended = true;
                let name = game.name_of(winner);
                let reason = if name.is_empty() {
                    format!("{winner} won")
                } else {
                    format!("{name} won")
                };
                packets.push(ServerPacket::GameEnd { reason });
            }
            TurnOutcome {
                player_ids: game.player_ids(),
                packets,
                finished: game.game_ended,
            }
        };
        self.publish(&game_id, outcome);
    }
}
