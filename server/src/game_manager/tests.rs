use super::*;
use shared::{GameInfo, RollInfo, ServerPacket, StateUpdate, PROTOCOL_VERSION};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use ur_core::logic::board::{Board, Location, Player, Seat, Tile, LIGHT_PATH};
use ur_core::logic::dice::Dice;
use ur_core::logic::game::{GameState, PlayerState};

type Rx = mpsc::UnboundedReceiver<ServerPacket>;

// Helper to receive next packet with timeout
async fn expect_packet(rx: &mut Rx) -> ServerPacket {
    tokio::time::timeout(Duration::from_millis(1500), rx.recv())
        .await
        .expect("Timed out waiting for packet")
        .expect("Channel closed")
}

async fn expect_silence(rx: &mut Rx) {
    if let Ok(Some(packet)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
        panic!("unexpected packet {packet:?}");
    }
}

async fn connect(state: &AppState, id: &str, name: &str) -> Rx {
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.add_player(id.to_string(), tx);
    state
        .handle_packet(id, ClientPacket::open(name))
        .await;
    assert_eq!(
        expect_packet(&mut rx).await,
        ServerPacket::SetId { id: id.to_string() }
    );
    rx
}

fn one() -> RollInfo {
    RollInfo {
        dice: Dice::from_values([1, 4, 4, 4]),
        has_moves: true,
    }
}

async fn expect_game(rx: &mut Rx) -> GameInfo {
    match expect_packet(rx).await {
        ServerPacket::Game(info) => info,
        other => panic!("expected game, got {other:?}"),
    }
}

async fn expect_state(rx: &mut Rx) -> StateUpdate {
    match expect_packet(rx).await {
        ServerPacket::State(update) => update,
        other => panic!("expected state, got {other:?}"),
    }
}

struct Match {
    game_id: String,
    light: (String, Rx),
    dark: (String, Rx),
}

async fn start_match(state: &AppState) -> Match {
    let mut rx1 = connect(state, "p1", "Ann").await;
    let mut rx2 = connect(state, "p2", "Bob").await;
    state.handle_packet("p1", ClientPacket::FindGame).await;
    state.handle_packet("p2", ClientPacket::FindGame).await;

    let info1 = expect_game(&mut rx1).await;
    let info2 = expect_game(&mut rx2).await;
    assert_eq!(info1.game_id, info2.game_id);
    assert_ne!(info1.own_seat, info2.own_seat);
    expect_state(&mut rx1).await;
    expect_state(&mut rx2).await;

    let game_id = info1.game_id.clone();
    if info1.own_seat == Seat::Light {
        Match {
            game_id,
            light: ("p1".to_string(), rx1),
            dark: ("p2".to_string(), rx2),
        }
    } else {
        Match {
            game_id,
            light: ("p2".to_string(), rx2),
            dark: ("p1".to_string(), rx1),
        }
    }
}

async fn inject_roll(state: &AppState, game_id: &str, roll: RollInfo) {
    let game_lock = state.games.get(game_id).expect("Game session missing");
    game_lock.write().await.roll = Some(roll);
}

#[tokio::test]
async fn test_open_assigns_id() {
    let state = AppState::with_seed(1);
    let _rx = connect(&state, "p1", "Ann").await;
    let client = state.clients.get("p1").unwrap();
    assert!(client.opened);
    assert_eq!(client.name, "Ann");
}

#[tokio::test]
async fn test_open_rejects_other_versions() {
    let state = AppState::with_seed(1);
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.add_player("p1".to_string(), tx);
    state
        .handle_packet(
            "p1",
            ClientPacket::Open {
                version: PROTOCOL_VERSION + 1,
                name: "Ann".to_string(),
            },
        )
        .await;
    assert!(matches!(expect_packet(&mut rx).await, ServerPacket::Error { .. }));
    assert!(!state.clients.get("p1").unwrap().opened);
}

#[tokio::test]
async fn test_packets_before_open_are_rejected() {
    let state = AppState::with_seed(1);
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.add_player("p1".to_string(), tx);
    state.handle_packet("p1", ClientPacket::FindGame).await;
    assert!(matches!(expect_packet(&mut rx).await, ServerPacket::Error { .. }));
    assert!(state.matchmaking_queue.lock().await.is_empty());
}

#[tokio::test]
async fn test_find_game_pairs_players() {
    let state = AppState::with_seed(7);
    let mut rx1 = connect(&state, "p1", "Ann").await;
    let _rx2 = connect(&state, "p2", "Bob").await;

    state.handle_packet("p1", ClientPacket::FindGame).await;
    expect_silence(&mut rx1).await;
    assert!(state.matchmaking_queue.lock().await.contains("p1"));

    state.handle_packet("p2", ClientPacket::FindGame).await;
    let info = expect_game(&mut rx1).await;
    assert_eq!(info.game_id.len(), 6);
    assert!(info.light_connected && info.dark_connected);
    let names = [info.light_name.as_str(), info.dark_name.as_str()];
    assert!(names.contains(&"Ann") && names.contains(&"Bob"));

    let update = expect_state(&mut rx1).await;
    assert_eq!(update.state, GameState::new());
    assert_eq!(update.roll, None);
    assert!(state.matchmaking_queue.lock().await.is_empty());
    assert_eq!(state.player_to_game.len(), 2);
}

#[tokio::test]
async fn test_private_game() {
    let state = AppState::with_seed(3);
    let mut rx1 = connect(&state, "p1", "Ann").await;
    let mut rx2 = connect(&state, "p2", "Bob").await;

    state.handle_packet("p1", ClientPacket::CreateGame).await;
    let ServerPacket::GamePending { game_id } = expect_packet(&mut rx1).await else {
        panic!("expected game_pending");
    };
    assert_eq!(game_id.len(), 6);

    state
        .handle_packet(
            "p2",
            ClientPacket::JoinGame {
                game_id: "ZZZZZ1".to_string(),
            },
        )
        .await;
    assert_eq!(
        expect_packet(&mut rx2).await,
        ServerPacket::InvalidGame {
            game_id: "ZZZZZ1".to_string()
        }
    );

    state
        .handle_packet(
            "p2",
            ClientPacket::JoinGame {
                game_id: game_id.clone(),
            },
        )
        .await;
    assert_eq!(expect_game(&mut rx1).await.game_id, game_id);
    assert_eq!(expect_game(&mut rx2).await.game_id, game_id);
    assert!(state.pending_games.is_empty());
    assert!(state.games.contains_key(&game_id));
}

#[tokio::test]
async fn test_roll_out_of_turn_is_rejected() {
    let state = AppState::with_seed(5);
    let Match {
        dark: (dark_id, mut dark_rx),
        light: (_, mut light_rx),
        ..
    } = start_match(&state).await;

    state.handle_packet(&dark_id, ClientPacket::Roll).await;
    assert_eq!(
        expect_packet(&mut dark_rx).await,
        ServerPacket::Error {
            message: "It is not your turn".to_string()
        }
    );
    expect_silence(&mut light_rx).await;
}

#[tokio::test]
async fn test_roll_is_broadcast() {
    let state = AppState::with_seed(11);
    let Match {
        light: (light_id, mut light_rx),
        dark: (_, mut dark_rx),
        ..
    } = start_match(&state).await;

    state.handle_packet(&light_id, ClientPacket::Roll).await;
    let light_update = expect_state(&mut light_rx).await;
    let dark_update = expect_state(&mut dark_rx).await;
    assert_eq!(light_update, dark_update);

    let roll = light_update.roll.expect("roll should be attached");
    assert_eq!(roll.has_moves, roll.dice.value() > 0);
    if roll.has_moves {
        expect_silence(&mut light_rx).await;
    } else {
        let passed = expect_state(&mut light_rx).await;
        assert_eq!(passed.state.active_player, Player::Dark);
        assert_eq!(passed.roll, None);
    }
}

#[tokio::test]
async fn test_second_roll_is_rejected() {
    let state = AppState::with_seed(2);
    let Match {
        game_id,
        light: (light_id, mut light_rx),
        ..
    } = start_match(&state).await;
    inject_roll(&state, &game_id, one()).await;

    state.handle_packet(&light_id, ClientPacket::Roll).await;
    assert_eq!(
        expect_packet(&mut light_rx).await,
        ServerPacket::Error {
            message: "You have already rolled".to_string()
        }
    );
}

#[tokio::test]
async fn test_move_requires_roll() {
    let state = AppState::with_seed(2);
    let Match {
        light: (light_id, mut light_rx),
        ..
    } = start_match(&state).await;

    state
        .handle_packet(
            &light_id,
            ClientPacket::Move {
                from: Board::start(Player::Light),
            },
        )
        .await;
    assert!(matches!(expect_packet(&mut light_rx).await, ServerPacket::Error { .. }));
}

#[tokio::test]
async fn test_move_is_applied_and_broadcast() {
    let state = AppState::with_seed(4);
    let Match {
        game_id,
        light: (light_id, mut light_rx),
        dark: (_, mut dark_rx),
    } = start_match(&state).await;
    inject_roll(&state, &game_id, one()).await;

    let from = Board::start(Player::Light);
    state
        .handle_packet(&light_id, ClientPacket::Move { from })
        .await;

    for rx in [&mut light_rx, &mut dark_rx] {
        assert_eq!(
            expect_packet(rx).await,
            ServerPacket::Move {
                from,
                to: LIGHT_PATH[1]
            }
        );
        let update = expect_state(rx).await;
        assert_eq!(update.roll, None);
        assert_eq!(update.state.active_player, Player::Dark);
        assert_eq!(update.state.light.tiles, 6);
        assert_eq!(update.state.board.get_tile(LIGHT_PATH[1]), Tile::of(Player::Light));
    }
}

#[tokio::test]
async fn test_illegal_move_is_rejected() {
    let state = AppState::with_seed(4);
    let Match {
        game_id,
        light: (light_id, mut light_rx),
        dark: (_, mut dark_rx),
    } = start_match(&state).await;
    inject_roll(&state, &game_id, one()).await;

    state
        .handle_packet(
            &light_id,
            ClientPacket::Move {
                from: Location::new(1, 1),
            },
        )
        .await;
    assert!(matches!(expect_packet(&mut light_rx).await, ServerPacket::Error { .. }));
    expect_silence(&mut dark_rx).await;

    let game_lock = state.games.get(&game_id).unwrap();
    let game = game_lock.read().await;
    assert_eq!(game.state, GameState::new());
    assert_eq!(game.roll, Some(one()));
}

#[tokio::test]
async fn test_winning_move_ends_game() {
    let state = AppState::with_seed(9);
    let Match {
        game_id,
        light: (light_id, mut light_rx),
        dark: (_, mut dark_rx),
    } = start_match(&state).await;

    let mut board = Board::new();
    board.set_tile(LIGHT_PATH[14], Tile::of(Player::Light));
    let near_win = GameState::from_parts(
        board,
        PlayerState::new(0, 6),
        PlayerState::starting(),
        Player::Light,
    )
    .unwrap();
    {
        let game_lock = state.games.get(&game_id).unwrap();
        let mut game = game_lock.write().await;
        game.state = near_win;
        game.roll = Some(one());
    }

    state
        .handle_packet(
            &light_id,
            ClientPacket::Move {
                from: LIGHT_PATH[14],
            },
        )
        .await;

    for rx in [&mut light_rx, &mut dark_rx] {
        assert_eq!(
            expect_packet(rx).await,
            ServerPacket::Move {
                from: LIGHT_PATH[14],
                to: Board::end(Player::Light)
            }
        );
        let update = expect_state(rx).await;
        assert!(update.state.won);
        assert_eq!(update.state.light.score, 7);
        assert!(matches!(expect_packet(rx).await, ServerPacket::GameEnd { .. }));
    }
    assert!(!state.games.contains_key(&game_id));
    assert!(state.player_to_game.is_empty());
}

#[tokio::test]
async fn test_disconnect_ends_game_for_opponent() {
    let state = AppState::with_seed(6);
    let Match {
        game_id,
        light: (light_id, _light_rx),
        dark: (dark_id, mut dark_rx),
    } = start_match(&state).await;

    state.remove_player(&light_id).await;
    assert_eq!(
        expect_packet(&mut dark_rx).await,
        ServerPacket::PlayerStatus {
            seat: Seat::Light,
            connected: false
        }
    );
    assert!(matches!(expect_packet(&mut dark_rx).await, ServerPacket::GameEnd { .. }));
    assert!(!state.games.contains_key(&game_id));
    assert!(!state.player_to_game.contains_key(&dark_id));
    assert!(!state.clients.contains_key(&light_id));
}

#[tokio::test]
async fn test_disconnect_leaves_queue_and_pending_games() {
    let state = AppState::with_seed(6);
    let _rx1 = connect(&state, "p1", "Ann").await;
    let mut rx2 = connect(&state, "p2", "Bob").await;
    state.handle_packet("p1", ClientPacket::FindGame).await;
    state.handle_packet("p2", ClientPacket::CreateGame).await;
    expect_packet(&mut rx2).await;

    state.remove_player("p1").await;
    state.remove_player("p2").await;
    assert!(state.matchmaking_queue.lock().await.is_empty());
    assert!(state.pending_games.is_empty());
}

#[tokio::test]
async fn test_reopen_adopts_unused_id() {
    let state = AppState::with_seed(8);
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.add_player("fresh".to_string(), tx);

    let adopted = state
        .handle_packet("fresh", ClientPacket::reopen("previous", "Ann"))
        .await;
    assert_eq!(adopted.as_deref(), Some("previous"));
    assert_eq!(
        expect_packet(&mut rx).await,
        ServerPacket::SetId {
            id: "previous".to_string()
        }
    );
    assert!(state.clients.contains_key("previous"));
    assert!(!state.clients.contains_key("fresh"));
}

#[tokio::test]
async fn test_reopen_keeps_id_when_previous_in_use() {
    let state = AppState::with_seed(8);
    let _rx1 = connect(&state, "p1", "Ann").await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.add_player("p2".to_string(), tx);

    let adopted = state
        .handle_packet("p2", ClientPacket::reopen("p1", "Bob"))
        .await;
    assert_eq!(adopted, None);
    assert_eq!(
        expect_packet(&mut rx).await,
        ServerPacket::SetId {
            id: "p2".to_string()
        }
    );
}

#[tokio::test]
async fn test_rate_limit() {
    let state = AppState::with_seed(1);
    let _rx = connect(&state, "p1", "Ann").await;
    assert!(state.check_rate_limit("p1"));
    assert!(!state.check_rate_limit("p1"));
    assert!(!state.check_rate_limit("nobody"));
}

#[tokio::test]
async fn test_idle_games_are_cleaned_up() {
    let state = AppState::with_seed(12);
    let Match { game_id, .. } = start_match(&state).await;

    state
        .remove_idle_games(Instant::now(), Duration::from_secs(3600))
        .await;
    assert!(state.games.contains_key(&game_id));

    state
        .remove_idle_games(
            Instant::now() + Duration::from_secs(7200),
            Duration::from_secs(3600),
        )
        .await;
    assert!(!state.games.contains_key(&game_id));
    assert!(state.player_to_game.is_empty());
}
