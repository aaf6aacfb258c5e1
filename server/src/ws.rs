use crate::game_manager::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut player_id = uuid::Uuid::new_v4().to_string();
    state.add_player(player_id.clone(), tx);

    let encoder = Arc::clone(&state);
    let forward_id = player_id.clone();
    let mut forward = tokio::spawn(async move {
        while let Some(packet) = rx.recv().await {
            let raw = match encoder.packets.encode(&packet) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::error!(player_id = %forward_id, error = %err, "Failed to encode outgoing packet");
                    continue;
                }
            };
            if sender.send(Message::Text(raw)).await.is_err() {
                break;
            }
        }
    });

    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = &mut forward => break,
        };
        let Some(Ok(msg)) = msg else {
            break;
        };
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        if !state.check_rate_limit(&player_id) {
            tracing::warn!(player_id = %player_id, "Rate limit exceeded, dropping packet");
            continue;
        }

        match state.packets.read_packet(&text) {
            Ok(read) => {
                tracing::debug!(player_id = %player_id, packet = read.name, "Received packet");
                if let Some(new_id) = state.handle_packet(&player_id, read.packet).await {
                    player_id = new_id;
                }
            }
            Err(err) => {
                tracing::warn!(player_id = %player_id, error = %err, "Rejected malformed packet");
                state.send_error(&player_id, format!("Malformed packet: {err}"));
            }
        }
    }

    state.remove_player(&player_id).await;
    forward.abort();
}
