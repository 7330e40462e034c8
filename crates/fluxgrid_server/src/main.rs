use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use fluxgrid_net::{ClientMessage, RoomSummary, ServerMessage};
use fluxgrid_server::session::{ConnId, Outbound, SessionManager};
use fluxgrid_server::ServerConfig;
use futures::{sink::SinkExt, stream::StreamExt};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Server state: the session manager plus one outbound channel per live
/// connection.
struct AppState {
    config: ServerConfig,
    sessions: Mutex<SessionManager>,
    outboxes: Mutex<HashMap<ConnId, mpsc::UnboundedSender<ServerMessage>>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "fluxgrid_server=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load("config.toml");
    let addr: SocketAddr = match format!("{}:{}", config.bind, config.port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("invalid bind address: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = Arc::new(AppState {
        sessions: Mutex::new(SessionManager::new(&config)),
        outboxes: Mutex::new(HashMap::new()),
        config,
    });

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/rooms", get(list_rooms))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Fluxgrid relay server listening on {}", addr);
    tracing::info!("    WebSocket: ws://{}/ws", addr);
    tracing::info!("    Rooms API: http://{}/api/rooms", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// REST endpoint: rooms still waiting for an opponent.
async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    let sessions = state.sessions.lock().unwrap_or_else(|e| e.into_inner());
    Json(sessions.waiting_rooms())
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket(socket, state))
}

async fn websocket(stream: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = stream.split();
    let client_id: ConnId = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state
        .outboxes
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(client_id, tx);
    tracing::info!("Client connected: {}", client_id);

    // Forward queued server messages to this client's socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let Message::Text(text) = frame else {
            continue;
        };
        if text.len() > state.config.max_frame_bytes {
            tracing::warn!(
                "Client {} sent oversized frame: {} bytes (max: {})",
                client_id,
                text.len(),
                state.config.max_frame_bytes
            );
            continue;
        }

        let msg = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(msg) => msg,
            Err(e) => {
                // Malformed frames only ever hurt their sender.
                tracing::warn!("Client {} sent malformed frame: {}", client_id, e);
                continue;
            }
        };

        let out = {
            let mut sessions = state.sessions.lock().unwrap_or_else(|e| e.into_inner());
            match msg {
                ClientMessage::Join { room_id } => sessions.join(client_id, &room_id),
                ClientMessage::SubmitMove {
                    room_id,
                    cell_id,
                    gate,
                    seed,
                } => sessions.submit_move(client_id, &room_id, cell_id, gate, seed),
            }
        };
        deliver(&state, out);
    }

    // Socket closed: drop the outbox, vacate the seat, tell the opponent.
    state
        .outboxes
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .remove(&client_id);
    let out = {
        let mut sessions = state.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.disconnect(client_id)
    };
    deliver(&state, out);
    tracing::info!("Client disconnected: {}", client_id);

    send_task.abort();
}

/// Routes session-manager outcomes to the owning connections' outboxes.
fn deliver(state: &AppState, out: Vec<Outbound>) {
    let outboxes = state.outboxes.lock().unwrap_or_else(|e| e.into_inner());
    for (to, msg) in out {
        if let Some(tx) = outboxes.get(&to) {
            let _ = tx.send(msg);
        }
    }
}
