use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::arcade_car::types::InputEvent;
use crate::state::SharedGameState;

/// Inbound client messages, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Input {
        #[serde(default)]
        steer: f32,
        #[serde(default)]
        throttle: f32,
    },
    Brake {
        value: f32,
    },
    Drift {
        held: bool,
    },
    Reset,
    EnableInput {
        enabled: bool,
    },
    Ping,
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> Option<Self> {
        serde_json::from_str(txt).ok()
    }

    /// Controller events for this message; empty for `Ping`.
    pub fn into_events(self) -> Vec<InputEvent> {
        match self {
            ClientMessage::Input { steer, throttle } => {
                vec![InputEvent::Steer(steer), InputEvent::Throttle(throttle)]
            }
            ClientMessage::Brake { value } => vec![InputEvent::Brake(value)],
            ClientMessage::Drift { held: true } => vec![InputEvent::DriftPressed],
            ClientMessage::Drift { held: false } => vec![InputEvent::DriftReleased],
            ClientMessage::Reset => vec![InputEvent::Reset],
            ClientMessage::EnableInput { enabled } => vec![InputEvent::SetInputEnabled(enabled)],
            ClientMessage::Ping => Vec::new(),
        }
    }
}

pub fn welcome_message(session_id: Uuid) -> String {
    serde_json::json!({ "type": "welcome", "session_id": session_id }).to_string()
}

pub async fn start_websocket_server(
    addr: String,
    state: Arc<Mutex<SharedGameState>>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "websocket listening");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };
        debug!(%peer, "tcp connection");
        tokio::spawn(handle_connection(raw, Arc::clone(&state)));
    }
}

async fn handle_connection(raw: TcpStream, state: Arc<Mutex<SharedGameState>>) {
    let ws = match accept_async(raw).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!(%err, "websocket handshake failed");
            return;
        }
    };
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing message channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let session_id = Uuid::new_v4();

    state.lock().await.register_client(session_id, tx.clone());

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(err) = write.send(Message::Text(msg)).await {
                debug!(%err, "send loop closed");
                break;
            }
        }
    });

    info!(%session_id, "client connected");
    let _ = tx.send(welcome_message(session_id));

    // -------------------------------
    // 2) Receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(err) => {
                warn!(%session_id, %err, "websocket read failed");
                break;
            }
        };

        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        let Some(parsed) = ClientMessage::from_json(&text) else {
            debug!(%session_id, %text, "ignoring unknown message");
            continue;
        };

        if parsed == ClientMessage::Ping {
            let _ = tx.send(r#"{"type":"pong"}"#.to_string());
            continue;
        }

        state.lock().await.push_input(parsed.into_events());
    }

    info!(%session_id, "client disconnected");
    state.lock().await.remove_client(&session_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_input_axes() {
        let msg = ClientMessage::from_json(r#"{"type":"input","steer":0.5,"throttle":-1}"#).unwrap();
        assert_eq!(msg.into_events(), vec![InputEvent::Steer(0.5), InputEvent::Throttle(-1.0)]);
    }

    #[test]
    fn parses_triggers() {
        let press = ClientMessage::from_json(r#"{"type":"drift","held":true}"#).unwrap();
        assert_eq!(press.into_events(), vec![InputEvent::DriftPressed]);
        let reset = ClientMessage::from_json(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(reset.into_events(), vec![InputEvent::Reset]);
        let enable = ClientMessage::from_json(r#"{"type":"enable_input","enabled":false}"#).unwrap();
        assert_eq!(enable.into_events(), vec![InputEvent::SetInputEnabled(false)]);
    }

    #[test]
    fn ping_and_garbage() {
        assert_eq!(ClientMessage::from_json(r#"{"type":"ping"}"#), Some(ClientMessage::Ping));
        assert!(ClientMessage::from_json(r#"{"type":"fly"}"#).is_none());
        assert!(ClientMessage::from_json("not json").is_none());
    }

    #[test]
    fn welcome_carries_session_id() {
        let id = Uuid::new_v4();
        let v: serde_json::Value = serde_json::from_str(&welcome_message(id)).unwrap();
        assert_eq!(v["type"], "welcome");
        assert_eq!(v["session_id"], id.to_string());
    }
}
