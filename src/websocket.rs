//! WebSocket module for real-time dashboard updates
//!
//! Streams a fresh dashboard snapshot to connected clients whenever the
//! telemetry engine completes a tick.

use actix::{Actor, ActorContext, ActorFutureExt, AsyncContext, StreamHandler};
use actix_web_actors::ws;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::{WsClientMessage, WsMessage};
use crate::state::AppState;

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the session checks the engine for a new tick
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// WebSocket session actor
pub struct WsSession {
    client_id: String,
    last_heartbeat: Instant,
    state: Arc<RwLock<AppState>>,
    /// Tick counter value of the last snapshot pushed to this client
    last_tick_sent: u64,
}

impl WsSession {
    pub fn new(client_id: String, state: Arc<RwLock<AppState>>) -> Self {
        Self {
            client_id,
            last_heartbeat: Instant::now(),
            state,
            last_tick_sent: 0,
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    client_id = %act.client_id,
                    "WebSocket heartbeat timeout"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn start_snapshot_push(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(POLL_INTERVAL, |act, ctx| {
            let state = act.state.clone();

            let fut = async move {
                let state = state.read().await;
                (state.tick_count(), state.snapshot())
            };

            let fut = actix::fut::wrap_future::<_, Self>(fut);

            ctx.spawn(fut.map(|(tick, snapshot), act, ctx| {
                if tick > act.last_tick_sent {
                    act.last_tick_sent = tick;

                    let msg = WsMessage::Snapshot(snapshot);
                    if let Ok(json) = serde_json::to_string(&msg) {
                        ctx.text(json);
                    }
                }
            }));
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(client_id = %self.client_id, "WebSocket connected");

        self.start_heartbeat(ctx);
        self.start_snapshot_push(ctx);

        let msg = WsMessage::Connected {
            client_id: self.client_id.clone(),
        };

        if let Ok(json) = serde_json::to_string(&msg) {
            ctx.text(json);
        }
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        info!(client_id = %self.client_id, "WebSocket disconnected");

        let state = self.state.clone();
        let client_id = self.client_id.clone();

        actix_rt::spawn(async move {
            let mut state = state.write().await;
            state.remove_client(&client_id);
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                debug!(client_id = %self.client_id, message = %text);

                match serde_json::from_str::<WsClientMessage>(&text) {
                    Ok(WsClientMessage::Ping) => {
                        self.last_heartbeat = Instant::now();
                        if let Ok(json) = serde_json::to_string(&WsMessage::Pong) {
                            ctx.text(json);
                        }
                    }
                    Ok(WsClientMessage::Pong) => {
                        self.last_heartbeat = Instant::now();
                    }
                    Err(e) => {
                        warn!(client_id = %self.client_id, error = %e);
                        let err = WsMessage::Error {
                            message: "Invalid message format".into(),
                        };
                        if let Ok(json) = serde_json::to_string(&err) {
                            ctx.text(json);
                        }
                    }
                }
            }
            Ok(ws::Message::Close(reason)) => {
                info!(client_id = %self.client_id, reason = ?reason);
                ctx.stop();
            }
            Err(e) => {
                warn!(client_id = %self.client_id, error = %e);
                ctx.stop();
            }
            _ => {}
        }
    }
}
