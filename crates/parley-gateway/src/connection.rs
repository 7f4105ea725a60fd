use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use parley_db::Database;
use parley_types::events::{GatewayCommand, GatewayEvent};

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Handle a single WebSocket connection from registration to disconnect.
pub async fn handle_connection(socket: WebSocket, dispatcher: Dispatcher, db: Arc<Database>) {
    let (mut sender, mut receiver) = socket.split();

    let (conn_id, mut event_rx) = dispatcher.register().await;
    info!("client {} connected to gateway", conn_id);

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward room events -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = event_rx.recv() => {
                    let Some(event) = result else { break };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(err) => {
                            warn!("failed to encode gateway event: {}", err);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let dispatcher_recv = dispatcher.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<GatewayCommand>(&text) {
                    Ok(cmd) => handle_command(&dispatcher_recv, &db, conn_id, cmd).await,
                    Err(err) => {
                        warn!("client {} bad command ({} bytes): {}", conn_id, text.len(), err);
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.disconnect(conn_id).await;
    info!("client {} disconnected from gateway", conn_id);
}

async fn handle_command(
    dispatcher: &Dispatcher,
    db: &Arc<Database>,
    conn_id: Uuid,
    cmd: GatewayCommand,
) {
    match cmd {
        GatewayCommand::JoinRoom(room) => {
            info!("client {} joined room {}", conn_id, room);
            dispatcher.join(conn_id, &room).await;
        }

        // Same validation, same store, same broadcast as the HTTP post
        // path. Failures are logged and swallowed: the sender gets no ack.
        GatewayCommand::SendMessage(draft) => {
            if let Err(reason) = draft.validate() {
                warn!("client {} sent invalid message: {}", conn_id, reason);
                return;
            }

            let msg = draft.into_message();
            let stored = {
                let db = db.clone();
                let msg = msg.clone();
                tokio::task::spawn_blocking(move || db.insert_message(&msg)).await
            };

            match stored {
                Ok(Ok(())) => {
                    let room = msg.room.clone();
                    dispatcher.publish(&room, GatewayEvent::NewMessage(msg)).await;
                }
                Ok(Err(err)) => warn!("failed to persist socket message: {:#}", err),
                Err(err) => warn!("message persist task failed: {}", err),
            }
        }
    }
}
