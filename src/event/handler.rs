use axum::extract::ws::Message::{Binary, Close, Text};
use axum::extract::ws::{self, Utf8Bytes, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, error, warn};
use serde_json::from_str;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::try_join;

use super::context;
use super::model::{Command, Event};
use super::service::EventService;

pub async fn ws(ws: WebSocketUpgrade, State(event_service): State<EventService>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, event_service))
}

async fn handle_socket(ws: WebSocket, event_service: EventService) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let ctx = context::Ws::new(events_tx);

    let (sender, receiver) = ws.split();

    let read_task = tokio::spawn(read(ctx.clone(), receiver, event_service.clone()));
    let write_task = tokio::spawn(write(ctx.clone(), sender, events_rx));

    match try_join!(read_task, write_task) {
        Ok(_) => debug!("{} disconnected gracefully", ctx.id()),
        Err(e) => error!("{} disconnected with error: {e}", ctx.id()),
    }

    event_service.disconnect(&ctx).await;
}

async fn read(
    ctx: context::Ws,
    mut receiver: SplitStream<WebSocket>,
    event_service: EventService,
) {
    loop {
        tokio::select! {
            // close is notified => stop 'read' task
            _ = ctx.close.notified() => break,

            // read next frame from WS connection
            frame = receiver.next() => {
                match frame {
                    None => break,
                    Some(message) => match message {
                        Err(e) => {
                            error!("failed to read WS frame: {e}");
                            ctx.close.notify_one(); // notify 'write' task to stop
                            break;
                        },
                        Ok(Close(frame)) => {
                            debug!("WS connection closed by client: {frame:?}");
                            ctx.close.notify_one(); // notify 'write' task to stop
                            break;
                        },
                        Ok(Text(content)) => {
                            if let Err(e) = handle_text_frame(&ctx, content, event_service.clone()).await {
                                error!("failed to handle text frame: {e}");
                                ctx.close.notify_one(); // notify 'write' task to stop
                                break;
                            }
                        },
                        Ok(Binary(content)) => {
                            warn!("received binary WS frame: {content:?}");
                        }
                        Ok(other) => warn!("received non-text WS frame: {other:?}")
                    }
                }
            }
        }
    }
}

async fn handle_text_frame(
    ctx: &context::Ws,
    content: Utf8Bytes,
    event_service: EventService,
) -> super::Result<()> {
    if let Ok(command) = from_str::<Command>(content.as_str()) {
        return event_service.handle_command(ctx, command).await;
    }
    warn!("skipping text frame, content is malformed: {content}");
    Ok(())
}

async fn write(
    ctx: context::Ws,
    mut sender: SplitSink<WebSocket, ws::Message>,
    mut events: UnboundedReceiver<Event>,
) {
    loop {
        tokio::select! {
            // close is notified => stop 'write' task
            _ = ctx.close.notified() => break,

            // next queued event => serialize and push to the client
            event = events.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(payload) => {
                        if let Err(e) = sender.send(Text(payload.into())).await {
                            error!("failed to send event to client: {e}");
                            ctx.close.notify_one(); // notify 'read' task to stop
                            break;
                        }
                    }
                    Err(e) => error!("failed to serialize event: {e}"),
                }
            },
        }
    }
}
