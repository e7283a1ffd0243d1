use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{dto::game::GameView, state::game::Game};

/// Name of the SSE event carrying a full document view.
const GAME_EVENT: &str = "game";

/// Convert a document-update receiver into an SSE response.
///
/// The initial snapshot goes out first, then every committed write, as full
/// document views. A forwarder task bridges the broadcast channel into a
/// small bounded channel so a gone client tears the subscription down; lagged
/// receivers skip to the freshest document instead of dying, which is safe
/// because every event carries the whole state.
pub fn to_game_stream(
    initial: GameView,
    mut receiver: broadcast::Receiver<Game>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Ok(event) = game_event(&initial) {
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(game) => {
                            let Ok(event) = game_event(&GameView::from(game)) else {
                                continue;
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged documents but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!("game SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn game_event(view: &GameView) -> Result<Event, axum::Error> {
    Event::default().event(GAME_EVENT).json_data(view)
}
