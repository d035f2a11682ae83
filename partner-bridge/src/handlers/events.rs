use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;

/// Stream of page commands (`navigate`, `notify_parent`) for the host shell to apply.
pub async fn page_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("Page attached to event stream");

    let stream = BroadcastStream::new(state.page.subscribe()).filter_map(|command| match command {
        Ok(command) => match Event::default()
            .event(command.event_name())
            .json_data(&command)
        {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("Failed to encode page command: {}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Page event stream lagged, commands dropped");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
