use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream::Stream, StreamExt};
use std::{convert::Infallible, sync::Arc};

use crate::domain::stream::{DeliveryChannel, StreamFrame};

pub struct StreamController {
    delivery: Arc<DeliveryChannel>,
}

impl StreamController {
    pub fn new(delivery: Arc<DeliveryChannel>) -> Self {
        Self { delivery }
    }

    /// GET /chat/stream/:id - Server-sent events for one reply
    pub async fn stream(
        State(controller): State<Arc<StreamController>>,
        Path(response_id): Path<String>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        tracing::debug!(response_id = %response_id, "Opening reply stream");

        let events = controller
            .delivery
            .open(&response_id)
            .map(|frame| Ok::<_, Infallible>(to_event(frame)));

        Sse::new(events).keep_alive(KeepAlive::default())
    }
}

fn to_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Chunk(chunk) => Event::default().data(chunk),
        StreamFrame::Complete => Event::default().event("complete").data("done"),
        StreamFrame::Failed(message) => Event::default().event("error").data(message),
    }
}
