use super::{
    correlator::{CorrelatorError, ResponseCorrelator},
    typewriter::Typewriter,
};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// One frame of the delivery stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Chunk(String),
    Complete,
    Failed(String),
}

enum DeliveryState {
    Waiting(CancelGuard),
    Streaming(std::vec::IntoIter<String>),
    Done,
}

/// Cancels the reply task for a response id when dropped while still armed
struct CancelGuard {
    correlator: Arc<ResponseCorrelator>,
    response_id: String,
    armed: bool,
}

impl CancelGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let correlator = self.correlator.clone();
        let response_id = std::mem::take(&mut self.response_id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tracing::info!(response_id = %response_id, "Stream closed before reply was delivered");
            handle.spawn(async move { correlator.cancel(&response_id).await });
        }
    }
}

/// Streams a correlated reply: WAITING, then STREAMING, then DONE
pub struct DeliveryChannel {
    correlator: Arc<ResponseCorrelator>,
    typewriter: Typewriter,
    max_wait: Duration,
}

impl DeliveryChannel {
    pub fn new(correlator: Arc<ResponseCorrelator>, typewriter: Typewriter, max_wait: Duration) -> Self {
        Self {
            correlator,
            typewriter,
            max_wait,
        }
    }

    pub fn open(&self, response_id: &str) -> BoxStream<'static, StreamFrame> {
        let correlator = self.correlator.clone();
        let typewriter = self.typewriter;
        let max_wait = self.max_wait;
        let id = response_id.to_string();

        let guard = CancelGuard {
            correlator: correlator.clone(),
            response_id: id.clone(),
            armed: true,
        };

        let frames = stream::unfold(DeliveryState::Waiting(guard), move |state| {
            let correlator = correlator.clone();
            let id = id.clone();
            async move {
                match state {
                    DeliveryState::Waiting(mut guard) => {
                        match correlator.wait(&id, max_wait).await {
                            Ok(()) => {
                                guard.disarm();
                                match correlator.take(&id).await {
                                    Some(html) => {
                                        let chunks = typewriter.chunks(&html).into_iter();
                                        next_chunk(chunks)
                                    }
                                    None => Some((
                                        StreamFrame::Failed("Response is no longer available".to_string()),
                                        DeliveryState::Done,
                                    )),
                                }
                            }
                            Err(CorrelatorError::TimedOut) => {
                                tracing::warn!(response_id = %id, "Timed out waiting for reply");
                                // Guard stays armed so the stuck task is cancelled
                                Some((
                                    StreamFrame::Failed("Timed out waiting for the response".to_string()),
                                    DeliveryState::Done,
                                ))
                            }
                            Err(_) => {
                                guard.disarm();
                                Some((
                                    StreamFrame::Failed("The response was cancelled".to_string()),
                                    DeliveryState::Done,
                                ))
                            }
                        }
                    }
                    DeliveryState::Streaming(chunks) => next_chunk(chunks),
                    DeliveryState::Done => None,
                }
            }
        });

        frames
            .then(move |frame| async move {
                if matches!(frame, StreamFrame::Chunk(_)) {
                    typewriter.pause().await;
                }
                frame
            })
            .boxed()
    }
}

fn next_chunk(mut chunks: std::vec::IntoIter<String>) -> Option<(StreamFrame, DeliveryState)> {
    match chunks.next() {
        Some(chunk) => Some((StreamFrame::Chunk(chunk), DeliveryState::Streaming(chunks))),
        None => Some((StreamFrame::Complete, DeliveryState::Done)),
    }
}
