use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

const MAX_TRACKED_TASKS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CorrelatorError {
    #[error("response already completed")]
    AlreadyCompleted,
    #[error("timed out waiting for response")]
    TimedOut,
    #[error("response was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
enum SlotState {
    Pending,
    Ready(String),
    Closed,
}

struct Slot {
    tx: watch::Sender<SlotState>,
}

impl Slot {
    fn new() -> Self {
        let (tx, _) = watch::channel(SlotState::Pending);
        Self { tx }
    }
}

/// Keyed store correlating a response id with its rendered reply.
/// One writer and one reader per id; every entry expires after the configured TTL.
pub struct ResponseCorrelator {
    slots: Cache<String, Arc<Slot>>,
    tasks: Cache<String, Arc<AbortHandle>>,
}

impl ResponseCorrelator {
    pub fn new(ttl: Duration) -> Self {
        Self {
            // Bounded by TTL only: evicting a pending slot would strand its waiter
            slots: Cache::builder().time_to_live(ttl).build(),
            tasks: Cache::builder()
                .max_capacity(MAX_TRACKED_TASKS)
                .time_to_live(ttl)
                .build(),
        }
    }

    async fn slot(&self, id: &str) -> Arc<Slot> {
        self.slots
            .get_with(id.to_string(), async { Arc::new(Slot::new()) })
            .await
    }

    /// Store the value for `id`. Only the first put wins.
    pub async fn put(&self, id: &str, value: String) -> Result<(), CorrelatorError> {
        let slot = self.slot(id).await;
        let mut value = Some(value);
        let mut outcome = Ok(());

        slot.tx.send_if_modified(|state| match state {
            SlotState::Pending => {
                if let Some(v) = value.take() {
                    *state = SlotState::Ready(v);
                }
                true
            }
            SlotState::Ready(_) => {
                outcome = Err(CorrelatorError::AlreadyCompleted);
                false
            }
            SlotState::Closed => {
                outcome = Err(CorrelatorError::Cancelled);
                false
            }
        });

        // The producing task is finished either way
        self.tasks.invalidate(id).await;
        outcome
    }

    /// Non-destructive check
    pub async fn poll(&self, id: &str) -> Option<String> {
        let slot = self.slots.get(id).await?;
        let state = slot.tx.borrow();
        match &*state {
            SlotState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Remove and return the value. Exactly one caller ever receives it.
    pub async fn take(&self, id: &str) -> Option<String> {
        let slot = self.slots.get(id).await?;
        let mut taken = None;

        slot.tx.send_if_modified(|state| {
            match std::mem::replace(state, SlotState::Closed) {
                SlotState::Ready(value) => {
                    taken = Some(value);
                    true
                }
                previous => {
                    *state = previous;
                    false
                }
            }
        });

        if taken.is_some() {
            self.slots.invalidate(id).await;
        }
        taken
    }

    /// Suspend until a value for `id` is present or `max_wait` elapses
    pub async fn wait(&self, id: &str, max_wait: Duration) -> Result<(), CorrelatorError> {
        let mut rx = self.slot(id).await.tx.subscribe();

        let ready = tokio::time::timeout(
            max_wait,
            rx.wait_for(|state| !matches!(state, SlotState::Pending)),
        )
        .await
        .map_err(|_| CorrelatorError::TimedOut)?;

        match ready.as_deref() {
            Ok(SlotState::Ready(_)) => Ok(()),
            _ => Err(CorrelatorError::Cancelled),
        }
    }

    /// Track the task producing the value for `id` so it can be cancelled
    pub async fn attach_task(&self, id: &str, handle: AbortHandle) {
        self.tasks.insert(id.to_string(), Arc::new(handle)).await;
    }

    /// Abort the producing task and drop the entry
    pub async fn cancel(&self, id: &str) {
        if let Some(handle) = self.tasks.remove(id).await {
            handle.abort();
        }
        if let Some(slot) = self.slots.remove(id).await {
            slot.tx.send_replace(SlotState::Closed);
        }
        tracing::debug!(response_id = %id, "Pending response cancelled");
    }
}
