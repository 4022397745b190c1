//! Delivery handles and their completion.

use super::ClientId;
use crate::pack::PackId;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Final state of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The client reported the pack as successfully applied.
    Confirmed,
    /// Refused, failed, or the client left before finishing.
    Failed,
}

impl DeliveryOutcome {
    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }
}

type Callback = Box<dyn FnOnce(DeliveryOutcome) + Send>;

struct Completion {
    outcome: Option<DeliveryOutcome>,
    callbacks: Vec<Callback>,
}

struct Shared {
    client: ClientId,
    pack: PackId,
    completion: Mutex<Completion>,
    state: watch::Sender<Option<DeliveryOutcome>>,
}

/// One outstanding "apply pack P to client C" attempt.
///
/// Handles are cheap to clone; all clones observe the same outcome. The
/// tracker holds the only [`Completer`] for a handle.
#[derive(Clone)]
pub struct DeliveryHandle {
    shared: Arc<Shared>,
}

impl DeliveryHandle {
    /// Create a pending handle and the completer that resolves it.
    pub(crate) fn pending(client: ClientId, pack: PackId) -> (Self, Completer) {
        let (state, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            client,
            pack,
            completion: Mutex::new(Completion {
                outcome: None,
                callbacks: Vec::new(),
            }),
            state,
        });
        (
            Self {
                shared: shared.clone(),
            },
            Completer { shared },
        )
    }

    pub fn client(&self) -> ClientId {
        self.shared.client
    }

    pub fn pack(&self) -> PackId {
        self.shared.pack
    }

    /// The outcome, or `None` while still pending.
    pub fn outcome_now(&self) -> Option<DeliveryOutcome> {
        self.shared.completion.lock().outcome
    }

    pub fn is_pending(&self) -> bool {
        self.outcome_now().is_none()
    }

    /// Run `callback` once the handle resolves, or right away if it already
    /// has. Each callback runs exactly once.
    pub fn on_complete(&self, callback: impl FnOnce(DeliveryOutcome) + Send + 'static) {
        let mut completion = self.shared.completion.lock();
        match completion.outcome {
            Some(outcome) => {
                drop(completion);
                callback(outcome);
            }
            None => completion.callbacks.push(Box::new(callback)),
        }
    }

    /// Wait for the handle to resolve.
    pub async fn outcome(&self) -> DeliveryOutcome {
        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(state) => (*state).unwrap_or(DeliveryOutcome::Failed),
            // The sender lives in `shared`, which we hold.
            Err(_) => DeliveryOutcome::Failed,
        }
    }
}

impl fmt::Debug for DeliveryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHandle")
            .field("client", &self.shared.client)
            .field("pack", &self.shared.pack)
            .field("outcome", &self.outcome_now())
            .finish()
    }
}

/// Resolving side of a [`DeliveryHandle`]. Consumed on completion.
pub(crate) struct Completer {
    shared: Arc<Shared>,
}

impl Completer {
    pub(crate) fn complete(self, outcome: DeliveryOutcome) {
        let callbacks = {
            let mut completion = self.shared.completion.lock();
            if completion.outcome.is_some() {
                return;
            }
            completion.outcome = Some(outcome);
            std::mem::take(&mut completion.callbacks)
        };
        self.shared.state.send_replace(Some(outcome));
        for callback in callbacks {
            callback(outcome);
        }
    }
}

/// Wait for a group of handles.
///
/// Resolves `Confirmed` when every handle confirms and `Failed` as soon as
/// any one fails. The remaining handles are not cancelled; the tracker still
/// resolves each of them.
pub async fn combine_all<I>(handles: I) -> DeliveryOutcome
where
    I: IntoIterator<Item = DeliveryHandle>,
{
    let mut waiting: FuturesUnordered<_> = handles
        .into_iter()
        .map(|handle| async move { handle.outcome().await })
        .collect();

    while let Some(outcome) = waiting.next().await {
        if outcome == DeliveryOutcome::Failed {
            return DeliveryOutcome::Failed;
        }
    }
    DeliveryOutcome::Confirmed
}

/// Wait until every handle in a group has resolved.
///
/// Resolves `Confirmed` only if all of them confirmed. Unlike
/// [`combine_all`] a failure does not end the wait early.
pub async fn settle_all<I>(handles: I) -> DeliveryOutcome
where
    I: IntoIterator<Item = DeliveryHandle>,
{
    let mut waiting: FuturesUnordered<_> = handles
        .into_iter()
        .map(|handle| async move { handle.outcome().await })
        .collect();

    let mut combined = DeliveryOutcome::Confirmed;
    while let Some(outcome) = waiting.next().await {
        if outcome == DeliveryOutcome::Failed {
            combined = DeliveryOutcome::Failed;
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn pending() -> (DeliveryHandle, Completer) {
        DeliveryHandle::pending(Uuid::new_v4(), Uuid::new_v4())
    }

    #[tokio::test]
    async fn outcome_waits_for_completion() {
        let (handle, completer) = pending();
        assert!(handle.is_pending());

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.outcome().await })
        };
        completer.complete(DeliveryOutcome::Confirmed);

        assert_eq!(waiter.await.unwrap(), DeliveryOutcome::Confirmed);
        assert_eq!(handle.outcome_now(), Some(DeliveryOutcome::Confirmed));
    }

    #[test]
    fn callbacks_run_once_before_and_after_completion() {
        let (handle, completer) = pending();
        let calls = Arc::new(AtomicUsize::new(0));

        let early = calls.clone();
        handle.on_complete(move |outcome| {
            assert_eq!(outcome, DeliveryOutcome::Failed);
            early.fetch_add(1, Ordering::SeqCst);
        });
        completer.complete(DeliveryOutcome::Failed);

        let late = calls.clone();
        handle.on_complete(move |outcome| {
            assert_eq!(outcome, DeliveryOutcome::Failed);
            late.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn combine_all_confirms_when_every_handle_confirms() {
        let (a, ca) = pending();
        let (b, cb) = pending();
        ca.complete(DeliveryOutcome::Confirmed);
        cb.complete(DeliveryOutcome::Confirmed);
        assert_eq!(combine_all([a, b]).await, DeliveryOutcome::Confirmed);
    }

    #[tokio::test]
    async fn combine_all_fails_fast_without_cancelling_others() {
        let (a, ca) = pending();
        let (b, cb) = pending();
        ca.complete(DeliveryOutcome::Failed);

        assert_eq!(combine_all([a, b.clone()]).await, DeliveryOutcome::Failed);
        assert!(b.is_pending());

        cb.complete(DeliveryOutcome::Confirmed);
        assert_eq!(b.outcome().await, DeliveryOutcome::Confirmed);
    }

    #[tokio::test]
    async fn combine_all_of_nothing_confirms() {
        assert_eq!(
            combine_all(Vec::<DeliveryHandle>::new()).await,
            DeliveryOutcome::Confirmed
        );
    }

    #[tokio::test]
    async fn settle_all_waits_past_a_failure() {
        let (a, ca) = pending();
        let (b, cb) = pending();
        ca.complete(DeliveryOutcome::Failed);

        let settled = tokio::spawn(settle_all([a, b.clone()]));
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!settled.is_finished());

        cb.complete(DeliveryOutcome::Confirmed);
        assert_eq!(settled.await.unwrap(), DeliveryOutcome::Failed);
    }

    #[tokio::test]
    async fn settle_all_confirms_only_when_all_confirm() {
        let (a, ca) = pending();
        let (b, cb) = pending();
        ca.complete(DeliveryOutcome::Confirmed);
        cb.complete(DeliveryOutcome::Confirmed);
        assert_eq!(settle_all([a, b]).await, DeliveryOutcome::Confirmed);
        assert_eq!(
            settle_all(Vec::<DeliveryHandle>::new()).await,
            DeliveryOutcome::Confirmed
        );
    }
}
