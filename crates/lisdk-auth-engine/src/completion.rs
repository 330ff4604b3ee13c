//! Request completions and the single pending-request slot.
//!
//! A [`Completion`] is the pair of callbacks the host supplies with a
//! request. It is consumed by whichever terminal outcome arrives first, so a
//! callback can fire at most once.
//!
//! Each coordinator owns one [`PendingSlot`]: `Idle`, or `Awaiting` a reply
//! for one request id. Arming the slot while a request is outstanding
//! returns the displaced completion so the coordinator can tell it it was
//! superseded. Callbacks are always invoked after the slot lock is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::channel::RequestId;
use crate::error_code::TypedError;

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

type SuccessFn = Box<dyn FnOnce() + Send>;
type ErrorFn = Box<dyn FnOnce(TypedError) + Send>;

/// Success and error callbacks for one request.
pub struct Completion {
    on_success: SuccessFn,
    on_error: ErrorFn,
}

impl Completion {
    pub fn new(
        on_success: impl FnOnce() + Send + 'static,
        on_error: impl FnOnce(TypedError) + Send + 'static,
    ) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        }
    }

    /// A completion that reports its outcome on a oneshot channel.
    ///
    /// If the request is dropped without an outcome (for example the
    /// channel could not deliver it), the receiver sees a closed channel.
    pub fn channel() -> (Self, oneshot::Receiver<Result<(), TypedError>>) {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx_err = Arc::clone(&tx);

        let completion = Self::new(
            move || send_once(&tx, Ok(())),
            move |error| send_once(&tx_err, Err(error)),
        );
        (completion, rx)
    }

    pub(crate) fn succeed(self) {
        (self.on_success)();
    }

    pub(crate) fn fail(self, error: TypedError) {
        (self.on_error)(error);
    }
}

type ReplySender = oneshot::Sender<Result<(), TypedError>>;

fn send_once(tx: &Mutex<Option<ReplySender>>, outcome: Result<(), TypedError>) {
    let sender = tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        // The host may have stopped listening; that is its call.
        let _ = sender.send(outcome);
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// PendingSlot
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Pending {
    Idle,
    Awaiting {
        id: RequestId,
        completion: Completion,
    },
}

/// The one outstanding request of a coordinator.
#[derive(Debug)]
pub(crate) struct PendingSlot {
    state: Mutex<Pending>,
}

impl PendingSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(Pending::Idle),
        }
    }

    /// Start waiting for `id`. Returns the completion this displaces.
    pub(crate) fn arm(&self, id: RequestId, completion: Completion) -> Option<Completion> {
        let previous = std::mem::replace(&mut *self.lock(), Pending::Awaiting { id, completion });
        match previous {
            Pending::Idle => None,
            Pending::Awaiting { completion, .. } => Some(completion),
        }
    }

    /// Take the completion if the slot is waiting for exactly `id`.
    ///
    /// Any other id leaves the slot untouched.
    pub(crate) fn take(&self, id: &RequestId) -> Option<Completion> {
        let mut state = self.lock();
        match &*state {
            Pending::Awaiting { id: pending, .. } if pending == id => {}
            _ => return None,
        }

        match std::mem::replace(&mut *state, Pending::Idle) {
            Pending::Awaiting { completion, .. } => Some(completion),
            Pending::Idle => None,
        }
    }

    /// The id being waited for, if any.
    pub(crate) fn pending_id(&self) -> Option<RequestId> {
        match &*self.lock() {
            Pending::Awaiting { id, .. } => Some(*id),
            Pending::Idle => None,
        }
    }

    // The slot is replaced wholesale under the lock; it is never observed
    // half-written.
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error_code::ErrorKind;

    fn counting() -> (Completion, Arc<AtomicUsize>, Arc<Mutex<Vec<TypedError>>>) {
        let successes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&successes);
        let e = Arc::clone(&errors);
        let completion = Completion::new(
            move || {
                s.fetch_add(1, Ordering::SeqCst);
            },
            move |err| e.lock().unwrap().push(err),
        );
        (completion, successes, errors)
    }

    #[test]
    fn arm_on_idle_displaces_nothing() {
        let slot = PendingSlot::new();
        let (completion, _, _) = counting();
        let id = RequestId::new();

        assert!(slot.arm(id, completion).is_none());
        assert_eq!(slot.pending_id(), Some(id));
    }

    #[test]
    fn arm_while_pending_returns_previous() {
        let slot = PendingSlot::new();
        let (first, _, first_errors) = counting();
        let (second, _, _) = counting();
        let second_id = RequestId::new();

        slot.arm(RequestId::new(), first);
        let displaced = slot.arm(second_id, second).unwrap();
        displaced.fail(TypedError::superseded());

        assert_eq!(slot.pending_id(), Some(second_id));
        assert_eq!(first_errors.lock().unwrap()[0].kind(), ErrorKind::Superseded);
    }

    #[test]
    fn take_matching_id_clears_slot() {
        let slot = PendingSlot::new();
        let (completion, successes, _) = counting();
        let id = RequestId::new();
        slot.arm(id, completion);

        slot.take(&id).unwrap().succeed();

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(slot.pending_id(), None);
        assert!(slot.take(&id).is_none());
    }

    #[test]
    fn take_other_id_leaves_slot() {
        let slot = PendingSlot::new();
        let (completion, _, _) = counting();
        let id = RequestId::new();
        slot.arm(id, completion);

        assert!(slot.take(&RequestId::new()).is_none());
        assert_eq!(slot.pending_id(), Some(id));
    }

    #[tokio::test]
    async fn channel_completion_reports_success() {
        let (completion, rx) = Completion::channel();
        completion.succeed();
        assert_eq!(rx.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn channel_completion_reports_error() {
        let (completion, rx) = Completion::channel();
        completion.fail(TypedError::new(ErrorKind::ServerError, "boom"));
        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
    }

    #[tokio::test]
    async fn dropped_channel_completion_closes_receiver() {
        let (completion, rx) = Completion::channel();
        drop(completion);
        assert!(rx.await.is_err());
    }
}
