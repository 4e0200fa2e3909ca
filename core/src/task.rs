//! One-shot background fetch with cooperative cancellation.
//!
//! The worker runs fetch then parse sequentially. Checking the cancellation
//! token and running the completion callback happen under one lock, and
//! `cancel` takes that lock too: once `cancel` returns, no callback is
//! running and none will start. In-flight I/O is not interrupted; it ends at
//! the configured timeouts.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::client::QuakeClient;
use crate::error::FeedError;
use crate::types::Record;

thread_local! {
    /// Address of the token whose callback this thread is running, 0 if none.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    delivery: Mutex<()>,
}

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token cancelled and wait for a callback already running
    /// under it. Calling this from inside that callback does not wait.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        if DELIVERING.with(Cell::get) != self.addr() {
            drop(self.lock_delivery());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Run `deliver` unless cancelled, holding the delivery lock throughout.
    /// Returns whether it ran.
    fn deliver_unless_cancelled(&self, deliver: impl FnOnce()) -> bool {
        let _guard = self.lock_delivery();
        if self.is_cancelled() {
            return false;
        }
        let _marker = DeliveryMarker::enter(self.addr());
        deliver();
        true
    }

    fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        // A panicking callback poisons the lock; the `()` behind it is still fine.
        self.state
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.state) as usize
    }
}

/// Marks the current thread as delivering for one token; cleared on drop,
/// including unwinding.
struct DeliveryMarker {
    previous: usize,
}

impl DeliveryMarker {
    fn enter(addr: usize) -> Self {
        Self {
            previous: DELIVERING.with(|d| d.replace(addr)),
        }
    }
}

impl Drop for DeliveryMarker {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.previous));
    }
}

/// Handle to a running fetch. Dropping it detaches the worker without
/// cancelling.
#[derive(Debug)]
pub struct FetchTask {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FetchTask {
    /// See [`CancellationToken::cancel`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Wait for the worker. Returns `false` if it panicked.
    pub fn join(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.join().is_ok(),
            None => true,
        }
    }
}

/// Start one fetch-and-parse on a worker thread.
///
/// `on_complete` runs on the worker thread with the outcome unless `token`
/// was cancelled first; hosts marshal it onto their UI thread themselves.
/// `token.cancel()` blocks while `on_complete` is running.
pub fn spawn_fetch<F>(client: QuakeClient, token: CancellationToken, on_complete: F) -> FetchTask
where
    F: FnOnce(Result<Record, FeedError>) + Send + 'static,
{
    let worker_token = token.clone();
    let spawned = thread::Builder::new()
        .name("quake-fetch".to_string())
        .spawn(move || {
            let outcome = client.try_fetch_record();
            if !worker_token.deliver_unless_cancelled(move || on_complete(outcome)) {
                debug!("fetch finished after cancellation, dropping result");
            }
        });

    let handle = match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            error!(error = %err, "failed to spawn fetch thread");
            None
        }
    };

    FetchTask { token, handle }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::config::FeedConfig;

    fn unreachable_client() -> QuakeClient {
        QuakeClient::new(FeedConfig::default().with_url("not a url"))
    }

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn completion_receives_failure_kind() {
        let (tx, rx) = mpsc::channel();
        let task = spawn_fetch(unreachable_client(), CancellationToken::new(), move |outcome| {
            tx.send(outcome).unwrap();
        });
        assert!(task.join());
        let outcome = rx.recv().unwrap();
        assert!(matches!(outcome, Err(FeedError::MalformedUrl { .. })));
    }

    #[test]
    fn cancelled_task_never_calls_back() {
        let (tx, rx) = mpsc::channel::<Result<Record, FeedError>>();
        let token = CancellationToken::new();
        token.cancel();
        let task = spawn_fetch(unreachable_client(), token, move |outcome| {
            tx.send(outcome).unwrap();
        });
        assert!(task.is_cancelled());
        assert!(task.join());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn cancel_waits_for_running_callback() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let token = CancellationToken::new();

        let callback_finished = Arc::clone(&finished);
        let task = spawn_fetch(unreachable_client(), token.clone(), move |_| {
            entered_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(200));
            callback_finished.store(true, Ordering::SeqCst);
        });

        entered_rx.recv().unwrap();
        token.cancel();
        assert!(finished.load(Ordering::SeqCst), "cancel returned mid-callback");
        assert!(task.join());
    }

    #[test]
    fn cancel_from_inside_callback_does_not_deadlock() {
        let (tx, rx) = mpsc::channel();
        let token = CancellationToken::new();
        let inner = token.clone();

        let task = spawn_fetch(unreachable_client(), token, move |_| {
            inner.cancel();
            tx.send(inner.is_cancelled()).unwrap();
        });

        assert!(task.join());
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    }

    #[test]
    fn panicking_callback_does_not_wedge_cancel() {
        let token = CancellationToken::new();
        let task = spawn_fetch(unreachable_client(), token.clone(), |_| panic!("callback failed"));
        assert!(!task.join());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
