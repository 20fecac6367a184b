//! Background retry loop with external `check` and `stop` controls.
//!
//! A [`Watcher`] owns one task. That task runs retry *sessions*: the backoff
//! policy is reset, then the operation is attempted until it succeeds, with
//! a clock wait between failed attempts. Each successful session produces one
//! value on the channel returned by [`Watcher::start`], after which the task
//! idles until [`Watcher::check`] begins the next session.
//!
//! ```text
//! start ──► reset ──► attempt ──ok──► notify ──► idle ──check──► reset ...
//!                      ▲   │
//!                      │  fail
//!                      │   ▼
//!      timer / check ──┴─ next_interval + clock.after
//! ```
//!
//! `stop` is latched and ends the task at the next suspension point; an
//! attempt that is already running is allowed to return first. `check` is
//! coalesced: any number of calls before the task observes one count as one.

use std::future::Future;

use tokio_1::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::backoff::Backoff;
use crate::clock::{Clock, TokioClock};
use crate::error::Error;

/// AsyncOperation is an attempt awaited on the watcher task.
///
/// Implemented for every `FnMut() -> impl Future<Output = bool>` closure.
pub trait AsyncOperation: Send + 'static {
    type Future: Future<Output = bool> + Send;
    fn call_op(&mut self) -> Self::Future;
}

impl<F, Fut> AsyncOperation for F
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send,
{
    type Future = Fut;
    fn call_op(&mut self) -> Self::Future {
        self()
    }
}

/// Cloneable control surface of a [`Watcher`].
///
/// Both methods are non-blocking and may be called from any thread, any
/// number of times.
#[derive(Debug, Clone)]
pub struct Handle {
    checks: mpsc::Sender<()>,
    stop: CancellationToken,
}

impl Handle {
    /// Requests an immediate attempt, cutting short a backoff wait, or starts
    /// a new session when the watcher is idle after a success.
    pub fn check(&self) {
        // Full: a check is already pending. Closed: the task has exited.
        let _ = self.checks.try_send(());
    }

    /// Requests termination. Completion is observed by the notification
    /// channel closing.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

/// Retries an [`AsyncOperation`] from a background task.
///
/// # Example
///
/// ```rust
/// # extern crate tokio_1 as tokio;
/// use std::time::Duration;
/// use watchdog::{backoff::Constant, Watcher};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut watcher = Watcher::new(|| async { true }, Constant::new(Duration::from_millis(10)));
/// let mut successes = watcher.start().unwrap();
/// assert_eq!(successes.recv().await, Some(()));
///
/// watcher.stop();
/// assert_eq!(successes.recv().await, None);
/// # }
/// ```
pub struct Watcher<O, B, C = TokioClock> {
    handle: Handle,
    task: Option<Task<O, B, C>>,
}

impl<O, B> Watcher<O, B, TokioClock>
where
    O: AsyncOperation,
    B: Backoff + Send + 'static,
{
    /// Creates an inert watcher that waits on the tokio timer.
    pub fn new(operation: O, backoff: B) -> Self {
        Self::with_clock(operation, backoff, TokioClock::default())
    }
}

impl<O, B, C> Watcher<O, B, C>
where
    O: AsyncOperation,
    B: Backoff + Send + 'static,
    C: Clock,
{
    /// Creates an inert watcher that schedules its waits on `clock`.
    pub fn with_clock(operation: O, backoff: B, clock: C) -> Self {
        let (checks_tx, checks) = mpsc::channel(1);
        let stop = CancellationToken::new();

        Watcher {
            handle: Handle {
                checks: checks_tx,
                stop: stop.clone(),
            },
            task: Some(Task {
                operation,
                backoff,
                clock,
                checks,
                stop,
            }),
        }
    }

    /// Spawns the watcher task onto the current tokio runtime.
    ///
    /// The returned channel receives one value per successful session and is
    /// closed once the task exits. If [`stop`](Self::stop) was requested
    /// earlier the task exits without attempting anything.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyStarted`] if called more than once.
    ///
    /// # Panics
    ///
    /// When called outside of a tokio runtime.
    pub fn start(&mut self) -> Result<mpsc::Receiver<()>, Error> {
        let task = self.task.take().ok_or(Error::AlreadyStarted)?;
        let (successes, rx) = mpsc::channel(1);
        tokio_1::spawn(task.run(successes));
        Ok(rx)
    }

    /// See [`Handle::check`].
    pub fn check(&self) {
        self.handle.check()
    }

    /// See [`Handle::stop`].
    pub fn stop(&self) {
        self.handle.stop()
    }

    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }
}

struct Task<O, B, C> {
    operation: O,
    backoff: B,
    clock: C,
    checks: mpsc::Receiver<()>,
    stop: CancellationToken,
}

impl<O, B, C> Task<O, B, C>
where
    O: AsyncOperation,
    B: Backoff + Send + 'static,
    C: Clock,
{
    async fn run(mut self, successes: mpsc::Sender<()>) {
        if self.stop.is_cancelled() {
            warn!("watcher was stopped before it started");
            return;
        }

        let mut session: u64 = 0;
        loop {
            session += 1;
            if !self.run_session(session).await {
                break;
            }

            // The success answers every check requested during the session.
            while self.checks.try_recv().is_ok() {}

            tokio_1::select! {
                biased;
                _ = self.stop.cancelled() => break,
                sent = successes.send(()) => {
                    if sent.is_err() {
                        debug!(session, "success not delivered, receiver dropped");
                    }
                }
            }

            debug!(session, "watcher idle");
            tokio_1::select! {
                biased;
                _ = self.stop.cancelled() => break,
                req = self.checks.recv() => {
                    if req.is_none() {
                        debug!(session, "all watcher handles dropped");
                        break;
                    }
                }
            }
        }

        debug!(sessions = session, "watcher stopped");
    }

    /// Runs attempts until one succeeds. Returns `false` if a stop request
    /// ended the session first.
    async fn run_session(&mut self, session: u64) -> bool {
        self.backoff.reset();
        debug!(session, "retry session started");

        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            if self.operation.call_op().await {
                debug!(session, attempts = attempt, "operation succeeded");
                return true;
            }

            let interval = self.backoff.next_interval();
            trace!(session, attempt, ?interval, "operation failed, backing off");
            let wake = self.clock.after(interval);

            tokio_1::select! {
                biased;
                _ = self.stop.cancelled() => return false,
                _ = wake => {}
                Some(()) = self.checks.recv() => {
                    trace!(session, attempt, "check requested, skipping backoff");
                }
            }
        }
    }
}
