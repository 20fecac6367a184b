use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use tracing::{debug, trace};

use crate::backoff::Backoff;

/// Operation is a blocking attempt that reports whether it succeeded.
pub trait Operation {
    fn call_op(&mut self) -> bool;
}

impl<F> Operation for F
where
    F: FnMut() -> bool,
{
    fn call_op(&mut self) -> bool {
        self()
    }
}

/// Notify is called in [`retry_notify`] after every failed attempt, before
/// the caller is put to sleep.
pub trait Notify {
    fn notify(&mut self, attempt: u64, interval: Duration);
}

impl<F> Notify for F
where
    F: FnMut(u64, Duration),
{
    fn notify(&mut self, attempt: u64, interval: Duration) {
        self(attempt, interval)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoopNotify;

impl Notify for NoopNotify {
    fn notify(&mut self, _: u64, _: Duration) {}
}

/// Calls `operation` until it succeeds or `cancel` fires, blocking the
/// current thread between attempts for [`Backoff::next_interval`].
///
/// `cancel` fires when a value is sent on it or when all of its senders are
/// dropped. It is checked before every attempt and interrupts any wait.
/// Returns `true` on success and `false` once cancelled.
///
/// `backoff` is *not* reset; reset it beforehand if a fresh sequence is wanted.
///
/// # Example
///
/// ```rust
/// use std::sync::mpsc;
/// use watchdog::backoff::Zero;
///
/// let (_cancel_tx, cancel) = mpsc::channel();
/// let mut i = 0;
/// let ok = watchdog::retry(&cancel, || { i += 1; i == 3 }, &mut Zero {});
/// assert!(ok);
/// assert_eq!(i, 3);
/// ```
pub fn retry<O, B>(cancel: &Receiver<()>, operation: O, backoff: &mut B) -> bool
where
    O: Operation,
    B: Backoff + ?Sized,
{
    retry_notify(cancel, operation, backoff, NoopNotify)
}

/// Like [`retry`], but calls `notify` with the attempt number and the chosen
/// interval after every failed attempt.
pub fn retry_notify<O, B, N>(
    cancel: &Receiver<()>,
    mut operation: O,
    backoff: &mut B,
    mut notify: N,
) -> bool
where
    O: Operation,
    B: Backoff + ?Sized,
    N: Notify,
{
    let mut attempt: u64 = 0;

    loop {
        if cancelled(cancel) {
            debug!(attempts = attempt, "retry cancelled");
            return false;
        }

        attempt += 1;
        if operation.call_op() {
            debug!(attempts = attempt, "operation succeeded");
            return true;
        }

        let next = backoff.next_interval();
        trace!(attempt, interval = ?next, "operation failed, backing off");
        notify.notify(attempt, next);

        match cancel.recv_timeout(next) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                debug!(attempts = attempt, "retry cancelled while backing off");
                return false;
            }
        }
    }
}

fn cancelled(cancel: &Receiver<()>) -> bool {
    !matches!(cancel.try_recv(), Err(TryRecvError::Empty))
}
