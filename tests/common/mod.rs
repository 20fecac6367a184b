#![allow(dead_code)]

use std::future::{self, Future, Ready};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_1::sync::oneshot;
use watchdog::{Backoff, Clock};

/// Backoff policy that counts how often it is driven.
#[derive(Debug, Clone, Default)]
pub struct CountingBackoff {
    resets: Arc<AtomicUsize>,
    intervals: Arc<AtomicUsize>,
    interval: Duration,
}

impl CountingBackoff {
    pub fn new(interval: Duration) -> CountingBackoff {
        CountingBackoff {
            interval,
            ..CountingBackoff::default()
        }
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn intervals(&self) -> usize {
        self.intervals.load(Ordering::SeqCst)
    }
}

impl Backoff for CountingBackoff {
    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn next_interval(&mut self) -> Duration {
        self.intervals.fetch_add(1, Ordering::SeqCst);
        self.interval
    }
}

/// Deterministic policy whose intervals grow by one step per failure.
#[derive(Debug)]
pub struct LinearBackoff {
    step: Duration,
    current: Duration,
}

impl LinearBackoff {
    pub fn new(step: Duration) -> LinearBackoff {
        LinearBackoff {
            step,
            current: Duration::ZERO,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    fn next_interval(&mut self) -> Duration {
        self.current += self.step;
        self.current
    }
}

struct Waiter {
    deadline: Duration,
    wake: oneshot::Sender<()>,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    waiters: Vec<Waiter>,
    after_args: Vec<Duration>,
}

/// Clock that only moves when told to and records every registration.
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<Inner>>,
}

impl ManualClock {
    pub fn new() -> ManualClock {
        ManualClock::default()
    }

    pub fn after_args(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().after_args.clone()
    }

    /// Number of registered wake-ups whose future is still alive.
    pub fn pending(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.waiters.retain(|w| !w.wake.is_closed());
        inner.waiters.len()
    }

    pub fn advance(&self, dur: Duration) {
        let due = {
            let mut inner = self.inner.lock().unwrap();
            inner.now += dur;
            let now = inner.now;
            let (due, rest): (Vec<_>, Vec<_>) =
                inner.waiters.drain(..).partition(|w| w.deadline <= now);
            inner.waiters = rest;
            due
        };
        for w in due {
            let _ = w.wake.send(());
        }
    }

    /// Waits until something is sleeping on the clock, then advances it.
    pub async fn blocking_advance(&self, dur: Duration) {
        while self.pending() == 0 {
            tokio_1::task::yield_now().await;
        }
        self.advance(dur);
    }

    /// Waits until `after` has been called at least `n` times in total.
    pub async fn wait_for_after_calls(&self, n: usize) {
        while self.after_args().len() < n {
            tokio_1::task::yield_now().await;
        }
    }
}

impl Clock for ManualClock {
    type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn after(&self, dur: Duration) -> Self::Sleep {
        let (wake, fired) = oneshot::channel();
        {
            let mut inner = self.inner.lock().unwrap();
            let deadline = inner.now + dur;
            inner.waiters.push(Waiter { deadline, wake });
            inner.after_args.push(dur);
        }
        Box::pin(async move {
            if fired.await.is_err() {
                future::pending::<()>().await
            }
        })
    }
}

/// Operation that bumps `attempts` and succeeds when `succeed(attempt)` says so.
pub fn counting_op<F>(
    attempts: Arc<AtomicUsize>,
    succeed: F,
) -> impl FnMut() -> Ready<bool> + Send + 'static
where
    F: Fn(usize) -> bool + Send + 'static,
{
    move || {
        let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        future::ready(succeed(n))
    }
}

pub fn count(c: &Arc<AtomicUsize>) -> usize {
    c.load(Ordering::SeqCst)
}

/// Lets every other task on the runtime make progress a few times.
pub async fn settle() {
    for _ in 0..32 {
        tokio_1::task::yield_now().await;
    }
}
