use std::time::Duration;

/// `Backoff` produces the waits between failed attempts.
///
/// `reset` is called once at the start of every retry session, `next_interval`
/// once per failed attempt that is followed by a wait. Implementations keep
/// their own growth state between the two.
pub trait Backoff {
    fn reset(&mut self) {}
    fn next_interval(&mut self) -> Duration;
}

impl<B: Backoff + ?Sized> Backoff for &mut B {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next_interval(&mut self) -> Duration {
        (**self).next_interval()
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next_interval(&mut self) -> Duration {
        (**self).next_interval()
    }
}

/// Retries immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct Zero {}

impl Backoff for Zero {
    fn next_interval(&mut self) -> Duration {
        Duration::ZERO
    }
}

/// Waits the same interval after every failure.
#[derive(Debug, Clone, Copy)]
pub struct Constant {
    interval: Duration,
}

impl Constant {
    pub fn new(interval: Duration) -> Constant {
        Constant { interval }
    }
}

impl Backoff for Constant {
    fn next_interval(&mut self) -> Duration {
        self.interval
    }
}
