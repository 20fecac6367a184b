use std::future::Future;
use std::time::Duration;

/// Clock schedules one-shot wake-ups.
///
/// The wake-up is registered when `after` is called. Dropping the returned
/// future before it completes discards the wake-up.
pub trait Clock: Send + 'static {
    type Sleep: Future<Output = ()> + Send + 'static;
    fn after(&self, dur: Duration) -> Self::Sleep;
}

/// `TokioClock` sleeps on the tokio timer.
/// This Clock should be used for real use-cases.
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
#[derive(Debug, Default, Clone)]
pub struct TokioClock {}

#[cfg(feature = "tokio")]
impl Clock for TokioClock {
    type Sleep = ::tokio_1::time::Sleep;
    fn after(&self, dur: Duration) -> Self::Sleep {
        ::tokio_1::time::sleep(dur)
    }
}
