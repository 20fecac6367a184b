/// Misuse of a [`Watcher`](crate::Watcher).
///
/// A failing operation is never an error; it is retried until it succeeds
/// or the watcher is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("watcher has already been started")]
    AlreadyStarted,
}
