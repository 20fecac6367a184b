//! Retry an operation with backoff until it succeeds.
//!
//! Two entry points share the same [`Backoff`] and operation model:
//!
//! - [`retry`] blocks the calling thread until the operation succeeds or a
//!   cancel signal fires.
//! - [`Watcher`] runs the same discipline on a tokio task, publishes every
//!   successful session and can be told to retry right away ([`Watcher::check`])
//!   or to give up ([`Watcher::stop`]).
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod retry;
pub mod backoff;
pub mod clock;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod watcher;

pub use backoff::Backoff;
pub use clock::Clock;
pub use error::Error;
pub use retry::{retry, retry_notify, NoopNotify, Notify, Operation};

#[cfg(feature = "tokio")]
pub use clock::TokioClock;
#[cfg(feature = "tokio")]
pub use watcher::{AsyncOperation, Handle, Watcher};
