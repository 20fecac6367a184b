extern crate tokio_1 as tokio;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use watchdog::backoff::Constant;
use watchdog::Watcher;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "trace".into()))
        .init();

    let calls = Arc::new(AtomicUsize::new(0));
    let op = {
        let calls = calls.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                println!("Attempt {}", n);
                n % 3 == 0
            }
        }
    };

    let mut watcher = Watcher::new(op, Constant::new(Duration::from_millis(200)));
    let mut successes = watcher.start().expect("fresh watcher");

    for round in 1..=2 {
        successes.recv().await;
        println!("Round {} succeeded", round);
        watcher.check();
    }

    watcher.stop();
    while successes.recv().await.is_some() {}
    println!("Watcher stopped after {} attempts", calls.load(Ordering::SeqCst));
}
