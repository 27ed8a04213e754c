use std::sync::mpsc::{channel, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// Run `task` on a worker thread and give up after `limit`.
///
/// Without a limit the task runs on the calling thread. A task that outlives
/// its deadline is detached; its result is discarded when it finishes.
pub fn run_with_deadline<T, F>(limit: Option<Duration>, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let Some(limit) = limit else {
        return task();
    };

    let (tx, rx) = channel();
    thread::Builder::new()
        .name("deadline-worker".to_string())
        .spawn(move || {
            // The receiver is gone once the deadline passed
            let _ = tx.send(task());
        })
        .map_err(|e| Error::Other(anyhow::anyhow!("Failed to spawn worker thread: {}", e)))?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(Error::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Err(Error::Other(anyhow::anyhow!(
            "worker thread panicked before producing a result"
        ))),
    }
}
