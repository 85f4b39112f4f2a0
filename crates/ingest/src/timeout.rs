use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::source::SourceError;

/// Runs `f` on a named worker thread and waits at most `timeout` for it.
///
/// A call that overruns is abandoned: the worker keeps running detached and
/// its result is dropped.
pub fn call_with_timeout<T, F>(
    timeout: Duration,
    call: &'static str,
    f: F,
) -> Result<T, SourceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SourceError> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name(format!("cmg-{call}"))
        .spawn(move || {
            let _ = tx.send(f());
        })
        .map_err(|err| SourceError::Transient(format!("failed to spawn {call}: {err}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(SourceError::Timeout {
            call,
            after: timeout,
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SourceError::Transient(format!(
            "{call} stopped without a result"
        ))),
    }
}
