//! Debounced re-evaluation
//!
//! Every evaluation re-tokenizes and re-runs the whole buffer, so buffer changes are
//! coalesced first: only a snapshot that stays unchanged for a quiet window is handed on.
//! Superseded snapshots are dropped without ever being evaluated.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

/// Hand each settled snapshot from `rx` to `on_settled`.
///
/// A snapshot settles once `quiet` passes without a newer one arriving. When the channel
/// closes, the pending snapshot (if any) is delivered immediately and the function returns.
pub async fn debounce<F>(mut rx: mpsc::Receiver<String>, quiet: Duration, mut on_settled: F)
where
    F: FnMut(String),
{
    while let Some(mut latest) = rx.recv().await {
        loop {
            match time::timeout(quiet, rx.recv()).await {
                Ok(Some(newer)) => latest = newer,
                Ok(None) => {
                    on_settled(latest);
                    return;
                }
                Err(_) => break,
            }
        }
        tracing::debug!(bytes = latest.len(), "buffer settled");
        on_settled(latest);
    }
}

/// Send the contents of `path` to `tx` every time they change.
///
/// The first successful read is always sent. A missing file is waited for rather than
/// treated as an error. Returns when the receiving side goes away.
pub async fn poll_file(
    path: PathBuf,
    interval: Duration,
    tx: mpsc::Sender<String>,
) -> io::Result<()> {
    let mut ticker = time::interval(interval);
    let mut last: Option<String> = None;

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            return Ok(());
        }

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "waiting for file");
                continue;
            }
            Err(err) => return Err(err),
        };

        if last.as_deref() == Some(contents.as_str()) {
            continue;
        }
        last = Some(contents.clone());

        if tx.send(contents).await.is_err() {
            return Ok(());
        }
    }
}
