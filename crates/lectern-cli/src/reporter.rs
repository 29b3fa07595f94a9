//! Periodic progress display.
//!
//! Polls the shared tracker on a fixed cadence and prints one status line
//! per tick. Lines go to stderr so stdout stays clean for scripting.

use colored::Colorize;
use lectern_pipeline::ProgressTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn the reporter task. Abort the returned handle once the run is
/// done; the tracker itself is unaffected.
pub fn spawn(progress: Arc<ProgressTracker>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick fires immediately; skip it so the opening status
        // line is not printed before any work has been dispatched.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snapshot = progress.snapshot();
            eprintln!("{}", snapshot.to_string().cyan());
        }
    })
}
