//! A minimal terminal spinner for visual feedback while network effects run.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval.
const INTERVAL: Duration = Duration::from_millis(80);

/// Work finishing faster than this never shows a spinner.
const GRACE: Duration = Duration::from_millis(150);

/// A terminal spinner that runs in a background task.
///
/// The spinner writes to stderr so it doesn't interfere with stdout output.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: tokio::sync::watch::Sender<bool>,
}

impl Spinner {
    /// Start a spinner with the given message (e.g. `"loading catalog"`).
    /// Nothing is drawn until `delay` has passed.
    pub fn start(message: &str, delay: Duration) -> Self {
        let (cancel_tx, mut cancel_rx) = tokio::sync::watch::channel(false);
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel_rx.changed() => return,
            }

            let mut i = 0;
            loop {
                let frame = FRAMES[i % FRAMES.len()];
                // \r moves to start of line, \x1b[2K clears the line
                eprint!("\x1b[2K\r{frame} {message}");
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            cancel: cancel_tx,
        }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

/// Await `work` with a spinner showing `message` if it takes a while.
pub async fn spin_while<F: Future>(message: &str, work: F) -> F::Output {
    let spinner = Spinner::start(message, GRACE);
    let output = work.await;
    spinner.stop().await;
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_single_braille_chars() {
        assert!(!FRAMES.is_empty());
        for frame in FRAMES {
            assert_eq!(frame.chars().count(), 1);
        }
    }

    #[tokio::test]
    async fn spinner_starts_and_stops_without_panic() {
        let spinner = Spinner::start("testing", Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(200)).await;
        spinner.stop().await;
    }

    #[tokio::test]
    async fn stop_before_delay_never_draws() {
        let spinner = Spinner::start("quick", Duration::from_secs(60));
        spinner.stop().await;
    }

    #[tokio::test]
    async fn spin_while_returns_work_output() {
        let out = spin_while("working", async { 41 + 1 }).await;
        assert_eq!(out, 42);
    }
}
