use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::shared::constants::CANCEL_KEY;

/// Reads key lines on a background thread and forwards them over a channel,
/// so the streaming loop can poll for a cancel request without blocking.
pub struct KeyListener {
    rx: Receiver<String>,
}

impl KeyListener {
    /// Listens on stdin.
    pub fn stdin() -> Self {
        Self::spawn_with(|| std::io::stdin().lock())
    }

    /// Listens on any line source. The thread exits on EOF, on a read
    /// error, or once the listener has been dropped and another line arrives.
    #[cfg(test)]
    pub fn spawn<R: BufRead + Send + 'static>(input: R) -> Self {
        Self::spawn_with(move || input)
    }

    fn spawn_with<R, F>(open: F) -> Self
    where
        R: BufRead,
        F: FnOnce() -> R + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded::<String>();
        thread::spawn(move || {
            for line in open().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    #[cfg(test)]
    pub fn from_receiver(rx: Receiver<String>) -> Self {
        Self { rx }
    }

    /// Waits up to `timeout` for the cancel key, returning early if it arrives.
    /// Other lines are discarded.
    pub fn wait_for_cancel(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(line) if is_cancel(&line) => return true,
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return false;
                }
            }
        }
    }
}

fn is_cancel(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(CANCEL_KEY)
}
