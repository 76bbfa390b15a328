//! Confirmation shown before a device is removed

use std::io::{BufRead, Write};
use std::sync::Mutex;

/// Presents the key being removed and reports whether to proceed
pub trait RemovalPrompt: Send + Sync {
    fn confirm_removal(&self, public_key: &str) -> bool;
}

/// Informs via the log and always proceeds
#[derive(Debug, Default)]
pub struct AcknowledgePrompt;

impl RemovalPrompt for AcknowledgePrompt {
    fn confirm_removal(&self, public_key: &str) -> bool {
        tracing::info!("Removing device {}", public_key);
        true
    }
}

/// Asks on a line-oriented terminal; only `y`/`yes` proceeds
pub struct TerminalPrompt<R, W> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }
}

impl<R, W> RemovalPrompt for TerminalPrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm_removal(&self, public_key: &str) -> bool {
        let Ok(mut io) = self.io.lock() else {
            return false;
        };
        let (input, output) = &mut *io;

        if write!(output, "Remove device {}? [y/N] ", public_key)
            .and_then(|_| output.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        if input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
