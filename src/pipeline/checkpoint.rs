use std::io::{BufRead, ErrorKind, Write};

use async_trait::async_trait;

use crate::error::{ReelError, Result};

/// Pause for a human before continuing
#[async_trait]
pub trait Checkpoint: Send + Sync {
    async fn confirm(&self, prompt: &str) -> Result<()>;
}

/// Waits for ENTER on stdin; there is no timeout
///
/// A closed stdin is not a confirmation: the run stops with
/// `UnexpectedEof` instead of going on unreviewed.
pub struct StdinCheckpoint;

#[async_trait]
impl Checkpoint for StdinCheckpoint {
    async fn confirm(&self, prompt: &str) -> Result<()> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
            wait_for_line(std::io::stdin().lock())
        })
        .await
        .map_err(|e| ReelError::Io(std::io::Error::other(e.to_string())))?
    }
}

/// Block until `reader` yields a line; end of input is an error
pub fn wait_for_line<R: BufRead>(mut reader: R) -> Result<()> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(ReelError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "stdin closed before confirmation",
        )));
    }
    Ok(())
}
