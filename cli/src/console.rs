//! Console input
//!
//! Standard input is read on a plain OS thread: a blocking read there never
//! holds up runtime shutdown, and the process can exit while the thread is
//! still parked in `read_line`.

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::warn;

const LINE_BUFFER: usize = 16;

/// Forward trimmed, non-empty lines from `reader`. The channel closes on EOF,
/// on a read error, or once the receiver is dropped.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Console input closed");
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if tx.blocking_send(line.to_string()).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_lines_forwarded_until_eof() {
        let input = Cursor::new("status\n\n   \n  presets list  \nexit\n");
        let mut rx = spawn_line_reader(input);

        assert_eq!(rx.recv().await.as_deref(), Some("status"));
        assert_eq!(rx.recv().await.as_deref(), Some("presets list"));
        assert_eq!(rx.recv().await.as_deref(), Some("exit"));
        assert_eq!(rx.recv().await, None);
    }
}
