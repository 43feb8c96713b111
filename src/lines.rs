//! Newline-delimited reading for the `tcplistener` tool.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Small on purpose: lines routinely straddle several reads.
const READ_SIZE: usize = 8;

/// Spawns a task that sends each line of `reader`, without its terminator.
///
/// A final line without a trailing newline is still delivered. The channel
/// closes at end of stream or on a read error.
pub fn lines_channel<R>(reader: R) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut lines = BufReader::with_capacity(READ_SIZE, reader).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Error reading lines");
                    break;
                }
            }
        }
    });

    rx
}
