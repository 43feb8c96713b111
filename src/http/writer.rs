//! Order-enforcing response writer.
//!
//! ```text
//! NothingWritten ─▶ StatusLineWritten ─▶ HeaderWritten ─┬─ write_body ─────────────▶ BodyWritten
//!                                                       └─ write_chunked_body (×n)
//!                                                          write_chunked_body_done ─▶ ChunkedBodyDone
//!                                                          write_trailers ──────────▶ TrailersWritten
//! ```
//!
//! Every call checks the state before touching the sink, so an out-of-order
//! call writes nothing. The state only advances once the bytes are flushed.

use std::io::Write;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    NothingWritten,
    StatusLineWritten,
    HeaderWritten,
    BodyWritten,
    ChunkedBodyDone,
    TrailersWritten,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("incorrect write order: cannot {operation} in state {state:?}")]
    OutOfOrder {
        operation: &'static str,
        state: WriteState,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct ResponseWriter<W> {
    sink: W,
    state: WriteState,
}

impl<W> ResponseWriter<W> {
    /// Wraps `sink` in a writer that has written nothing yet.
    ///
    /// # Arguments
    ///
    /// * `sink` - Destination for the response bytes, usually the connection
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriteState::NothingWritten,
        }
    }

    /// Returns how far the response has progressed.
    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Borrows the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Consumes the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn expect_state(&self, expected: WriteState, operation: &'static str) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::OutOfOrder {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state(WriteState::NothingWritten, "write status line")?;

        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.emit(line.as_bytes()).await?;

        self.state = WriteState::StatusLineWritten;
        Ok(())
    }

    /// Writes the header block, blank line included.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriteState::StatusLineWritten, "write headers")?;

        self.emit(&serialize_fields(headers)).await?;

        self.state = WriteState::HeaderWritten;
        Ok(())
    }

    /// Writes `body` verbatim, returning its length.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriteState::HeaderWritten, "write body")?;

        self.emit(body).await?;

        self.state = WriteState::BodyWritten;
        Ok(body.len())
    }

    /// Writes one `<hex len>\r\n<chunk>\r\n` frame and returns the payload
    /// length. May be called any number of times after the headers.
    ///
    /// An empty chunk writes nothing, since a zero-length frame would end
    /// the body.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriteState::HeaderWritten, "write chunk")?;

        if chunk.is_empty() {
            return Ok(0);
        }

        let mut frame = Vec::with_capacity(chunk.len() + 12);
        write!(frame, "{:x}\r\n", chunk.len())?;
        frame.extend_from_slice(chunk);
        frame.extend_from_slice(b"\r\n");
        self.emit(&frame).await?;

        Ok(chunk.len())
    }

    /// Writes the terminating `0\r\n` chunk.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state(WriteState::HeaderWritten, "finish chunked body")?;

        self.emit(b"0\r\n").await?;

        self.state = WriteState::ChunkedBodyDone;
        Ok(())
    }

    /// Writes trailer fields and the blank line that ends the message.
    ///
    /// Pass an empty [`Headers`] to end a chunked body with no trailers.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriteState::ChunkedBodyDone, "write trailers")?;

        self.emit(&serialize_fields(trailers)).await?;

        self.state = WriteState::TrailersWritten;
        Ok(())
    }

    async fn emit(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.sink.write_all(bytes).await?;
        self.sink.flush().await
    }
}

fn serialize_fields(headers: &Headers) -> Vec<u8> {
    let mut buf = Vec::new();

    for (name, value) in headers {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}
