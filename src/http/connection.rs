use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::handler::Handler;
use crate::http::parser::{read_request, ParseError};
use crate::http::request::Request;
use crate::http::response::{HandlerError, StatusCode};
use crate::http::writer::{ResponseWriter, WriteState};

/// One request, one response, then the stream is shut down.
pub struct Connection<S, H> {
    stream: S,
    handler: Arc<H>,
    max_buffer_size: usize,
}

pub enum ConnectionState {
    Reading,
    Handling(Request),
    Rejecting(ParseError),
    Closed,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    /// Creates a connection that has not read anything yet.
    ///
    /// # Arguments
    ///
    /// * `stream` - The accepted byte stream
    /// * `handler` - Application logic shared by all connections
    /// * `max_buffer_size` - Cap on unparsed request bytes held at once
    pub fn new(stream: S, handler: Arc<H>, max_buffer_size: usize) -> Self {
        Self {
            stream,
            handler,
            max_buffer_size,
        }
    }

    /// Reads one request, answers it, and shuts the stream down.
    ///
    /// # Returns
    ///
    /// `Err` only when a response could not be written completely; parse
    /// errors are answered on the wire and count as success.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut state = ConnectionState::Reading;

        let outcome = loop {
            state = match state {
                ConnectionState::Reading => {
                    match read_request(&mut self.stream, self.max_buffer_size).await {
                        Ok(request) => ConnectionState::Handling(request),
                        Err(e) => ConnectionState::Rejecting(e),
                    }
                }

                ConnectionState::Handling(request) => {
                    if let Err(e) = self.respond(&request).await {
                        break Err(e);
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Rejecting(err) => {
                    if let Err(e) = self.reject(err).await {
                        break Err(e);
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break Ok(()),
            };
        };

        // Close regardless of how the exchange went
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after response failed");
        }

        outcome
    }

    async fn respond(&mut self, request: &Request) -> anyhow::Result<()> {
        tracing::info!(
            method = %request.method(),
            target = %request.target(),
            body_len = request.body.len(),
            "Request parsed"
        );

        let mut writer = ResponseWriter::new(&mut self.stream);

        if let Err(e) = self.handler.handle(request, &mut writer).await {
            if writer.state() != WriteState::NothingWritten {
                return Err(e.context("handler failed mid-response"));
            }

            tracing::error!(error = %e, target = %request.target(), "Handler failed");
            HandlerError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                .write_to(&mut writer)
                .await
                .context("writing 500 response")?;
        }

        Ok(())
    }

    async fn reject(&mut self, err: ParseError) -> anyhow::Result<()> {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::warn!(error = %err, status = status.as_u16(), "Request rejected");

        let mut writer = ResponseWriter::new(&mut self.stream);
        HandlerError::new(status, err.to_string())
            .write_to(&mut writer)
            .await
            .with_context(|| format!("writing {status} response"))?;

        Ok(())
    }
}
