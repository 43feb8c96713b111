//! Incremental request parser.
//!
//! [`RequestParser`] is sans-IO: it is fed whatever bytes are buffered and
//! reports how many it consumed. [`read_request`] drives it from any
//! [`AsyncRead`] source.
//!
//! ```text
//! Init ──request-line──▶ ParsingHeaders ──blank line──▶ ParsingBody ──Content-Length bytes──▶ Parsed
//! ```

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::{find_crlf, HeaderError, Headers};
use crate::http::request::{Method, Request, RequestLine};

const CRLF_LEN: usize = 2;

/// Starting size of the read buffer used by [`read_request`].
pub const INITIAL_BUFFER_SIZE: usize = 1024;

/// Default cap on unconsumed bytes held by [`read_request`].
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The request-line did not have three space-separated fields or its
    /// protocol field was not `NAME/VERSION`.
    #[error("bad request line")]
    MalformedRequestLine,
    /// Well-formed request-line with an unsupported method, protocol or version.
    #[error("invalid request line")]
    InvalidRequestLine,
    /// The request-line was not valid UTF-8.
    #[error("invalid data")]
    InvalidData,
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("invalid content-length {0:?}")]
    InvalidContentLength(String),
    #[error("body length exceeded content-length {expected}")]
    BodyLengthExceeded { expected: usize },
    #[error("body too short: expected {expected} bytes, received {received}")]
    BodyTooShort { expected: usize, received: usize },
    /// The stream ended before the header block was complete.
    #[error("unexpected end of stream while parsing request")]
    UnexpectedEof,
    #[error("request line or header exceeds {limit} bytes")]
    BufferLimitExceeded { limit: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Whether the peer sent something unacceptable, as opposed to the
    /// stream itself failing.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ParseError::Io(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Init,
    ParsingHeaders,
    ParsingBody,
    Parsed,
}

/// Outcome of one state's transition function.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// Nothing can be done until more bytes arrive.
    NeedMore,
    Advance { consumed: usize, next: ParserState },
}

#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// Creates a parser waiting for the request-line.
    pub fn new() -> Self {
        Self {
            state: ParserState::Init,
            request_line: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Whether the whole request, body included, has been parsed.
    pub fn is_complete(&self) -> bool {
        self.state == ParserState::Parsed
    }

    /// Feeds the unconsumed buffer to the state machine.
    ///
    /// Runs transitions until one needs more input or the request is
    /// complete, and returns the total bytes consumed. The caller drops
    /// that many bytes from the front of its buffer before the next call.
    /// Once [`ParserState::Parsed`] is reached, further calls consume nothing.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut read = 0;

        loop {
            let remaining = &data[read..];
            let step = match self.state {
                ParserState::Init => self.parse_request_line(remaining)?,
                ParserState::ParsingHeaders => self.parse_headers(remaining)?,
                ParserState::ParsingBody => self.parse_body(remaining)?,
                ParserState::Parsed => return Ok(read),
            };

            match step {
                Step::NeedMore => return Ok(read),
                Step::Advance { consumed, next } => {
                    if next != self.state {
                        tracing::trace!("{:?} -> {:?}", self.state, next);
                    }
                    read += consumed;
                    self.state = next;
                }
            }
        }
    }

    /// The error to report when the stream ends before the request is
    /// complete.
    pub fn eof_error(&self) -> ParseError {
        match self.state {
            ParserState::ParsingBody => ParseError::BodyTooShort {
                expected: self.content_length().unwrap_or(0),
                received: self.body.len(),
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    /// Returns the request once parsing is complete, `None` before that.
    pub fn into_request(self) -> Option<Request> {
        if self.state != ParserState::Parsed {
            return None;
        }

        Some(Request {
            request_line: self.request_line?,
            headers: self.headers,
            body: self.body,
        })
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<Step, ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok(Step::NeedMore);
        };

        let line = std::str::from_utf8(&data[..idx]).map_err(|_| ParseError::InvalidData)?;
        self.request_line = Some(parse_request_line(line)?);

        Ok(Step::Advance {
            consumed: idx + CRLF_LEN,
            next: ParserState::ParsingHeaders,
        })
    }

    fn parse_headers(&mut self, data: &[u8]) -> Result<Step, ParseError> {
        let (consumed, done) = self.headers.parse(data)?;

        Ok(match (consumed, done) {
            (0, false) => Step::NeedMore,
            (consumed, true) => Step::Advance {
                consumed,
                next: ParserState::ParsingBody,
            },
            (consumed, false) => Step::Advance {
                consumed,
                next: ParserState::ParsingHeaders,
            },
        })
    }

    fn parse_body(&mut self, data: &[u8]) -> Result<Step, ParseError> {
        let expected = self.content_length()?;

        if expected == 0 {
            return Ok(Step::Advance {
                consumed: 0,
                next: ParserState::Parsed,
            });
        }
        if data.is_empty() {
            return Ok(Step::NeedMore);
        }

        let received = self.body.len() + data.len();
        if received > expected {
            return Err(ParseError::BodyLengthExceeded { expected });
        }

        self.body.extend_from_slice(data);

        Ok(Step::Advance {
            consumed: data.len(),
            next: if received == expected {
                ParserState::Parsed
            } else {
                ParserState::ParsingBody
            },
        })
    }

    fn content_length(&self) -> Result<usize, ParseError> {
        match self.headers.get("content-length") {
            None | Some("") => Ok(0),
            Some(value) => value
                .parse()
                .map_err(|_| ParseError::InvalidContentLength(value.to_string())),
        }
    }
}

/// Parses `METHOD SP TARGET SP HTTP/1.1` (CRLF already stripped).
pub fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, protocol] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };
    if target.is_empty() {
        return Err(ParseError::MalformedRequestLine);
    }

    let protocol: Vec<&str> = protocol.split('/').collect();
    let [name, version] = protocol.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    if *name != "HTTP" || *version != "1.1" {
        return Err(ParseError::InvalidRequestLine);
    }
    let method = Method::from_str(method).ok_or(ParseError::InvalidRequestLine)?;

    Ok(RequestLine {
        method,
        target: target.to_string(),
        version: version.to_string(),
    })
}

/// Reads one request from `reader` with the default buffer limit.
pub async fn request_from_reader<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    read_request(reader, DEFAULT_MAX_BUFFER_SIZE).await
}

/// Reads from `reader` until a complete request has been parsed.
///
/// The buffer doubles whenever it fills, up to `max_buffer_size` bytes of
/// unconsumed input. A zero-byte read is end of stream; ending before the
/// request is complete is an error, never a partial request.
pub async fn read_request<R>(reader: &mut R, max_buffer_size: usize) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RequestParser::new();
    let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_SIZE.min(max_buffer_size));

    loop {
        let consumed = parser.parse(&buf)?;
        buf.advance(consumed);

        if parser.is_complete() {
            break;
        }

        if buf.len() >= max_buffer_size {
            return Err(ParseError::BufferLimitExceeded {
                limit: max_buffer_size,
            });
        }
        if buf.len() == buf.capacity() {
            buf.reserve(buf.capacity().max(INITIAL_BUFFER_SIZE));
        }

        let room = max_buffer_size - buf.len();
        let n = reader.read_buf(&mut (&mut buf).limit(room)).await?;
        if n == 0 {
            return Err(parser.eof_error());
        }
        tracing::trace!(n, buffered = buf.len(), "read request bytes");
    }

    parser.into_request().ok_or(ParseError::UnexpectedEof)
}
