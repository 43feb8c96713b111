use std::fmt;

use tokio::io::AsyncWrite;

use crate::http::headers::Headers;
use crate::http::writer::{ResponseWriter, WriteError};

/// HTTP status code.
///
/// Any numeric code can be written; the ones with constants here also have a
/// reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 201 Created
    pub const CREATED: StatusCode = StatusCode(201);
    /// 204 No Content
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the standard reason phrase, or `""` for codes not in the table.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode(299).reason_phrase(), "");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Headers every response starts from.
///
/// The connection is always closed after one response, so `Connection:
/// close` is part of the defaults. Handlers `replace` or `remove` entries
/// (e.g. dropping `Content-Length` for a chunked body).
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.push_known("Content-Length", content_len.to_string());
    headers.push_known("Connection", "close".to_string());
    headers.push_known("Content-Type", "text/plain".to_string());
    headers
}

/// A complete plain-text error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Writes status line, default headers and the message as the body.
    pub async fn write_to<W>(&self, writer: &mut ResponseWriter<W>) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_status_line(self.status).await?;
        writer
            .write_headers(&default_headers(self.message.len()))
            .await?;
        writer.write_body(self.message.as_bytes()).await?;
        Ok(())
    }
}
