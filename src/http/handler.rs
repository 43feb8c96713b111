use std::future::Future;

use tokio::io::AsyncWrite;

use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

/// Application logic invoked once per connection with a complete request.
///
/// Implementations drive `writer` through one legal sequence: status line,
/// headers, then either a body or chunks, the chunk terminator and trailers.
/// An error returned before anything was written becomes a 500 response.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        request: &Request,
        writer: &mut ResponseWriter<W>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}
