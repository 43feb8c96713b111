#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use httpwire::http::connection::Connection;
use httpwire::http::handler::Handler;
use httpwire::http::parser::DEFAULT_MAX_BUFFER_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, ReadBuf};

/// Hands out at most `bytes_per_read` bytes per read, then end of stream.
pub struct ChunkReader {
    data: Vec<u8>,
    bytes_per_read: usize,
    pos: usize,
}

impl ChunkReader {
    pub fn new(data: impl Into<Vec<u8>>, bytes_per_read: usize) -> Self {
        Self {
            data: data.into(),
            bytes_per_read,
            pos: 0,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let end = (this.pos + this.bytes_per_read)
            .min(this.data.len())
            .min(this.pos + buf.remaining());

        buf.put_slice(&this.data[this.pos..end]);
        this.pos = end;

        Poll::Ready(Ok(()))
    }
}

pub const COFFEE_REQUEST: &str =
    "GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

/// Runs one connection over an in-memory pipe: sends `request`, closes the
/// client's write side, and collects everything the server wrote.
pub async fn exchange<H: Handler>(handler: H, request: &[u8]) -> (anyhow::Result<()>, String) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let result = Connection::new(server, Arc::new(handler), DEFAULT_MAX_BUFFER_SIZE)
        .run()
        .await;

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    (result, String::from_utf8(response).unwrap())
}
