//! HTTP/1.1 message framing over raw byte streams.
//!
//! One request and one response per connection; the connection is closed
//! afterwards.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive header container and field-line parsing
//! - **`request`**: method, request-line and the completed request
//! - **`parser`**: incremental request parser and its driving read loop
//! - **`response`**: status codes, default headers, plain error responses
//! - **`writer`**: response writer that enforces write order
//! - **`handler`**: the seam application code implements
//! - **`connection`**: reads a request, invokes the handler, closes
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Feed bytes to the parser until Parsed
//!        └──────┬──────┘
//!     parsed    │    parse error
//!        ┌──────┴───────────┐
//!        ▼                  ▼
//!  ┌──────────┐      ┌─────────────┐
//!  │ Handling │      │  Rejecting  │ ← 400, or 500 for I/O errors
//!  └────┬─────┘      └──────┬──────┘
//!       └─────────┬─────────┘
//!                 ▼
//!          ┌─────────────┐
//!          │   Closed    │
//!          └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use httpwire::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:42069").await?;
//!     let handler = Arc::new(MyHandler);
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, handler.clone(), 1024 * 1024);
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod handler;
pub mod writer;
