//! httpwire - HTTP/1.1 framing over raw TCP
//!
//! Incremental request parsing and order-enforced response writing, plus a
//! small server and demo handler built on them.

pub mod config;
pub mod demo;
pub mod http;
pub mod lines;
pub mod logging;
pub mod server;
