//! Sends each line typed on stdin as one UDP datagram.
//!
//! The target defaults to the configured listen address; `TARGET` overrides it.

use anyhow::Context;
use httpwire::config::Config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UdpSocket;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    httpwire::logging::init(&cfg.log)?;

    let target = std::env::var("TARGET").unwrap_or(cfg.listen_addr);
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket
        .connect(&target)
        .await
        .with_context(|| format!("connecting UDP socket to {target}"))?;
    tracing::info!("Sending lines to {}", target);

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        line.clear();
        if stdin.read_line(&mut line).await? == 0 {
            break;
        }

        socket
            .send(line.as_bytes())
            .await
            .context("sending datagram")?;
    }

    Ok(())
}
