//! Prints every line received on each accepted TCP connection.

use httpwire::config::Config;
use httpwire::lines::lines_channel;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    httpwire::logging::init(&cfg.log)?;

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Listening on {}", cfg.listen_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::info!("Accepted connection from {}", peer);

        let mut lines = lines_channel(socket);
        while let Some(line) = lines.recv().await {
            println!("{line}");
        }

        tracing::info!("Connection from {} closed", peer);
    }
}
