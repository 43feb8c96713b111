use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::handler::Handler;

/// A running server: the accept loop lives on its own task.
pub struct Server {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    active: Arc<AtomicUsize>,
    accept_task: JoinHandle<()>,
}

/// Counts a connection task as active until dropped.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn track(active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(active))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Server {
    /// Binds `cfg.listen_addr` and starts accepting connections.
    pub async fn serve<H: Handler>(cfg: &Config, handler: H) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .await
            .with_context(|| format!("binding {}", cfg.listen_addr))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let active = Arc::new(AtomicUsize::new(0));

        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            cfg.max_buffer_size,
            running.clone(),
            shutdown.clone(),
            active.clone(),
        ));

        Ok(Self {
            local_addr,
            running,
            shutdown,
            active,
            accept_task,
        })
    }

    /// Returns the bound address, with the real port when bound to port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the accept loop is still taking connections.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of accepted connections whose task has not finished yet.
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Stops accepting and closes the listening socket.
    ///
    /// Connections already accepted keep running to completion.
    pub async fn close(self) -> anyhow::Result<()> {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
        self.accept_task.await.context("accept loop panicked")?;
        info!("Server closed");
        Ok(())
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    max_buffer_size: usize,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    active: Arc<AtomicUsize>,
) {
    while running.load(Ordering::SeqCst) {
        let accepted = tokio::select! {
            res = listener.accept() => res,
            _ = shutdown.notified() => break,
        };

        let (socket, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Error accepting connection");
                break;
            }
        };
        if !running.load(Ordering::SeqCst) {
            break;
        }
        info!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, handler.clone(), max_buffer_size);
        let guard = ActiveGuard::track(&active);
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }

    // listener drops here, closing the socket
    info!("Accept loop stopped");
}
