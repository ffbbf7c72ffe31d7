//! Listening socket, acceptor thread and worker pool.
//!
//! One dedicated thread blocks in `accept`; every accepted connection is
//! wrapped in a [`SocketProcessor`] and queued on the worker pool. The
//! acceptor never reads from a connection itself.

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error, info};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::{ProtocolHandlerFactory, ProtocolSelector};
use crate::server::SocketProcessor;
use crate::threads::ThreadPool;

const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

pub struct Endpoint {
    config: ServerConfig,
    selector: ProtocolSelector,
    factory: Arc<ProtocolHandlerFactory>,
    running: Arc<AtomicBool>,
    server_id: Uuid,
    local_addr: Option<SocketAddr>,
    pool: Option<Arc<ThreadPool>>,
    acceptor: Option<JoinHandle<()>>,
}

impl Endpoint {
    pub fn new(config: ServerConfig, factory: Arc<ProtocolHandlerFactory>) -> Endpoint {
        Endpoint {
            config,
            selector: ProtocolSelector,
            factory,
            running: Arc::new(AtomicBool::new(false)),
            server_id: Uuid::new_v4(),
            local_addr: None,
            pool: None,
            acceptor: None,
        }
    }

    /// Binds the configured address, creates the worker pool and starts the
    /// acceptor thread. Returns once the socket is listening.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyStarted`] if called twice
    /// - [`ServerError::Bind`] if the address cannot be bound
    /// - [`ServerError::Pool`] for a zero-sized pool or a failed worker spawn
    /// - [`ServerError::Acceptor`] if the acceptor thread cannot be spawned
    pub fn start(&mut self) -> Result<(), ServerError> {
        if self.acceptor.is_some() || self.running.load(Ordering::SeqCst) {
            return Err(ServerError::AlreadyStarted);
        }

        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind { addr, source })?;
        let pool = Arc::new(ThreadPool::new(self.config.worker_pool_size)?);

        self.running.store(true, Ordering::SeqCst);
        let acceptor = Acceptor {
            listener,
            running: Arc::clone(&self.running),
            pool: Arc::clone(&pool),
            selector: self.selector,
            factory: Arc::clone(&self.factory),
            server_id: self.server_id,
        };

        let handle = match thread::Builder::new()
            .name(format!("acceptor-{}", local_addr.port()))
            .spawn(move || acceptor.run())
        {
            Ok(handle) => handle,
            Err(source) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(ServerError::Acceptor { source });
            }
        };

        info!(
            "[{}] listening on {} with {} workers",
            self.server_id,
            local_addr,
            pool.size()
        );
        self.local_addr = Some(local_addr);
        self.pool = Some(pool);
        self.acceptor = Some(handle);
        Ok(())
    }

    /// Stops accepting, waits for the acceptor thread and closes the pool's
    /// queue. Connections already queued still run to completion.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("[{}] stopping", self.server_id);

        if let Some(addr) = self.local_addr {
            wake_acceptor(addr);
        }
        if let Some(handle) = self.acceptor.take() {
            if handle.join().is_err() {
                error!("[{}] acceptor thread panicked", self.server_id);
            }
        }
        if let Some(pool) = &self.pool {
            pool.shutdown();
        }
        info!("[{}] stopped", self.server_id);
    }

    /// Blocks until the acceptor thread exits.
    pub fn join(&mut self) {
        if let Some(handle) = self.acceptor.take() {
            if handle.join().is_err() {
                error!("[{}] acceptor thread panicked", self.server_id);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn server_id(&self) -> Uuid {
        self.server_id
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved onto the acceptor thread.
struct Acceptor {
    listener: TcpListener,
    running: Arc<AtomicBool>,
    pool: Arc<ThreadPool>,
    selector: ProtocolSelector,
    factory: Arc<ProtocolHandlerFactory>,
    server_id: Uuid,
}

impl Acceptor {
    fn run(self) {
        debug!("[{}] waiting for client connections", self.server_id);

        for stream in self.listener.incoming() {
            //  Anything accepted after stop, the wake-up connection included, is dropped
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => self.submit(stream),
                Err(e) => error!("[{}] failed to accept connection: {}", self.server_id, e),
            }
        }

        debug!("[{}] acceptor exiting", self.server_id);
    }

    fn submit(&self, stream: TcpStream) {
        let processor = SocketProcessor::new(stream, self.selector, Arc::clone(&self.factory));
        debug!("[{}] accepted session {}", self.server_id, processor.session_id());

        if let Err(e) = self.pool.execute(move || processor.run()) {
            error!("[{}] could not queue connection: {}", self.server_id, e);
        }
    }
}

//  Unblocks a pending accept with a throwaway local connection
fn wake_acceptor(addr: SocketAddr) {
    let target = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    };
    if let Err(e) = TcpStream::connect_timeout(&target, WAKE_TIMEOUT) {
        debug!("wake-up connection to {} failed: {}", target, e);
    }
}
