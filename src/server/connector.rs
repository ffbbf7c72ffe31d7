use std::{net::SocketAddr, sync::Arc};

use log::{error, info};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::ProtocolHandlerFactory;
use crate::server::Endpoint;

/// Public face of the server: owns the endpoint and its lifecycle.
pub struct Connector {
    endpoint: Endpoint,
}

impl Connector {
    pub fn new(config: ServerConfig, factory: ProtocolHandlerFactory) -> Connector {
        Connector { endpoint: Endpoint::new(config, Arc::new(factory)) }
    }

    pub fn start(&mut self) -> Result<(), ServerError> {
        let config = self.endpoint.config();
        info!(
            "[{}] starting server on {} with a pool of {}",
            self.endpoint.server_id(),
            config.socket_addr(),
            config.worker_pool_size
        );
        self.endpoint.start().map_err(|e| {
            error!("[{}] failed to start: {}", self.endpoint.server_id(), e);
            e
        })
    }

    pub fn stop(&mut self) {
        info!("[{}] shutting down", self.endpoint.server_id());
        self.endpoint.stop();
    }

    /// Blocks the caller until the server stops accepting.
    pub fn join(&mut self) {
        self.endpoint.join();
    }

    pub fn is_running(&self) -> bool {
        self.endpoint.is_running()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.endpoint.local_addr()
    }

    /// The configured port; `local_addr` has the bound one.
    pub fn port(&self) -> u16 {
        self.endpoint.config().port
    }
}
