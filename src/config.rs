use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WORKER_POOL_SIZE: usize = 10;

/// Values the embedding entry point supplies at startup.
///
/// Port `0` asks the OS for a free port; the bound one is reported by
/// `Endpoint::local_addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub ip: IpAddr,
    pub port: u16,
    pub worker_pool_size: usize,
}

impl ServerConfig {
    pub fn new(port: u16, worker_pool_size: usize) -> ServerConfig {
        ServerConfig { ip: DEFAULT_IP, port, worker_pool_size }
    }

    pub fn with_ip(self, ip: IpAddr) -> ServerConfig {
        ServerConfig { ip, ..self }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig::new(DEFAULT_PORT, DEFAULT_WORKER_POOL_SIZE)
    }
}
