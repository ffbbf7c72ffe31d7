//! Connection acceptance and per-connection processing.

mod connection;
mod connector;
mod endpoint;
mod processor;

pub use connection::Connection;
pub use connector::Connector;
pub use endpoint::Endpoint;
pub use processor::SocketProcessor;
