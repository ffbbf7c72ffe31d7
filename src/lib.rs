//! A minimal web application server.
//!
//! Connections are accepted on one thread and handed to a fixed worker
//! pool. Each worker sniffs the protocol from the first bytes of the
//! connection, parses an HTTP/1.1 request, asks a [`Dispatcher`] for the
//! response and writes it back through a fixed-size output buffer. HTTP/2
//! is detected but not served.
//!
//! ```no_run
//! use mini_was::{Connector, ProtocolHandlerFactory, ServerConfig};
//!
//! let mut connector = Connector::new(ServerConfig::default(), ProtocolHandlerFactory::default());
//! connector.start()?;
//! connector.join();
//! # Ok::<(), mini_was::error::ServerError>(())
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod protocol;
pub mod server;
pub mod threads;
mod utils;

pub use config::ServerConfig;
pub use error::{ErrorKind, WasError};
pub use protocol::{Dispatcher, PlaceholderDispatcher, ProtocolHandler, ProtocolHandlerFactory};
pub use server::Connector;
