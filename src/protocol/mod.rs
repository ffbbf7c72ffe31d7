//! Protocol detection and the per-version handlers.
//!
//! A connection is wrapped in a [`PeekableStream`], the [`ProtocolSelector`]
//! sniffs its leading bytes, and the [`ProtocolHandlerFactory`] hands back
//! the shared [`ProtocolHandler`] for the detected version.

pub mod dispatcher;
mod factory;
mod handler;
pub mod http1;
mod http2;
mod peekable;
mod selector;

pub use dispatcher::{Dispatcher, PlaceholderDispatcher};
pub use factory::ProtocolHandlerFactory;
pub use handler::ProtocolHandler;
pub use http2::Http2ProtocolHandler;
pub use peekable::PeekableStream;
pub use selector::{ProtocolSelector, PREFACE_LEN};
