use std::sync::Arc;

use crate::error::WasError;
use crate::http::HttpVersion;
use crate::protocol::http1::Http1ProtocolHandler;
use crate::protocol::http2::Http2ProtocolHandler;
use crate::protocol::{Dispatcher, PlaceholderDispatcher, ProtocolHandler};

/// Maps a detected version to the handler shared by all its connections.
///
/// Built once at startup and handed to the endpoint.
#[derive(Clone)]
pub struct ProtocolHandlerFactory {
    http1: Arc<dyn ProtocolHandler>,
    http2: Arc<dyn ProtocolHandler>,
}

impl ProtocolHandlerFactory {
    pub fn new(http1: Arc<dyn ProtocolHandler>, http2: Arc<dyn ProtocolHandler>) -> ProtocolHandlerFactory {
        ProtocolHandlerFactory { http1, http2 }
    }

    pub fn with_dispatcher(dispatcher: Arc<dyn Dispatcher>) -> ProtocolHandlerFactory {
        ProtocolHandlerFactory::new(
            Arc::new(Http1ProtocolHandler::new(dispatcher)),
            Arc::new(Http2ProtocolHandler),
        )
    }

    pub fn get_handler(&self, version: HttpVersion) -> Result<&dyn ProtocolHandler, WasError> {
        match version {
            HttpVersion::Http11 => Ok(self.http1.as_ref()),
            HttpVersion::H2 => Ok(self.http2.as_ref()),
            other => Err(WasError::unsupported(format!("{} protocol handling", other))),
        }
    }
}

impl Default for ProtocolHandlerFactory {
    fn default() -> Self {
        ProtocolHandlerFactory::with_dispatcher(Arc::new(PlaceholderDispatcher))
    }
}

impl std::fmt::Debug for ProtocolHandlerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHandlerFactory")
            .field("http1", &self.http1.version())
            .field("http2", &self.http2.version())
            .finish()
    }
}
