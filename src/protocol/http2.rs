use std::io::{Read, Write};

use crate::error::WasError;
use crate::http::{HttpStatus, HttpVersion};
use crate::protocol::ProtocolHandler;

/// Recognized so HTTP/2 clients are routed somewhere; fails every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Http2ProtocolHandler;

impl ProtocolHandler for Http2ProtocolHandler {
    fn version(&self) -> HttpVersion {
        HttpVersion::H2
    }

    fn process(&self, _input: &mut dyn Read, _output: &mut dyn Write) -> Result<(), WasError> {
        Err(WasError::unsupported("HTTP/2.0 request processing"))
    }

    fn handle_error(&self, _output: &mut dyn Write, _status: HttpStatus, _cause: &WasError) -> Result<(), WasError> {
        Err(WasError::unsupported("HTTP/2.0 error responses"))
    }
}
