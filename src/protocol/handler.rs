use std::io::{Read, Write};

use crate::error::WasError;
use crate::http::{HttpStatus, HttpVersion};

/// Parse, process and write for one connection of a given protocol version.
///
/// One instance serves every connection of its version concurrently, so
/// implementations keep per-request state in locals, never in fields.
pub trait ProtocolHandler: Send + Sync {
    fn version(&self) -> HttpVersion;

    fn process(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<(), WasError>;

    /// Writes an error response for `cause` with the given status.
    fn handle_error(&self, output: &mut dyn Write, status: HttpStatus, cause: &WasError) -> Result<(), WasError>;
}
