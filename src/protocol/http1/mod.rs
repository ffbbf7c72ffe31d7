//! HTTP/1.1 request parsing, response output and the protocol handler
//! tying them together.

mod handler;
mod outputbuffer;
mod parser;
mod writer;

pub use handler::Http1ProtocolHandler;
pub use outputbuffer::{OutputBuffer, DEFAULT_BUFFER_SIZE, SERVER_NAME};
pub use parser::{Http1RequestParser, MAX_LINE_BYTES};
pub use writer::Http1ResponseWriter;
