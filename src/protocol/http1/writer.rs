use std::io::Write;

use crate::error::WriteError;
use crate::http::HttpResponse;
use crate::protocol::http1::OutputBuffer;

/// Serializes a whole response through a fresh [`OutputBuffer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Http1ResponseWriter;

impl Http1ResponseWriter {
    pub fn write<W: Write>(&self, output: W, response: &HttpResponse) -> Result<(), WriteError> {
        let mut buffer = OutputBuffer::new(output);
        buffer.send_headers(response)?;
        buffer.write_body(response.body().as_bytes())?;
        buffer.flush()
    }
}
