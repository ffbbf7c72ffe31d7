use std::io::Read;

use log::trace;

use crate::error::WasError;
use crate::http::{HttpMethod, HttpVersion};
use crate::protocol::PeekableStream;

/// Bytes needed to tell an HTTP/2 client preface from an HTTP/1.x request line.
pub const PREFACE_LEN: usize = 24;

const HTTP2_PREFACE: &[u8] = b"PRI * HTTP/2.0";

/// Picks the protocol version a connection speaks from its leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolSelector;

impl ProtocolSelector {
    /// Inspects the first [`PREFACE_LEN`] bytes of `input` without consuming
    /// them; the stream reads from its starting position afterward.
    ///
    /// # Errors
    ///
    /// [`WasError::VersionDetection`] when the connection delivers fewer than
    /// [`PREFACE_LEN`] bytes or the bytes match no supported protocol.
    pub fn detect<R: Read>(&self, input: &mut PeekableStream<R>) -> Result<HttpVersion, WasError> {
        let preface = input.peek(PREFACE_LEN)?;

        if preface.len() < PREFACE_LEN {
            return Err(WasError::version_detection(format!(
                "connection closed after {} of {} preface bytes",
                preface.len(),
                PREFACE_LEN
            )));
        }

        if preface.starts_with(HTTP2_PREFACE) {
            trace!("detected HTTP/2.0 preface");
            return Ok(HttpVersion::H2);
        }

        let is_http1 = HttpMethod::ALL.iter().any(|method| {
            let name = method.as_str().as_bytes();
            preface.starts_with(name) && preface.get(name.len()) == Some(&b' ')
        });
        if is_http1 {
            trace!("detected HTTP/1.1 request line");
            return Ok(HttpVersion::Http11);
        }

        Err(WasError::version_detection(format!(
            "unknown or unsupported protocol, preface: {:?}",
            String::from_utf8_lossy(preface)
        )))
    }
}
