//! HTTP/1.1 request parsing.
//!
//! The request is read in three phases, each finished before the next
//! starts: request line, header lines up to the blank line, then a body of
//! exactly `Content-Length` bytes. Lines end in `\r\n` or a bare `\n`.
//!
//! Input is pulled a byte at a time while reading lines, so nothing past the
//! declared body is ever consumed from the connection.

use std::io::Read;

use log::trace;

use crate::error::{ParseError, WasError};
use crate::http::{HttpBody, HttpHeader, HttpMethod, HttpRequest, HttpVersion};
use crate::utils::ensure;

/// Longest request line or header line accepted, terminator included.
pub const MAX_LINE_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct Http1RequestParser;

impl Http1RequestParser {
    /// Reads one request from `input`.
    ///
    /// # Errors
    ///
    /// - [`WasError::Parsing`] for a malformed request line or header, an
    ///   unknown method or version, an invalid `Content-Length`, a body cut
    ///   short, or an I/O failure while reading
    /// - [`WasError::Unsupported`] for chunked transfer-encoding and bodies
    ///   larger than addressable memory
    pub fn parse<R: Read + ?Sized>(&self, input: &mut R) -> Result<HttpRequest, WasError> {
        let (method, path, version) = parse_request_line(input)?;
        let header = parse_header(input)?;

        if let Some(values) = header.get("Transfer-Encoding") {
            if values.iter().any(|value| value.to_ascii_lowercase().contains("chunked")) {
                return Err(WasError::unsupported("chunked transfer-encoding"));
            }
        }

        let body = match header.first("Content-Length") {
            Some(value) if !value.is_empty() => {
                let length = value
                    .parse::<u64>()
                    .map_err(|_| ParseError::invalid_content_length(value))?;
                parse_body(input, length)?
            }
            _ => HttpBody::empty(),
        };

        trace!("parsed {} {} {} with {} body bytes", method, path, version, body.len());
        Ok(HttpRequest::new(method, path, version, header, body))
    }
}

fn parse_request_line<R: Read + ?Sized>(input: &mut R) -> Result<(HttpMethod, String, HttpVersion), ParseError> {
    let line = match read_line(input)? {
        Some(line) if !line.is_empty() => line,
        _ => return Err(ParseError::EmptyRequestLine),
    };

    //  e.g. GET /posts/123?sort=desc HTTP/1.1
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::malformed_request_line(&line));
    };

    let method = method.parse::<HttpMethod>()?;
    let version = version.parse::<HttpVersion>()?;
    Ok((method, target.to_string(), version))
}

//  Stops at the blank line, or at end of stream
fn parse_header<R: Read + ?Sized>(input: &mut R) -> Result<HttpHeader, ParseError> {
    let mut header = HttpHeader::new();
    while let Some(line) = read_line(input)? {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::malformed_header(&line))?;
        header.put(name.trim(), value.trim());
    }
    Ok(header)
}

fn parse_body<R: Read + ?Sized>(input: &mut R, length: u64) -> Result<HttpBody, WasError> {
    if length == 0 {
        return Ok(HttpBody::empty());
    }
    if usize::try_from(length).is_err() {
        return Err(WasError::unsupported(format!("a {} byte body", length)));
    }

    //  Grows with the bytes actually received, not the declared length
    let mut data = Vec::new();
    input.take(length).read_to_end(&mut data).map_err(ParseError::from)?;

    let received = data.len() as u64;
    ensure!(received == length, ParseError::TruncatedBody { expected: length, received }.into());
    Ok(HttpBody::new(data))
}

/// Reads through the next `\n`, returning the line without its terminator.
/// `None` at end of stream with nothing read.
fn read_line<R: Read + ?Sized>(input: &mut R) -> Result<Option<String>, ParseError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match input.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                if byte[0] == b'\n' {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    return decode(line).map(Some);
                }
                ensure!(line.len() < MAX_LINE_BYTES, ParseError::LineTooLong { max_size: MAX_LINE_BYTES });
                line.push(byte[0]);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if line.is_empty() {
        Ok(None)
    } else {
        decode(line).map(Some)
    }
}

fn decode(line: Vec<u8>) -> Result<String, ParseError> {
    String::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)
}
