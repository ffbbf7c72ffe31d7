//! Buffered HTTP/1.1 response output.
//!
//! [`OutputBuffer`] sits between a response writer and the socket. It holds
//! a fixed 8 KiB buffer, so a body of any size is sent with bounded memory
//! and one underlying write per full buffer.
//!
//! The header block is always emitted in this order:
//!
//! 1. status line
//! 2. `Date` (RFC 1123, GMT)
//! 3. `Server`
//! 4. `Content-Type`, `application/octet-stream` unless the response sets one
//! 5. `Content-Length`, from the body's actual length
//! 6. every other response header
//! 7. blank line
//!
//! Caller-set `Date`, `Server`, `Content-Type` and `Content-Length` fields are
//! never repeated in step 6.

use std::io::{self, Write};
use std::time::SystemTime;

use httpdate::fmt_http_date;
use log::trace;

use crate::error::WriteError;
use crate::http::{HttpResponse, HttpVersion};

pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MANDATORY_HEADERS: [&str; 4] = ["Date", "Server", "Content-Type", "Content-Length"];

/// Per-response output state: buffered bytes and whether headers are committed.
pub struct OutputBuffer<W: Write> {
    output: W,
    buffer: Box<[u8]>,
    pos: usize,
    committed: bool,
}

impl<W: Write> OutputBuffer<W> {
    pub fn new(output: W) -> OutputBuffer<W> {
        OutputBuffer {
            output,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            committed: false,
        }
    }

    /// Serializes the status line and header block, flushes them to the
    /// socket and commits. Does nothing once committed.
    ///
    /// # Errors
    ///
    /// [`WriteError::UnsupportedVersion`] for anything but HTTP/1.1, or
    /// [`WriteError::Io`] if the socket write fails.
    pub fn send_headers(&mut self, response: &HttpResponse) -> Result<(), WriteError> {
        if self.committed {
            return Ok(());
        }

        if response.version() != HttpVersion::Http11 {
            return Err(WriteError::UnsupportedVersion { version: response.version() });
        }

        let header = response.header();
        let content_type = header
            .first("Content-Type")
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut head = Vec::with_capacity(256);
        write!(head, "{} {} {}\r\n", response.version(), response.status_code(), response.reason())?;
        write!(head, "Date: {}\r\n", fmt_http_date(SystemTime::now()))?;
        write!(head, "Server: {}\r\n", SERVER_NAME)?;
        write!(head, "Content-Type: {}\r\n", content_type)?;
        write!(head, "Content-Length: {}\r\n", response.body().len())?;

        for (name, values) in header.iter() {
            if MANDATORY_HEADERS.iter().any(|mandatory| mandatory.eq_ignore_ascii_case(name)) {
                continue;
            }
            for value in values {
                write!(head, "{}: {}\r\n", name, value)?;
            }
        }
        head.extend_from_slice(b"\r\n");

        self.write_internal(&head)?;
        self.flush()?;
        self.committed = true;
        trace!("committed {} byte header block", head.len());
        Ok(())
    }

    /// Buffers body bytes, writing through to the socket whenever the
    /// buffer fills.
    ///
    /// # Errors
    ///
    /// [`WriteError::NotCommitted`] before [`send_headers`](Self::send_headers).
    pub fn write_body(&mut self, data: &[u8]) -> Result<(), WriteError> {
        if !self.committed {
            return Err(WriteError::NotCommitted);
        }
        self.write_internal(data)?;
        Ok(())
    }

    /// Drains the buffer and flushes the socket.
    pub fn flush(&mut self) -> Result<(), WriteError> {
        self.flush_internal()?;
        self.output.flush()?;
        Ok(())
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    fn write_internal(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            let count = (self.buffer.len() - self.pos).min(data.len());
            self.buffer[self.pos..self.pos + count].copy_from_slice(&data[..count]);
            self.pos += count;
            data = &data[count..];

            if self.pos == self.buffer.len() {
                self.flush_internal()?;
            }
        }
        Ok(())
    }

    fn flush_internal(&mut self) -> io::Result<()> {
        if self.pos > 0 {
            self.output.write_all(&self.buffer[..self.pos])?;
            self.pos = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpBody, HttpHeader, HttpStatus};

    /// Records every write the buffer makes to the socket.
    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl RecordingWriter {
        fn output(&self) -> String {
            String::from_utf8(self.writes.concat()).unwrap()
        }
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn response(header: HttpHeader, body: HttpBody) -> HttpResponse {
        HttpResponse::new(HttpVersion::Http11, HttpStatus::Ok, header, body)
    }

    fn header_lines(output: &str) -> Vec<&str> {
        let head = &output[..output.find("\r\n\r\n").unwrap()];
        head.split("\r\n").collect()
    }

    #[test]
    fn headers_follow_the_fixed_order() {
        let mut header = HttpHeader::new();
        header.put("X-Custom-Header", "ABC123");
        header.put("Content-Type", "application/json");

        let mut writer = RecordingWriter::default();
        let mut buffer = OutputBuffer::new(&mut writer);
        buffer.send_headers(&response(header, HttpBody::empty())).unwrap();
        assert!(buffer.is_committed());

        let output = writer.output();
        let lines = header_lines(&output);
        assert_eq!(lines[0], "HTTP/1.1 200 OK");
        assert!(lines[1].starts_with("Date: ") && lines[1].ends_with(" GMT"));
        assert_eq!(lines[2], format!("Server: {}", SERVER_NAME));
        assert_eq!(lines[3], "Content-Type: application/json");
        assert_eq!(lines[4], "Content-Length: 0");
        assert_eq!(lines[5], "X-Custom-Header: ABC123");
        assert_eq!(lines.len(), 6);
        assert!(output.ends_with("\r\n\r\n"));
    }

    #[test]
    fn headers_are_flushed_immediately() {
        let mut writer = RecordingWriter::default();
        OutputBuffer::new(&mut writer).send_headers(&response(HttpHeader::new(), HttpBody::empty())).unwrap();

        assert_eq!(writer.writes.len(), 1);
        assert_eq!(writer.flushes, 1);
    }

    #[test]
    fn content_type_defaults_to_octet_stream() {
        let mut writer = RecordingWriter::default();
        OutputBuffer::new(&mut writer).send_headers(&response(HttpHeader::new(), HttpBody::empty())).unwrap();

        assert!(writer.output().contains("Content-Type: application/octet-stream\r\n"));
    }

    #[test]
    fn content_length_comes_from_the_body_only() {
        let mut header = HttpHeader::new();
        header.put("Content-Length", "999");
        header.put("content-length", "1000");

        let mut writer = RecordingWriter::default();
        OutputBuffer::new(&mut writer).send_headers(&response(header, HttpBody::from("four"))).unwrap();

        let output = writer.output();
        assert_eq!(output.matches("Content-Length").count(), 1);
        assert!(output.contains("Content-Length: 4\r\n"));
    }

    #[test]
    fn mandatory_headers_are_not_repeated() {
        let mut header = HttpHeader::new();
        header.put("Content-Type", "text/html; charset=utf-8");
        header.put("Date", "Thu, 01 Jan 1970 00:00:00 GMT");
        header.put("server", "other");
        header.put("X-Custom-Header", "ShouldBeIncluded");
        header.put("X-Custom-Header", "AlsoIncluded");

        let mut writer = RecordingWriter::default();
        OutputBuffer::new(&mut writer).send_headers(&response(header, HttpBody::empty())).unwrap();

        let output = writer.output();
        assert_eq!(output.matches("Content-Type:").count(), 1);
        assert_eq!(output.matches("Date:").count(), 1);
        assert_eq!(output.matches("Server:").count(), 1);
        assert!(!output.contains("1970"));
        assert!(output.contains("X-Custom-Header: ShouldBeIncluded\r\nX-Custom-Header: AlsoIncluded\r\n"));
    }

    #[test]
    fn second_send_headers_is_a_no_op() {
        let mut writer = RecordingWriter::default();
        let mut buffer = OutputBuffer::new(&mut writer);
        let response = response(HttpHeader::new(), HttpBody::empty());

        buffer.send_headers(&response).unwrap();
        buffer.send_headers(&response).unwrap();
        buffer.flush().unwrap();

        assert_eq!(writer.output().matches("HTTP/1.1 200 OK").count(), 1);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let response = HttpResponse::new(HttpVersion::H2, HttpStatus::Ok, HttpHeader::new(), HttpBody::empty());

        let mut writer = RecordingWriter::default();
        let mut buffer = OutputBuffer::new(&mut writer);
        assert!(matches!(buffer.send_headers(&response), Err(WriteError::UnsupportedVersion { .. })));
        assert!(!buffer.is_committed());
    }

    #[test]
    fn body_before_commit_is_a_state_error() {
        let mut writer = RecordingWriter::default();
        let mut buffer = OutputBuffer::new(&mut writer);

        assert!(matches!(buffer.write_body(b"early"), Err(WriteError::NotCommitted)));
        drop(buffer);
        assert!(writer.writes.is_empty());
    }

    #[test]
    fn body_follows_the_blank_line() {
        let body = HttpBody::from("This is dummy data");
        let response = response(HttpHeader::new(), body.clone());

        let mut writer = RecordingWriter::default();
        let mut buffer = OutputBuffer::new(&mut writer);
        buffer.send_headers(&response).unwrap();
        buffer.write_body(body.as_bytes()).unwrap();
        buffer.flush().unwrap();

        let output = writer.output();
        assert!(output.contains("Content-Length: 18\r\n"));
        let start = output.find("\r\n\r\n").unwrap() + 4;
        assert_eq!(&output[start..], "This is dummy data");
    }

    #[test]
    fn large_bodies_are_written_in_full_buffers() {
        let body = vec![b'x'; 2 * DEFAULT_BUFFER_SIZE + 100];

        let mut writer = RecordingWriter::default();
        let mut buffer = OutputBuffer::new(&mut writer);
        buffer.send_headers(&response(HttpHeader::new(), HttpBody::new(body.clone()))).unwrap();
        buffer.write_body(&body).unwrap();
        buffer.flush().unwrap();

        let sizes: Vec<usize> = writer.writes.iter().map(Vec::len).collect();
        assert_eq!(sizes.len(), 4);
        assert_eq!(&sizes[1..], [DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_SIZE, 100]);
    }
}
