use std::io::{Read, Write};
use std::sync::Arc;

use log::debug;

use crate::error::WasError;
use crate::http::{HttpBody, HttpHeader, HttpResponse, HttpStatus, HttpVersion};
use crate::protocol::http1::{Http1RequestParser, Http1ResponseWriter};
use crate::protocol::{Dispatcher, ProtocolHandler};

/// HTTP/1.1: parse one request, dispatch it, write the response.
pub struct Http1ProtocolHandler {
    parser: Http1RequestParser,
    writer: Http1ResponseWriter,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Http1ProtocolHandler {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Http1ProtocolHandler {
        Http1ProtocolHandler {
            parser: Http1RequestParser,
            writer: Http1ResponseWriter,
            dispatcher,
        }
    }
}

impl ProtocolHandler for Http1ProtocolHandler {
    fn version(&self) -> HttpVersion {
        HttpVersion::Http11
    }

    fn process(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<(), WasError> {
        let request = self.parser.parse(input)?;
        debug!("{} {} {}", request.method(), request.path(), request.version());

        let response = self.dispatcher.dispatch(&request)?;
        self.writer.write(output, &response)?;
        Ok(())
    }

    fn handle_error(&self, output: &mut dyn Write, status: HttpStatus, cause: &WasError) -> Result<(), WasError> {
        let body = HttpBody::from(error_page(status, &cause.to_string()));

        let mut header = HttpHeader::new();
        header.put("Content-Type", "text/html; charset=UTF-8");
        header.put("Connection", "close");

        let response = HttpResponse::new(HttpVersion::Http11, status, header, body);
        self.writer.write(output, &response)?;
        Ok(())
    }
}

fn error_page(status: HttpStatus, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{code} {reason}</title></head>\n<body>\n<h1>{code} {reason}</h1>\n<p>{message}</p>\n</body>\n</html>\n",
        code = status.code(),
        reason = status.reason(),
        message = escape_html(message),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
