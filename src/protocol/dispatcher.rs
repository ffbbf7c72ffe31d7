use crate::error::WasError;
use crate::http::{HttpBody, HttpHeader, HttpRequest, HttpResponse, HttpStatus, HttpVersion};

/// Application logic a protocol handler hands parsed requests to.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, WasError>;
}

pub const PLACEHOLDER_BODY: &str = "Hello from mini-was\r\n";

/// Answers every request with the same plain-text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDispatcher;

impl Dispatcher for PlaceholderDispatcher {
    fn dispatch(&self, _request: &HttpRequest) -> Result<HttpResponse, WasError> {
        let body = HttpBody::from(PLACEHOLDER_BODY);

        let mut header = HttpHeader::new();
        header.put("Content-Type", "text/plain; charset=UTF-8");
        header.put("Content-Length", body.len().to_string());

        Ok(HttpResponse::new(HttpVersion::Http11, HttpStatus::Ok, header, body))
    }
}
