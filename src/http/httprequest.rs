use crate::http::{HttpBody, HttpHeader, HttpMessage, HttpMethod, HttpVersion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    message: HttpMessage,
    method: HttpMethod,
    path: String,
}

impl HttpRequest {
    pub fn new(
        method: HttpMethod,
        path: impl Into<String>,
        version: HttpVersion,
        header: HttpHeader,
        body: HttpBody,
    ) -> HttpRequest {
        HttpRequest {
            message: HttpMessage::new(version, header, body),
            method,
            path: path.into(),
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    //  Raw request target, query string included
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> HttpVersion {
        self.message.version()
    }

    pub fn header(&self) -> &HttpHeader {
        self.message.header()
    }

    pub fn body(&self) -> &HttpBody {
        self.message.body()
    }

    pub fn message(&self) -> &HttpMessage {
        &self.message
    }
}
