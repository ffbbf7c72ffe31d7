use crate::http::{HttpBody, HttpHeader, HttpVersion};

/// Parts shared by requests and responses, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage {
    version: HttpVersion,
    header: HttpHeader,
    body: HttpBody,
}

impl HttpMessage {
    pub fn new(version: HttpVersion, header: HttpHeader, body: HttpBody) -> HttpMessage {
        HttpMessage { version, header, body }
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn header(&self) -> &HttpHeader {
        &self.header
    }

    pub fn body(&self) -> &HttpBody {
        &self.body
    }
}
