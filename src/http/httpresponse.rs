use crate::http::{HttpBody, HttpHeader, HttpMessage, HttpStatus, HttpVersion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    message: HttpMessage,
    status: HttpStatus,
}

impl HttpResponse {
    pub fn new(version: HttpVersion, status: HttpStatus, header: HttpHeader, body: HttpBody) -> HttpResponse {
        HttpResponse {
            message: HttpMessage::new(version, header, body),
            status,
        }
    }

    pub fn status(&self) -> HttpStatus {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn reason(&self) -> &'static str {
        self.status.reason()
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
