pub use httpbody::HttpBody;
pub use httpheader::{to_title_case, HttpHeader};
pub use httpmessage::HttpMessage;
pub use httpmethod::HttpMethod;
pub use httprequest::HttpRequest;
pub use httpresponse::HttpResponse;
pub use httpstatus::HttpStatus;
pub use httpversion::HttpVersion;

mod httpbody;
mod httpheader;
mod httpmessage;
mod httpmethod;
mod httprequest;
mod httpresponse;
mod httpstatus;
mod httpversion;
