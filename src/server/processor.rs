//! Per-connection unit of work.
//!
//! A [`SocketProcessor`] owns one accepted connection and runs on a worker
//! thread: detect the protocol version, look up the handler, let it process
//! the request. The connection is closed on every way out of
//! [`SocketProcessor::run`].
//!
//! Failures before a handler exists (stream setup, version detection,
//! unsupported version) are logged and the connection is dropped without a
//! response. Failures raised by the handler, panics included, get a
//! best-effort error response through `handle_error`; if that fails a 500 is
//! tried once more, and if that also fails the connection is dropped.

use std::{
    any::Any,
    io::Write,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use log::{debug, error, warn};
use uuid::Uuid;

use crate::error::{ErrorKind, WasError};
use crate::http::HttpStatus;
use crate::protocol::{PeekableStream, ProtocolHandler, ProtocolHandlerFactory, ProtocolSelector};
use crate::server::Connection;

pub struct SocketProcessor<C: Connection> {
    connection: C,
    selector: ProtocolSelector,
    factory: Arc<ProtocolHandlerFactory>,
    session_id: Uuid,
}

impl<C: Connection> SocketProcessor<C> {
    pub fn new(connection: C, selector: ProtocolSelector, factory: Arc<ProtocolHandlerFactory>) -> SocketProcessor<C> {
        SocketProcessor {
            connection,
            selector,
            factory,
            session_id: Uuid::new_v4(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn run(self) {
        let session_id = self.session_id;
        let mut guard = ConnectionGuard { connection: self.connection, session_id };
        debug!("[{}] processing connection from {}", session_id, guard.connection.peer());

        let (reader, mut writer) = match guard.connection.streams() {
            Ok(streams) => streams,
            Err(e) => {
                error!("[{}] failed to open connection streams: {}", session_id, e);
                return;
            }
        };
        let mut input = PeekableStream::new(reader);

        let version = match self.selector.detect(&mut input) {
            Ok(version) => version,
            Err(e) => {
                warn!("[{}] {}, closing connection", session_id, e);
                return;
            }
        };

        let handler = match self.factory.get_handler(version) {
            Ok(handler) => handler,
            Err(e) => {
                error!("[{}] no handler for {}: {}", session_id, version, e);
                return;
            }
        };

        if let Err(cause) = guarded(|| handler.process(&mut input, &mut writer)) {
            send_error_response(handler, &mut writer, cause, session_id);
        }
    }
}

/// Closes the connection when dropped.
struct ConnectionGuard<C: Connection> {
    connection: C,
    session_id: Uuid,
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        match self.connection.close() {
            Ok(()) => debug!("[{}] connection closed", self.session_id),
            Err(e) => warn!("[{}] error while closing connection: {}", self.session_id, e),
        }
    }
}

fn send_error_response<W: Write>(handler: &dyn ProtocolHandler, output: &mut W, cause: WasError, session_id: Uuid) {
    let status = cause.status();
    match cause.kind() {
        ErrorKind::Parsing => warn!("[{}] {}, answering {}", session_id, cause, status),
        _ => error!("[{}] {}, answering {}", session_id, cause, status),
    }

    let first = match guarded(|| handler.handle_error(output, status, &cause)) {
        Ok(()) => return,
        Err(e) => e,
    };
    warn!("[{}] failed to send {} response: {}, falling back to 500", session_id, status, first);

    if let Err(second) = guarded(|| handler.handle_error(output, HttpStatus::InternalServerError, &first)) {
        error!("[{}] critical: fallback 500 response failed: {}, dropping connection", session_id, second);
    }
}

//  Panics from handler code become unexpected failures
fn guarded<F>(f: F) -> Result<(), WasError>
where
    F: FnOnce() -> Result<(), WasError>,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(WasError::unexpected(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {}", message)
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, WriteError};
    use crate::http::HttpVersion;
    use crate::protocol::Http2ProtocolHandler;
    use std::io::{self, Cursor, Read};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    const GET: &[u8] = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct MockConnection {
        input: Vec<u8>,
        output: SharedBuffer,
        closed: Arc<AtomicBool>,
        broken: bool,
    }

    impl MockConnection {
        fn new(input: &[u8]) -> MockConnection {
            MockConnection {
                input: input.to_vec(),
                output: SharedBuffer::default(),
                closed: Arc::new(AtomicBool::new(false)),
                broken: false,
            }
        }
    }

    impl Connection for MockConnection {
        type Reader = Cursor<Vec<u8>>;
        type Writer = SharedBuffer;

        fn streams(&mut self) -> io::Result<(Self::Reader, Self::Writer)> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "socket reset"));
            }
            Ok((Cursor::new(self.input.clone()), self.output.clone()))
        }

        fn peer(&self) -> String {
            "mock".to_string()
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    enum Behavior {
        Succeed,
        Fail(fn() -> WasError),
        Panic,
    }

    /// Handler double recording every `handle_error` call.
    struct ScriptedHandler {
        process: Behavior,
        failing_error_responses: AtomicUsize,
        processed: AtomicUsize,
        error_calls: Mutex<Vec<(HttpStatus, String)>>,
    }

    impl ScriptedHandler {
        fn new(process: Behavior, failing_error_responses: usize) -> Arc<ScriptedHandler> {
            Arc::new(ScriptedHandler {
                process,
                failing_error_responses: AtomicUsize::new(failing_error_responses),
                processed: AtomicUsize::new(0),
                error_calls: Mutex::new(Vec::new()),
            })
        }

        fn statuses(&self) -> Vec<HttpStatus> {
            self.error_calls.lock().unwrap().iter().map(|(status, _)| *status).collect()
        }
    }

    impl ProtocolHandler for ScriptedHandler {
        fn version(&self) -> HttpVersion {
            HttpVersion::Http11
        }

        fn process(&self, input: &mut dyn Read, _output: &mut dyn Write) -> Result<(), WasError> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            let mut request = Vec::new();
            input.read_to_end(&mut request)?;
            match self.process {
                Behavior::Succeed => Ok(()),
                Behavior::Fail(error) => Err(error()),
                Behavior::Panic => panic!("handler exploded"),
            }
        }

        fn handle_error(&self, _output: &mut dyn Write, status: HttpStatus, cause: &WasError) -> Result<(), WasError> {
            self.error_calls.lock().unwrap().push((status, cause.to_string()));
            let remaining = self.failing_error_responses.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_error_responses.store(remaining - 1, Ordering::SeqCst);
                return Err(WriteError::from(io::Error::from(io::ErrorKind::BrokenPipe)).into());
            }
            Ok(())
        }
    }

    fn run_with(handler: &Arc<ScriptedHandler>, connection: MockConnection) -> Arc<AtomicBool> {
        let closed = Arc::clone(&connection.closed);
        let factory = ProtocolHandlerFactory::new(handler.clone(), Arc::new(Http2ProtocolHandler));
        SocketProcessor::new(connection, ProtocolSelector, Arc::new(factory)).run();
        closed
    }

    fn parse_failure() -> WasError {
        ParseError::EmptyRequestLine.into()
    }

    fn write_failure() -> WasError {
        WriteError::NotCommitted.into()
    }

    #[test]
    fn successful_request_closes_the_connection() {
        let handler = ScriptedHandler::new(Behavior::Succeed, 0);
        let closed = run_with(&handler, MockConnection::new(GET));

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.processed.load(Ordering::SeqCst), 1);
        assert!(handler.statuses().is_empty());
    }

    #[test]
    fn handler_sees_the_stream_from_its_first_byte() {
        struct Capture(Mutex<Vec<u8>>);
        impl ProtocolHandler for Capture {
            fn version(&self) -> HttpVersion {
                HttpVersion::Http11
            }
            fn process(&self, input: &mut dyn Read, _output: &mut dyn Write) -> Result<(), WasError> {
                input.read_to_end(&mut self.0.lock().unwrap())?;
                Ok(())
            }
            fn handle_error(&self, _: &mut dyn Write, _: HttpStatus, _: &WasError) -> Result<(), WasError> {
                Ok(())
            }
        }

        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        let factory = ProtocolHandlerFactory::new(capture.clone(), Arc::new(Http2ProtocolHandler));
        SocketProcessor::new(MockConnection::new(GET), ProtocolSelector, Arc::new(factory)).run();

        assert_eq!(capture.0.lock().unwrap().as_slice(), GET);
    }

    #[test]
    fn detection_failure_closes_without_a_response() {
        let handler = ScriptedHandler::new(Behavior::Succeed, 0);
        let connection = MockConnection::new(b"HELLO THERE, THIS IS NOT HTTP AT ALL\r\n");
        let output = connection.output.clone();
        let closed = run_with(&handler, connection);

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.processed.load(Ordering::SeqCst), 0);
        assert!(handler.statuses().is_empty());
        assert!(output.text().is_empty());
    }

    #[test]
    fn short_preface_closes_without_a_response() {
        let handler = ScriptedHandler::new(Behavior::Succeed, 0);
        let closed = run_with(&handler, MockConnection::new(b"GET / HTTP/1.1\r\n"));

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.processed.load(Ordering::SeqCst), 0);
        assert!(handler.statuses().is_empty());
    }

    #[test]
    fn broken_streams_close_without_a_response() {
        let handler = ScriptedHandler::new(Behavior::Succeed, 0);
        let mut connection = MockConnection::new(GET);
        connection.broken = true;
        let closed = run_with(&handler, connection);

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.processed.load(Ordering::SeqCst), 0);
        assert!(handler.statuses().is_empty());
    }

    #[test]
    fn parse_failure_is_answered_with_400() {
        let handler = ScriptedHandler::new(Behavior::Fail(parse_failure), 0);
        let closed = run_with(&handler, MockConnection::new(GET));

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.statuses(), [HttpStatus::BadRequest]);
    }

    #[test]
    fn write_failure_is_answered_with_500() {
        let handler = ScriptedHandler::new(Behavior::Fail(write_failure), 0);
        let closed = run_with(&handler, MockConnection::new(GET));

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.statuses(), [HttpStatus::InternalServerError]);
    }

    #[test]
    fn handler_panic_is_answered_with_500() {
        let handler = ScriptedHandler::new(Behavior::Panic, 0);
        let closed = run_with(&handler, MockConnection::new(GET));

        assert!(closed.load(Ordering::SeqCst));
        let calls = handler.error_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, HttpStatus::InternalServerError);
        assert!(calls[0].1.contains("handler exploded"));
    }

    #[test]
    fn failed_error_response_falls_back_to_500_once() {
        let handler = ScriptedHandler::new(Behavior::Fail(parse_failure), 1);
        let closed = run_with(&handler, MockConnection::new(GET));

        assert!(closed.load(Ordering::SeqCst));
        let calls = handler.error_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, HttpStatus::BadRequest);
        assert_eq!(calls[1].0, HttpStatus::InternalServerError);
        assert!(calls[1].1.starts_with("response writing failed"));
    }

    #[test]
    fn failed_fallback_gives_up_and_closes() {
        let handler = ScriptedHandler::new(Behavior::Fail(parse_failure), usize::MAX);
        let closed = run_with(&handler, MockConnection::new(GET));

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handler.statuses(), [HttpStatus::BadRequest, HttpStatus::InternalServerError]);
    }

    #[test]
    fn http2_connections_are_dropped_without_a_response() {
        let connection = MockConnection::new(b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n");
        let output = connection.output.clone();
        let closed = Arc::clone(&connection.closed);

        SocketProcessor::new(connection, ProtocolSelector, Arc::new(ProtocolHandlerFactory::default())).run();

        assert!(closed.load(Ordering::SeqCst));
        assert!(output.text().is_empty());
    }

    #[test]
    fn default_handlers_answer_a_well_formed_request() {
        let connection = MockConnection::new(GET);
        let output = connection.output.clone();

        SocketProcessor::new(connection, ProtocolSelector, Arc::new(ProtocolHandlerFactory::default())).run();

        assert!(output.text().starts_with("HTTP/1.1 200 OK\r\n"));
    }

    #[test]
    fn default_handlers_answer_a_malformed_request_with_400() {
        let connection = MockConnection::new(b"GET /path-without-a-version-token\r\n\r\n");
        let output = connection.output.clone();

        SocketProcessor::new(connection, ProtocolSelector, Arc::new(ProtocolHandlerFactory::default())).run();

        let text = output.text();
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Connection: close\r\n"));
    }
}
