use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream},
};

/// An accepted client connection, exclusively owned by one socket processor.
pub trait Connection: Send + 'static {
    type Reader: Read + Send + 'static;
    type Writer: Write + Send + 'static;

    /// Independent read and write halves of the connection.
    fn streams(&mut self) -> io::Result<(Self::Reader, Self::Writer)>;

    /// Peer description for log lines.
    fn peer(&self) -> String;

    fn close(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    type Reader = TcpStream;
    type Writer = TcpStream;

    fn streams(&mut self) -> io::Result<(TcpStream, TcpStream)> {
        Ok((self.try_clone()?, self.try_clone()?))
    }

    fn peer(&self) -> String {
        self.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown peer".to_string())
    }

    //  Shuts both directions down even while cloned handles are alive
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }
}
