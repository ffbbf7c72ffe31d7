use std::io::{self, Read};

/// Reader with an explicit lookahead buffer.
///
/// [`peek`](PeekableStream::peek) pulls bytes from the inner reader without
/// consuming them: the next reads return the peeked bytes first, then
/// continue with the inner reader. Only as many bytes as were asked for are
/// ever pulled ahead.
#[derive(Debug)]
pub struct PeekableStream<R> {
    inner: R,
    lookahead: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekableStream<R> {
    pub fn new(inner: R) -> PeekableStream<R> {
        PeekableStream { inner, lookahead: Vec::new(), pos: 0 }
    }

    /// Returns up to `n` unread bytes. Fewer than `n` means the inner reader
    /// reached end of stream.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.buffered() < n {
            let mut chunk = vec![0u8; n - self.buffered()];
            match self.inner.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => self.lookahead.extend_from_slice(&chunk[..read]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        let end = self.pos + n.min(self.buffered());
        Ok(&self.lookahead[self.pos..end])
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn buffered(&self) -> usize {
        self.lookahead.len() - self.pos
    }
}

impl<R: Read> Read for PeekableStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buffered() == 0 {
            return self.inner.read(buf);
        }

        let count = buf.len().min(self.buffered());
        buf[..count].copy_from_slice(&self.lookahead[self.pos..self.pos + count]);
        self.pos += count;

        if self.pos == self.lookahead.len() {
            self.lookahead.clear();
            self.pos = 0;
        }
        Ok(count)
    }
}
