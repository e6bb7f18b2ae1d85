//! # Reader
//!
//! A terminator-seeking reader over a non-blocking [`Socket`].
//!
//! Bytes received from the peer are accumulated in a pending buffer until the caller consumes them.
//! Bytes only ever enter at the tail and leave as a prefix, so nothing is lost between calls and a
//! terminator split across two deliveries is still found.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::socket::{PollStatus, Received, Socket};

/// Default time to wait for the peer while looking for a terminator
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by the stream layer
#[derive(Debug, Error)]
pub enum StreamError {
    /// The connection was never opened or has been closed
    #[error("Not connected")]
    NotConnected,
    /// Nothing arrived within the read timeout
    #[error("Timed out waiting for data")]
    Timeout,
    /// The wait was interrupted
    #[error("Interrupted while waiting for data")]
    Interrupted,
    /// The underlying socket failed, or the peer hung up mid-unit
    #[error("I/O error: {0}")]
    Io(io::Error),
}

/// Buffered reader wrapping an optional socket.
///
/// The socket is `None` when the reader was never connected or after [`BufferedReader::close`].
#[derive(Debug)]
pub struct BufferedReader<S>
where
    S: Socket,
{
    socket: Option<S>,
    pending: Vec<u8>,
    read_timeout: Duration,
}

impl<S> BufferedReader<S>
where
    S: Socket,
{
    /// Wrap an open socket
    pub fn new(socket: S) -> Self {
        Self {
            socket: Some(socket),
            pending: Vec::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// A reader with no socket behind it; every I/O call fails with [`StreamError::NotConnected`]
    pub fn disconnected() -> Self {
        Self {
            socket: None,
            pending: Vec::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the timeout used by [`BufferedReader::read_until`]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the timeout used by [`BufferedReader::read_until`]
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    /// Get the current read timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns whether a socket is attached
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Returns a reference to the underlying socket, if connected
    pub fn get_ref(&self) -> Option<&S> {
        self.socket.as_ref()
    }

    /// Returns a mutable reference to the underlying socket, if connected
    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.socket.as_mut()
    }

    /// Shut down and release the socket, discarding any pending data.
    /// Closing an already closed reader does nothing.
    pub fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(err) = socket.shutdown() {
                debug!("socket shutdown failed: {err}");
            }
        }
        self.pending.clear();
    }

    /// Write all of `data` to the socket
    pub fn send(&mut self, data: &[u8]) -> Result<(), StreamError> {
        self.socket_mut()?.send_all(data).map_err(StreamError::Io)
    }

    /// Take everything pending, after draining whatever the socket has right now.
    /// Never blocks; returns an empty buffer if nothing is available.
    pub fn read_all(&mut self) -> Result<Vec<u8>, StreamError> {
        self.fill()?;
        Ok(std::mem::take(&mut self.pending))
    }

    /// Read up to and including the first occurrence of `terminator`.
    ///
    /// Already buffered data is searched before touching the socket. When the terminator is not
    /// there yet, pending socket bytes are drained, then the reader waits up to the read timeout
    /// for more. An empty terminator behaves like [`BufferedReader::read_all`].
    pub fn read_until(&mut self, terminator: &[u8]) -> Result<Vec<u8>, StreamError> {
        if terminator.is_empty() {
            return self.read_all();
        }
        let mut searched_from = 0;
        loop {
            if let Some(pos) = find(&self.pending[searched_from..], terminator) {
                return Ok(self.consume(searched_from + pos + terminator.len()));
            }
            // a match can only start within the last `terminator.len() - 1` bytes seen so far
            searched_from = self.pending.len().saturating_sub(terminator.len() - 1);
            match self.fill()? {
                Received::Bytes(_) => continue,
                Received::Closed => {
                    return Err(StreamError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed before terminator",
                    )))
                }
                Received::Nothing => {}
            }
            let timeout = self.read_timeout;
            match self.socket_mut()?.poll_readable(timeout) {
                PollStatus::Ready => continue,
                PollStatus::Timeout => return Err(StreamError::Timeout),
                PollStatus::Interrupted => return Err(StreamError::Interrupted),
                PollStatus::Error(err) => return Err(StreamError::Io(err)),
            }
        }
    }

    /// Read a CRLF terminated unit, terminator included
    pub fn read_crlf(&mut self) -> Result<Vec<u8>, StreamError> {
        self.read_until(b"\r\n")
    }

    /// Read a LF terminated unit, terminator included
    pub fn read_lf(&mut self) -> Result<Vec<u8>, StreamError> {
        self.read_until(b"\n")
    }

    /// Returns whether `terminator` already occurs in the buffered data. Never touches the socket.
    pub fn check_for(&self, terminator: &[u8]) -> bool {
        find(&self.pending, terminator).is_some()
    }

    // -- buffer

    /// Bytes received but not consumed yet
    pub fn pending(&self) -> &[u8] {
        self.pending.as_slice()
    }

    /// Replace the pending buffer
    pub fn set_pending(&mut self, data: Vec<u8>) {
        self.pending = data;
    }

    /// Append bytes to the tail of the pending buffer
    pub fn append_pending(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Drop all pending bytes
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the first `len` pending bytes (or all of them, if fewer)
    pub fn consume(&mut self, len: usize) -> Vec<u8> {
        let len = len.min(self.pending.len());
        self.pending.drain(..len).collect()
    }

    fn socket_mut(&mut self) -> Result<&mut S, StreamError> {
        self.socket.as_mut().ok_or(StreamError::NotConnected)
    }

    /// Move whatever the socket has into the pending buffer
    fn fill(&mut self) -> Result<Received, StreamError> {
        let socket = self.socket.as_mut().ok_or(StreamError::NotConnected)?;
        let received = socket
            .read_available(&mut self.pending)
            .map_err(StreamError::Io)?;
        if let Received::Bytes(len) = received {
            trace!("buffered {len} bytes ({} pending)", self.pending.len());
        }
        Ok(received)
    }
}

/// Position of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_socket::ScriptedSocket;

    #[test]
    fn should_read_until_terminator_split_across_deliveries() {
        crate::log_init();
        let mut reader = BufferedReader::new(ScriptedSocket::new(["USER an", "on\r", "\nPASS x\r\n"]));
        assert_eq!(reader.read_crlf().unwrap(), b"USER anon\r\n");
        assert_eq!(reader.read_crlf().unwrap(), b"PASS x\r\n");
        assert!(reader.pending().is_empty());
    }

    #[test]
    fn should_reconstruct_stream_from_successive_reads() {
        let stream = b"alpha;beta;;gamma;tail";
        for split in 1..stream.len() {
            let chunks: Vec<&[u8]> = stream.chunks(split).collect();
            let mut reader = BufferedReader::new(ScriptedSocket::new(chunks));
            let mut rebuilt = Vec::new();
            loop {
                match reader.read_until(b";") {
                    Ok(unit) => {
                        assert!(unit.ends_with(b";"));
                        assert_eq!(unit.iter().filter(|b| **b == b';').count(), 1);
                        rebuilt.extend(unit);
                    }
                    Err(StreamError::Timeout) => break,
                    Err(err) => panic!("unexpected error {err}"),
                }
            }
            rebuilt.extend_from_slice(reader.pending());
            assert_eq!(rebuilt.as_slice(), stream);
            assert_eq!(reader.pending(), b"tail");
        }
    }

    #[test]
    fn should_find_long_terminator_across_deliveries() {
        let stream = b"line\r\n.not yet\r\n\r\n.\r\nrest";
        for split in 1..stream.len() {
            let chunks: Vec<&[u8]> = stream.chunks(split).collect();
            let mut reader = BufferedReader::new(ScriptedSocket::new(chunks));
            assert_eq!(
                reader.read_until(b"\r\n.\r\n").unwrap(),
                b"line\r\n.not yet\r\n\r\n.\r\n"
            );
            assert_eq!(reader.read_until(b"t").unwrap(), b"rest");
        }
    }

    #[test]
    fn should_not_touch_socket_when_terminator_is_buffered() {
        let mut reader = BufferedReader::new(ScriptedSocket::new(["one\ntwo\n"]));
        assert_eq!(reader.read_lf().unwrap(), b"one\n");
        let drains = reader.get_ref().unwrap().drains;
        assert_eq!(reader.read_lf().unwrap(), b"two\n");
        assert_eq!(reader.get_ref().unwrap().drains, drains);
    }

    #[test]
    fn should_wait_for_late_data() {
        // an empty delivery is a drain with nothing pending, followed by a successful wait
        let mut reader = BufferedReader::new(ScriptedSocket::new(["220 re", "", "ady\r\n"]));
        assert_eq!(reader.read_crlf().unwrap(), b"220 ready\r\n");
    }

    #[test]
    fn should_time_out_without_losing_data() {
        let mut reader = BufferedReader::new(ScriptedSocket::new(["partial"]))
            .with_read_timeout(Duration::from_millis(10));
        assert!(matches!(reader.read_crlf(), Err(StreamError::Timeout)));
        assert_eq!(reader.pending(), b"partial");
    }

    #[test]
    fn should_fail_when_peer_closes_before_terminator() {
        let mut reader = BufferedReader::new(ScriptedSocket::new(["no newline"]).closing());
        match reader.read_lf() {
            Err(StreamError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF, got {other:?}"),
        }
    }

    #[test]
    fn should_read_everything_pending() {
        let mut reader = BufferedReader::new(ScriptedSocket::new(["abc", "def"]));
        assert_eq!(reader.read_all().unwrap(), b"abc");
        assert_eq!(reader.read_until(b"").unwrap(), b"def");
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn check_for_should_be_idempotent() {
        let mut reader = BufferedReader::new(ScriptedSocket::new(["x\r\ny"]));
        assert!(!reader.check_for(b"\r\n"));
        reader.read_until(b"y").unwrap();
        reader.append_pending(b"left\r\nover");
        for _ in 0..5 {
            assert!(reader.check_for(b"\r\n"));
            assert!(!reader.check_for(b"missing"));
            assert_eq!(reader.pending(), b"left\r\nover");
        }
    }

    #[test]
    fn should_manipulate_buffer() {
        let mut reader: BufferedReader<ScriptedSocket> = BufferedReader::disconnected();
        reader.set_pending(b"hello world".to_vec());
        assert_eq!(reader.consume(6), b"hello ");
        assert_eq!(reader.pending(), b"world");
        assert_eq!(reader.consume(100), b"world");
        reader.append_pending(b"again");
        reader.clear_pending();
        assert!(reader.pending().is_empty());
    }

    #[test]
    fn should_fail_when_not_connected() {
        let mut reader: BufferedReader<ScriptedSocket> = BufferedReader::disconnected();
        assert!(matches!(reader.read_crlf(), Err(StreamError::NotConnected)));
        assert!(matches!(reader.send(b"NOOP\r\n"), Err(StreamError::NotConnected)));
    }

    #[test]
    fn should_close_once_and_clear_buffer() {
        let mut reader = BufferedReader::new(ScriptedSocket::new(["data\n"]));
        reader.read_all().unwrap();
        reader.append_pending(b"stale");
        reader.close();
        reader.close();
        assert!(!reader.is_connected());
        assert!(reader.pending().is_empty());
        assert!(matches!(reader.read_all(), Err(StreamError::NotConnected)));
    }

    #[test]
    fn should_send_through_socket() {
        let mut reader = BufferedReader::new(ScriptedSocket::default());
        reader.send(b"NOOP\r\n").unwrap();
        assert_eq!(reader.get_ref().unwrap().sent, b"NOOP\r\n");
    }
}
