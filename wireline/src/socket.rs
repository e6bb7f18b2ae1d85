//! # Socket
//!
//! The raw byte-stream primitive the buffered reader is built on.
//! A [`Socket`] can send, drain whatever is pending without blocking and wait, up to a timeout,
//! for the peer to make more bytes available.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Size of the stack buffer used while draining a socket
const READ_CHUNK_SIZE: usize = 4096;

/// Outcome of waiting for a socket to become readable
#[derive(Debug)]
pub enum PollStatus {
    /// There is something to read (bytes or end of stream)
    Ready,
    /// Nothing arrived within the timeout
    Timeout,
    /// The wait was interrupted by a signal
    Interrupted,
    /// The wait failed
    Error(io::Error),
}

/// Outcome of draining a socket without blocking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// This many bytes were appended to the buffer
    Bytes(usize),
    /// Nothing is pending right now
    Nothing,
    /// The peer closed its side and nothing was read
    Closed,
}

/// A bidirectional byte stream with non-blocking reads and a bounded wait for readability.
pub trait Socket {
    /// Write the whole slice, blocking until it has been handed to the OS.
    fn send_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Append every byte currently pending to `buf`, without blocking.
    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<Received>;

    /// Block until the socket becomes readable or `timeout` elapses.
    fn poll_readable(&mut self, timeout: Duration) -> PollStatus;

    /// Shut down both directions of the stream.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Socket for TcpStream {
    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)?;
        self.flush()
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<Received> {
        self.set_nonblocking(true)?;
        let result = drain(self, buf);
        self.set_nonblocking(false)?;
        result
    }

    fn poll_readable(&mut self, timeout: Duration) -> PollStatus {
        // a zero read timeout is rejected by the OS layer
        let timeout = timeout.max(Duration::from_millis(1));
        if let Err(err) = self.set_read_timeout(Some(timeout)) {
            return PollStatus::Error(err);
        }
        let mut probe = [0u8; 1];
        let status = match self.peek(&mut probe) {
            Ok(_) => PollStatus::Ready,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                PollStatus::Timeout
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => PollStatus::Interrupted,
            Err(err) => PollStatus::Error(err),
        };
        match self.set_read_timeout(None) {
            Ok(()) => status,
            Err(err) => PollStatus::Error(err),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            // the peer may have gone already
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }
}

/// Read from a non-blocking reader until it would block or reaches EOF
fn drain<R: Read>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Received> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut total = 0;
    loop {
        match reader.read(&mut chunk) {
            Ok(0) if total == 0 => return Ok(Received::Closed),
            Ok(0) => break,
            Ok(len) => {
                buf.extend_from_slice(&chunk[..len]);
                total += len;
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => break,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    if total == 0 {
        Ok(Received::Nothing)
    } else {
        Ok(Received::Bytes(total))
    }
}

#[cfg(test)]
mod test {

    use std::net::TcpListener;
    use std::time::Instant;

    use pretty_assertions::assert_eq;

    use super::*;

    fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn should_report_nothing_pending() {
        crate::log_init();
        let (mut client, _server) = socket_pair();
        let mut buf = Vec::new();
        assert_eq!(client.read_available(&mut buf).unwrap(), Received::Nothing);
        assert!(buf.is_empty());
    }

    #[test]
    fn should_drain_pending_bytes() {
        crate::log_init();
        let (mut client, mut server) = socket_pair();
        server.send_all(b"hello").unwrap();
        assert!(matches!(
            client.poll_readable(Duration::from_secs(5)),
            PollStatus::Ready
        ));
        let mut buf = Vec::new();
        let mut received = 0;
        while received < 5 {
            if let Received::Bytes(len) = client.read_available(&mut buf).unwrap() {
                received += len;
            }
        }
        assert_eq!(buf.as_slice(), b"hello");
    }

    #[test]
    fn should_time_out_when_peer_is_silent() {
        crate::log_init();
        let (mut client, _server) = socket_pair();
        let started = Instant::now();
        assert!(matches!(
            client.poll_readable(Duration::from_millis(50)),
            PollStatus::Timeout
        ));
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn should_report_closed_peer() {
        crate::log_init();
        let (mut client, server) = socket_pair();
        drop(server);
        assert!(matches!(
            client.poll_readable(Duration::from_secs(5)),
            PollStatus::Ready
        ));
        let mut buf = Vec::new();
        assert_eq!(client.read_available(&mut buf).unwrap(), Received::Closed);
    }
}
