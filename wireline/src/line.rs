//! # Line
//!
//! Line-oriented connection shared by the FTP and SMTP control channels (and any other
//! telnet-style protocol): CRLF framed commands out, terminator-delimited units in.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::reader::{BufferedReader, StreamError};
use crate::socket::Socket;

/// Network line terminator
pub const CRLF: &[u8] = b"\r\n";
/// Bare line feed terminator
pub const LF: &[u8] = b"\n";

/// A connection exchanging text lines over a [`BufferedReader`]
#[derive(Debug)]
pub struct LineConnection<S = TcpStream>
where
    S: Socket,
{
    reader: BufferedReader<S>,
    host: String,
}

impl LineConnection<TcpStream> {
    /// Connect to the remote host
    pub fn connect<A: ToSocketAddrs>(addr: A) -> std::io::Result<Self> {
        TcpStream::connect(addr).map(Self::from_stream)
    }

    /// Connect to the remote host, giving up after `timeout`
    pub fn connect_timeout(addr: &SocketAddr, timeout: Duration) -> std::io::Result<Self> {
        TcpStream::connect_timeout(addr, timeout).map(Self::from_stream)
    }

    /// Wrap an already connected tcp stream
    pub fn from_stream(stream: TcpStream) -> Self {
        let host = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| String::from("<unknown>"));
        debug!("Established connection with {host}");
        Self::from_socket(stream, host)
    }
}

impl<S> LineConnection<S>
where
    S: Socket,
{
    /// Wrap any socket; `host` is only used to describe the peer in errors and logs
    pub fn from_socket(socket: S, host: impl Into<String>) -> Self {
        Self {
            reader: BufferedReader::new(socket),
            host: host.into(),
        }
    }

    /// Set the read timeout of the underlying reader
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.reader.set_read_timeout(timeout);
        self
    }

    /// Remote host this connection talks to
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    pub fn is_connected(&self) -> bool {
        self.reader.is_connected()
    }

    pub fn reader(&self) -> &BufferedReader<S> {
        &self.reader
    }

    /// Direct access to the reader and its pending buffer
    pub fn reader_mut(&mut self) -> &mut BufferedReader<S> {
        &mut self.reader
    }

    /// Send raw bytes
    pub fn send(&mut self, data: &[u8]) -> Result<(), StreamError> {
        self.reader.send(data)
    }

    /// Send `line` followed by CRLF
    pub fn send_line(&mut self, line: &str) -> Result<(), StreamError> {
        let mut data = Vec::with_capacity(line.len() + CRLF.len());
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(CRLF);
        self.reader.send(&data)
    }

    /// Read one CRLF terminated line; the terminator is stripped
    pub fn read_line(&mut self) -> Result<String, StreamError> {
        self.reader.read_crlf().map(|raw| decode_line(&raw))
    }

    /// Read one LF terminated line; the terminator (and a preceding CR) is stripped
    pub fn read_lf_line(&mut self) -> Result<String, StreamError> {
        self.reader.read_lf().map(|raw| decode_line(&raw))
    }

    /// Read raw bytes up to and including `terminator`
    pub fn read_until(&mut self, terminator: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.reader.read_until(terminator)
    }

    /// Read everything available now
    pub fn read_all(&mut self) -> Result<Vec<u8>, StreamError> {
        self.reader.read_all()
    }

    /// Whether a full unit ending with `terminator` is already buffered
    pub fn check_for(&self, terminator: &[u8]) -> bool {
        self.reader.check_for(terminator)
    }

    /// Close the connection. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if self.reader.is_connected() {
            debug!("Closing connection with {}", self.host);
        }
        self.reader.close();
    }
}

/// Resolve `addr` ahead of connecting, so failures can name the peer.
/// Returns the addresses together with the label of the first one.
pub(crate) fn resolve<A: ToSocketAddrs>(addr: A) -> std::io::Result<(String, Vec<SocketAddr>)> {
    let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
    let label = addrs
        .first()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| String::from("<unknown>"));
    Ok((label, addrs))
}

fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(LF).unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
