//! Data channel handling: `PORT`/`PASV` negotiation and the payload loop

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use super::FtpStream;
use crate::command::Command;
use crate::reader::StreamError;
use crate::regex::{PASV_PORT_RE, TRANSFER_SIZE_RE};
use crate::reply::Reply;
use crate::socket::{PollStatus, Received, Socket};
use crate::status::Status;
use crate::types::{FileType, FtpError, FtpResult, Mode};

/// Pause between two attempts to accept the server data connection
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a data channel transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Bytes received; empty when sending
    pub data: Vec<u8>,
    /// Reply read once the data channel was closed
    pub reply: Reply,
}

/// Format the argument of `PORT`: four address octets, then the port high byte and low byte
pub fn format_port_argument(ip: Ipv4Addr, port: u16) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{a},{b},{c},{d},{},{}", port >> 8, port & 0xff)
}

/// Data channel failure, before the command and host are attached
#[derive(Debug)]
enum ChannelError {
    Stream(StreamError),
    /// The announced size was not reached; holds what arrived
    Short { expected: usize, data: Vec<u8> },
}

impl FtpStream {
    /// Run `command` over a fresh data channel.
    ///
    /// When `payload` is `None` the payload is received: either until the size announced in the
    /// preliminary reply has arrived, or until the channel stays quiet for the incoming data
    /// timeout. Otherwise `payload` is sent whole.
    /// The reply following the transfer is read in both cases and returned unchecked. It is also
    /// read when the data channel fails once the server has accepted the command, so the control
    /// channel stays in step.
    pub fn transfer_data(
        &mut self,
        command: Command,
        file_type: FileType,
        payload: Option<&[u8]>,
    ) -> FtpResult<Transfer> {
        self.transfer_type(file_type)?;
        let operation = command.redacted();
        let (mut socket, reply) = match self.mode {
            Mode::Active => {
                let listener = self.open_data_listener()?;
                let reply = self.execute(command)?;
                let reply = self.require_preliminary(reply, &operation)?;
                match self.accept_data_connection(&listener, &operation) {
                    Ok(socket) => (socket, reply),
                    Err(err) => {
                        self.discard_reply();
                        return Err(err);
                    }
                }
            }
            Mode::Passive => {
                let addr = self.passive_address()?;
                debug!("Connecting to data port {addr}");
                let socket = TcpStream::connect_timeout(&addr, self.accept_timeout)
                    .map_err(|err| self.connection_error(err))?;
                let reply = self.execute(command)?;
                (socket, self.require_preliminary(reply, &operation)?)
            }
        };

        let outcome = match payload {
            Some(bytes) => {
                trace!("DC OUT: {} bytes", bytes.len());
                socket
                    .send_all(bytes)
                    .map(|()| Vec::new())
                    .map_err(|err| ChannelError::Stream(StreamError::Io(err)))
            }
            None => {
                let expected = expected_size(&reply);
                trace!("Expecting {:?} bytes", expected);
                receive_payload(&mut socket, expected, self.incoming_data_timeout)
            }
        };
        if let Err(err) = Socket::shutdown(&mut socket) {
            debug!("Failed to shut down data channel: {err}");
        }
        drop(socket);

        let reply = self.get_reply();
        let data = outcome.map_err(|err| self.data_error(&operation, err))?;
        Ok(Transfer {
            data,
            reply: reply?,
        })
    }

    fn require_preliminary(&self, reply: Reply, operation: &str) -> FtpResult<Reply> {
        if reply.is_positive_preliminary() {
            Ok(reply)
        } else {
            Err(self.unexpected(operation, reply))
        }
    }

    /// Read the reply closing a transfer that failed on the data channel
    fn discard_reply(&mut self) {
        match self.get_reply() {
            Ok(reply) => debug!("Transfer aborted; server replied {reply}"),
            Err(err) => debug!("No reply after aborted transfer: {err}"),
        }
    }

    fn data_error(&self, operation: &str, err: ChannelError) -> FtpError {
        match err {
            ChannelError::Stream(source) => FtpError::from_stream(operation, self.host(), source),
            ChannelError::Short { expected, data } => FtpError::IncompleteTransfer {
                operation: operation.to_string(),
                host: self.host().to_string(),
                expected,
                data,
            },
        }
    }

    /// Bind an ephemeral port and advertise it to the server with `PORT`
    fn open_data_listener(&mut self) -> FtpResult<TcpListener> {
        debug!("Starting local tcp listener...");
        let ip = self.local_ipv4()?;
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))
            .map_err(|err| self.connection_error(err))?;
        let port = listener
            .local_addr()
            .map_err(|err| self.connection_error(err))?
            .port();
        debug!("Active mode, listening on {}:{}", ip, port);
        let reply = self.do_port(format_port_argument(ip, port))?;
        self.require_completion(reply, "PORT")?;
        listener
            .set_nonblocking(true)
            .map_err(|err| self.connection_error(err))?;
        Ok(listener)
    }

    /// Address of our end of the control channel, which the server can already reach
    fn local_ipv4(&self) -> FtpResult<Ipv4Addr> {
        let stream = self
            .conn
            .reader()
            .get_ref()
            .ok_or(FtpError::NotConnected)?;
        match stream
            .local_addr()
            .map_err(|err| self.connection_error(err))?
            .ip()
        {
            IpAddr::V4(ip) => Ok(ip),
            IpAddr::V6(ip) => ip
                .to_ipv4_mapped()
                .ok_or_else(|| FtpError::InvalidAddress(ip.to_string())),
        }
    }

    fn accept_data_connection(
        &self,
        listener: &TcpListener,
        operation: &str,
    ) -> FtpResult<TcpStream> {
        let start = Instant::now();
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    trace!("Data connection from {peer}");
                    stream
                        .set_nonblocking(false)
                        .map_err(|err| self.connection_error(err))?;
                    break Ok(stream);
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() > self.accept_timeout {
                        error!("No data connection after {:?}", self.accept_timeout);
                        break Err(FtpError::DataConnectionTimeout {
                            operation: operation.to_string(),
                            host: self.host().to_string(),
                            timeout: self.accept_timeout,
                        });
                    }
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(err) => break Err(self.connection_error(err)),
            }
        }
    }

    /// Runs the PASV command to enter passive mode.
    fn passive_address(&mut self) -> FtpResult<SocketAddr> {
        debug!("PASV command");
        let reply = self.do_pasv()?;
        // PASV response format : 227 Entering Passive Mode (h1,h2,h3,h4,p1,p2).
        let reply = self.require(reply, Status::PassiveMode, "PASV")?;
        let text = reply.text();
        let numbers: Option<Vec<u8>> = PASV_PORT_RE.captures(&text).and_then(|caps| {
            caps.iter()
                .skip(1)
                .map(|group| group.and_then(|m| m.as_str().parse::<u8>().ok()))
                .collect()
        });
        match numbers.as_deref() {
            Some(&[a, b, c, d, msb, lsb]) => {
                let addr = SocketAddr::from((
                    Ipv4Addr::new(a, b, c, d),
                    (u16::from(msb) << 8) | u16::from(lsb),
                ));
                trace!("Passive address: {addr}");
                Ok(addr)
            }
            _ => {
                error!("Cannot read passive address from {:?}", text);
                Err(FtpError::BadResponse {
                    operation: String::from("PASV"),
                    host: self.host().to_string(),
                    line: text,
                })
            }
        }
    }
}

/// Byte count some servers announce in the preliminary reply, e.g. `(1234 bytes)`
fn expected_size(reply: &Reply) -> Option<usize> {
    TRANSFER_SIZE_RE
        .captures(&reply.text())
        .and_then(|caps| caps[1].parse::<usize>().ok())
}

/// Receive loop of the data channel.
///
/// With a known size, the transfer ends once that many bytes arrived; falling silent or closing
/// earlier is an error carrying what was received. Without one, silence and close both end it.
fn receive_payload<S: Socket>(
    socket: &mut S,
    expected: Option<usize>,
    timeout: Duration,
) -> Result<Vec<u8>, ChannelError> {
    let mut data = Vec::new();
    loop {
        match socket
            .read_available(&mut data)
            .map_err(|err| ChannelError::Stream(StreamError::Io(err)))?
        {
            Received::Bytes(read) => {
                trace!("DC IN: {read} bytes");
                continue;
            }
            Received::Closed => {
                trace!("DC IN: closed by peer");
                return short_of(expected, data);
            }
            Received::Nothing => {}
        }
        if expected.is_some_and(|expected| data.len() >= expected) {
            return Ok(data);
        }
        match socket.poll_readable(timeout) {
            PollStatus::Ready => {}
            PollStatus::Timeout => {
                trace!("DC IN: quiet for {:?}", timeout);
                return short_of(expected, data);
            }
            PollStatus::Interrupted => return Err(ChannelError::Stream(StreamError::Interrupted)),
            PollStatus::Error(err) => return Err(ChannelError::Stream(StreamError::Io(err))),
        }
    }
}

/// Close the receive loop: fine when unbounded or complete
fn short_of(expected: Option<usize>, data: Vec<u8>) -> Result<Vec<u8>, ChannelError> {
    match expected {
        Some(expected) if data.len() < expected => {
            error!(
                "Data channel ended after {} of {} bytes",
                data.len(),
                expected
            );
            Err(ChannelError::Short { expected, data })
        }
        _ => Ok(data),
    }
}
