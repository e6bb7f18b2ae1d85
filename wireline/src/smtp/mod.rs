//! # SMTP
//!
//! A minimal SMTP client: every command is one line answered by one single-line reply.
//! Any reply code above 399 is treated as a failure.

mod command;

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

pub use command::SmtpCommand;

use crate::line::{resolve, LineConnection};
use crate::reply::{read_reply, Reply, SMTP_REPLY};
use crate::types::{SmtpError, SmtpResult};

/// Highest reply code which still means success
const LAST_SUCCESS_CODE: u32 = 399;
/// Reply to `DATA` inviting the client to send the message
const START_MAIL_INPUT: u32 = 354;

#[derive(Debug)]
pub struct SmtpStream {
    conn: LineConnection<TcpStream>,
    welcome_msg: Option<String>,
    last_reply: Option<Reply>,
    /// Command whose reply is awaited; named in errors
    operation: String,
}

impl SmtpStream {
    /// Try to connect to the remote server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> SmtpResult<Self> {
        let (host, addrs) = resolve(addr).map_err(|source| SmtpError::ConnectionError {
            host: String::from("<unresolved>"),
            source,
        })?;
        debug!("Connecting to server {host}");
        TcpStream::connect(addrs.as_slice())
            .map_err(|source| SmtpError::ConnectionError { host, source })
            .and_then(Self::connect_with_stream)
    }

    /// Try to connect to the remote server but with the specified timeout
    pub fn connect_timeout(addr: SocketAddr, timeout: Duration) -> SmtpResult<Self> {
        debug!("Connecting to server {addr}");
        TcpStream::connect_timeout(&addr, timeout)
            .map_err(|source| SmtpError::ConnectionError {
                host: addr.to_string(),
                source,
            })
            .and_then(Self::connect_with_stream)
    }

    /// Connect using provided configured tcp stream; reads the server greeting
    pub fn connect_with_stream(stream: TcpStream) -> SmtpResult<Self> {
        let mut smtp_stream = Self {
            conn: LineConnection::from_stream(stream),
            welcome_msg: None,
            last_reply: None,
            operation: String::from("connect"),
        };
        let greeting = smtp_stream.get_reply()?;
        let greeting = smtp_stream.check(greeting, "connect")?;
        debug!("Server READY; greeting: {}", greeting.text());
        smtp_stream.welcome_msg = Some(greeting.text());
        Ok(smtp_stream)
    }

    /// Set the timeout for replies
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.conn.reader_mut().set_read_timeout(timeout);
        self
    }

    pub fn get_welcome_msg(&self) -> Option<&str> {
        self.welcome_msg.as_deref()
    }

    /// The reply to the latest command
    pub fn last_reply(&self) -> Option<&Reply> {
        self.last_reply.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    pub fn host(&self) -> &str {
        self.conn.host()
    }

    /// Read the next reply line
    pub fn get_reply(&mut self) -> SmtpResult<Reply> {
        if !self.conn.is_connected() {
            return Err(SmtpError::NotConnected);
        }
        let reply = read_reply(&mut self.conn, &SMTP_REPLY)
            .map_err(|err| SmtpError::from_reply(&self.operation, self.host(), err))?;
        self.last_reply = Some(reply.clone());
        Ok(reply)
    }

    /// Send `command` and read its reply, whatever its code
    pub fn send_command(&mut self, command: &SmtpCommand) -> SmtpResult<Reply> {
        if !self.conn.is_connected() {
            return Err(SmtpError::NotConnected);
        }
        self.operation = command.to_string();
        trace!("CC OUT: {command}");
        self.conn
            .send_line(&self.operation)
            .map_err(|err| SmtpError::from_stream(&self.operation, self.host(), err))?;
        self.get_reply()
    }

    pub fn helo<S: AsRef<str>>(&mut self, domain: S) -> SmtpResult<Reply> {
        self.checked(SmtpCommand::Helo(domain.as_ref().to_string()))
    }

    pub fn mail_from<S: AsRef<str>>(&mut self, sender: S) -> SmtpResult<Reply> {
        debug!("Starting mail from {}", sender.as_ref());
        self.checked(SmtpCommand::MailFrom(sender.as_ref().to_string()))
    }

    pub fn rcpt_to<S: AsRef<str>>(&mut self, recipient: S) -> SmtpResult<Reply> {
        debug!("Adding recipient {}", recipient.as_ref());
        self.checked(SmtpCommand::RcptTo(recipient.as_ref().to_string()))
    }

    /// `DATA`; the server must invite us to send the message
    pub fn start_data(&mut self) -> SmtpResult<Reply> {
        let reply = self.send_command(&SmtpCommand::Data)?;
        if reply.code != START_MAIL_INPUT {
            return Err(self.unexpected("DATA", reply));
        }
        Ok(reply)
    }

    /// Send the message body. Lines starting with a dot get it doubled so that none of them
    /// can end the message early.
    pub fn send_data<S: AsRef<str>>(&mut self, body: S) -> SmtpResult<()> {
        debug!("Sending {} bytes of mail data", body.as_ref().len());
        self.operation = String::from("mail data");
        for line in body.as_ref().lines() {
            let sent = if line.starts_with('.') {
                self.conn.send_line(&format!(".{line}"))
            } else {
                self.conn.send_line(line)
            };
            sent.map_err(|err| SmtpError::from_stream(&self.operation, self.host(), err))?;
        }
        Ok(())
    }

    /// Close the message with a lone dot and read the verdict
    pub fn end_data(&mut self) -> SmtpResult<Reply> {
        self.checked(SmtpCommand::Custom(".".to_string()))
    }

    pub fn rset(&mut self) -> SmtpResult<Reply> {
        self.checked(SmtpCommand::Rset)
    }

    pub fn noop(&mut self) -> SmtpResult<Reply> {
        self.checked(SmtpCommand::Noop)
    }

    /// Say goodbye and close the connection
    pub fn quit(&mut self) -> SmtpResult<Reply> {
        debug!("Quitting stream");
        let result = self.checked(SmtpCommand::Quit);
        self.conn.disconnect();
        result
    }

    /// Run a whole transaction: sender, recipients, then the body
    pub fn send_mail<S: AsRef<str>>(
        &mut self,
        sender: S,
        recipients: &[S],
        body: S,
    ) -> SmtpResult<Reply> {
        self.mail_from(sender)?;
        for recipient in recipients {
            self.rcpt_to(recipient)?;
        }
        self.start_data()?;
        self.send_data(body)?;
        self.end_data()
    }

    fn checked(&mut self, command: SmtpCommand) -> SmtpResult<Reply> {
        let operation = command.to_string();
        let reply = self.send_command(&command)?;
        self.check(reply, &operation)
    }

    fn check(&self, reply: Reply, operation: &str) -> SmtpResult<Reply> {
        if reply.code > LAST_SUCCESS_CODE {
            Err(self.unexpected(operation, reply))
        } else {
            Ok(reply)
        }
    }

    fn unexpected(&self, operation: &str, reply: Reply) -> SmtpError {
        debug!("{operation} refused by {}: {reply}", self.host());
        SmtpError::UnexpectedResponse {
            operation: operation.to_string(),
            host: self.host().to_string(),
            reply,
        }
    }
}
