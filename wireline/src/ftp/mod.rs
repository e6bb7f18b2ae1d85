//! # FTP
//!
//! This module contains the FTP control channel state machine.
//!
//! Every command goes out as one CRLF terminated line and is answered by exactly one reply,
//! possibly spanning several lines. The `do_*` helpers return whatever the server replied; the
//! higher level methods turn a negative reply into [`FtpError::UnexpectedResponse`].

mod transfer;
mod walk;

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

pub use transfer::{format_port_argument, Transfer};

use crate::command::Command;
use crate::line::{resolve, LineConnection};
use crate::list::FilePermissions;
use crate::reader::StreamError;
use crate::reply::{read_reply, Reply, FTP_REPLY};
use crate::status::Status;
use crate::task::{Task, TaskError};
use crate::types::{FileType, FormatControl, FtpError, FtpResult, Mode};

/// Default time to wait for incoming payload bytes on the data channel
pub const DEFAULT_INCOMING_DATA_TIMEOUT: Duration = Duration::from_secs(10);
/// Default time to wait for the server to connect to our data port
pub const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Stream to interface with the FTP server. This interface is only for the command stream;
/// data connections are opened per transfer.
#[derive(Debug)]
pub struct FtpStream {
    conn: LineConnection<TcpStream>,
    mode: Mode,
    welcome_msg: Option<String>,
    last_reply: Option<Reply>,
    logged_in: bool,
    incoming_data_timeout: Duration,
    accept_timeout: Duration,
    /// Command whose reply is awaited; named in errors
    operation: String,
}

impl FtpStream {
    /// Try to connect to the remote server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> FtpResult<Self> {
        let (host, addrs) = resolve(addr).map_err(|source| FtpError::ConnectionError {
            host: String::from("<unresolved>"),
            source,
        })?;
        debug!("Connecting to server {host}");
        TcpStream::connect(addrs.as_slice())
            .map_err(|source| FtpError::ConnectionError { host, source })
            .and_then(Self::connect_with_stream)
    }

    /// Try to connect to the remote server but with the specified timeout
    pub fn connect_timeout(addr: SocketAddr, timeout: Duration) -> FtpResult<Self> {
        debug!("Connecting to server {addr}");
        TcpStream::connect_timeout(&addr, timeout)
            .map_err(|source| FtpError::ConnectionError {
                host: addr.to_string(),
                source,
            })
            .and_then(Self::connect_with_stream)
    }

    /// Connect using provided configured tcp stream; reads the server greeting
    pub fn connect_with_stream(stream: TcpStream) -> FtpResult<Self> {
        let mut ftp_stream = Self {
            conn: LineConnection::from_stream(stream),
            mode: Mode::default(),
            welcome_msg: None,
            last_reply: None,
            logged_in: false,
            incoming_data_timeout: DEFAULT_INCOMING_DATA_TIMEOUT,
            accept_timeout: DEFAULT_ACCEPT_TIMEOUT,
            operation: String::from("connect"),
        };
        debug!("Reading server greeting...");
        let reply = ftp_stream.get_reply()?;
        ftp_stream.require(reply, Status::Ready, "connect")?;
        let welcome_msg = ftp_stream.last_reply.as_ref().map(Reply::text);
        debug!("Server READY; greeting: {:?}", welcome_msg);
        ftp_stream.welcome_msg = welcome_msg;
        Ok(ftp_stream)
    }

    // -- configuration

    /// Set the timeout for control channel replies
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.set_read_timeout(timeout);
        self
    }

    /// Set the timeout for control channel replies
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.conn.reader_mut().set_read_timeout(timeout);
    }

    /// Set how long a receiving transfer waits for more bytes
    pub fn with_incoming_data_timeout(mut self, timeout: Duration) -> Self {
        self.incoming_data_timeout = timeout;
        self
    }

    /// Set how long an active mode transfer waits for the server to connect
    pub fn with_accept_timeout(mut self, timeout: Duration) -> Self {
        self.accept_timeout = timeout;
        self
    }

    /// Select how the data channel is established
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the data channel transfer mode
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("Changed mode to {:?}", mode);
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    // -- state

    /// Returns welcome message retrieved from server (if available)
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

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Remote host as shown in error messages
    pub fn host(&self) -> &str {
        self.conn.host()
    }

    /// Returns a reference to the underlying [`TcpStream`], if still connected
    pub fn get_ref(&self) -> Option<&TcpStream> {
        self.conn.reader().get_ref()
    }

    // -- reply machine

    /// Read the next reply from the control channel, including all its continuation lines
    pub fn get_reply(&mut self) -> FtpResult<Reply> {
        if !self.conn.is_connected() {
            return Err(FtpError::NotConnected);
        }
        let reply = read_reply(&mut self.conn, &FTP_REPLY)
            .map_err(|err| FtpError::from_reply(&self.operation, self.host(), err))?;
        trace!("Reply code {} ({})", reply.code, Status::from(reply.code));
        self.last_reply = Some(reply.clone());
        Ok(reply)
    }

    /// Send a raw command line and read its reply
    pub fn execute_command(&mut self, command: impl ToString) -> FtpResult<Reply> {
        self.execute(Command::Custom(command.to_string()))
    }

    /// Send `command` and read its reply
    fn execute(&mut self, command: Command) -> FtpResult<Reply> {
        self.perform(&command)?;
        self.get_reply()
    }

    /// Write command to the control channel
    fn perform(&mut self, command: &Command) -> FtpResult<()> {
        if !self.conn.is_connected() {
            return Err(FtpError::NotConnected);
        }
        self.operation = command.redacted();
        trace!("CC OUT: {}", self.operation);
        self.conn
            .send_line(&command.to_string())
            .map_err(|err| self.stream_error(err))
    }

    /// Failure of the control or data channel while running the current command
    fn stream_error(&self, err: StreamError) -> FtpError {
        FtpError::from_stream(&self.operation, self.host(), err)
    }

    fn connection_error(&self, source: std::io::Error) -> FtpError {
        FtpError::ConnectionError {
            host: self.host().to_string(),
            source,
        }
    }

    /// Turn a reply into an error unless it carries `expected`
    fn require(&self, reply: Reply, expected: Status, operation: &str) -> FtpResult<Reply> {
        if reply.is(expected) {
            Ok(reply)
        } else {
            Err(self.unexpected(operation, reply))
        }
    }

    /// Turn a reply into an error unless it is a positive completion
    fn require_completion(&self, reply: Reply, operation: &str) -> FtpResult<Reply> {
        if reply.is_positive_completion() {
            Ok(reply)
        } else {
            Err(self.unexpected(operation, reply))
        }
    }

    fn unexpected(&self, operation: &str, reply: Reply) -> FtpError {
        debug!("{operation} refused by {}: {reply}", self.host());
        FtpError::UnexpectedResponse {
            operation: operation.to_string(),
            host: self.host().to_string(),
            reply,
        }
    }

    // -- command helpers

    pub fn do_user<S: AsRef<str>>(&mut self, user: S) -> FtpResult<Reply> {
        self.execute(Command::User(user.as_ref().to_string()))
    }

    pub fn do_pass<S: AsRef<str>>(&mut self, password: S) -> FtpResult<Reply> {
        self.execute(Command::Pass(password.as_ref().to_string()))
    }

    pub fn do_acct<S: AsRef<str>>(&mut self, account: S) -> FtpResult<Reply> {
        self.execute(Command::Acct(account.as_ref().to_string()))
    }

    pub fn do_cwd<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Cwd(path.as_ref().to_string()))
    }

    pub fn do_cdup(&mut self) -> FtpResult<Reply> {
        self.execute(Command::Cdup)
    }

    pub fn do_pwd(&mut self) -> FtpResult<Reply> {
        self.execute(Command::Pwd)
    }

    pub fn do_mkd<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Mkd(path.as_ref().to_string()))
    }

    pub fn do_rmd<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Rmd(path.as_ref().to_string()))
    }

    pub fn do_dele<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Dele(path.as_ref().to_string()))
    }

    pub fn do_list(&mut self, path: Option<&str>) -> FtpResult<Reply> {
        self.execute(Command::List(path.map(str::to_string)))
    }

    pub fn do_nlst(&mut self, path: Option<&str>) -> FtpResult<Reply> {
        self.execute(Command::Nlst(path.map(str::to_string)))
    }

    pub fn do_port<S: AsRef<str>>(&mut self, argument: S) -> FtpResult<Reply> {
        self.execute(Command::Port(argument.as_ref().to_string()))
    }

    pub fn do_pasv(&mut self) -> FtpResult<Reply> {
        self.execute(Command::Pasv)
    }

    pub fn do_retr<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Retr(path.as_ref().to_string()))
    }

    pub fn do_stor<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Store(path.as_ref().to_string()))
    }

    pub fn do_appe<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Appe(path.as_ref().to_string()))
    }

    pub fn do_rest(&mut self, offset: usize) -> FtpResult<Reply> {
        self.execute(Command::Rest(offset))
    }

    pub fn do_site<S: AsRef<str>>(&mut self, command: S) -> FtpResult<Reply> {
        self.execute(Command::Site(command.as_ref().to_string()))
    }

    pub fn do_size<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::Size(path.as_ref().to_string()))
    }

    pub fn do_syst(&mut self) -> FtpResult<Reply> {
        self.execute(Command::Syst)
    }

    pub fn do_type(&mut self, file_type: FileType) -> FtpResult<Reply> {
        self.execute(Command::Type(file_type))
    }

    pub fn do_rnfr<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::RenameFrom(path.as_ref().to_string()))
    }

    pub fn do_rnto<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Reply> {
        self.execute(Command::RenameTo(path.as_ref().to_string()))
    }

    pub fn do_noop(&mut self) -> FtpResult<Reply> {
        self.execute(Command::Noop)
    }

    pub fn do_quit(&mut self) -> FtpResult<Reply> {
        self.execute(Command::Quit)
    }

    // -- composed commands

    /// `USER` then `PASS`. The password is only sent when the server asks for it; otherwise the
    /// `USER` reply is returned as is.
    pub fn login_username<S: AsRef<str>>(&mut self, user: S, password: S) -> FtpResult<Reply> {
        let reply = self.do_user(user)?;
        if !reply.is(Status::NeedPassword) {
            return Ok(reply);
        }
        debug!("Password is required");
        self.do_pass(password)
    }

    /// `RNFR` then `RNTO`; stops at `RNFR` unless the server asks for the destination
    pub fn rename_path<S: AsRef<str>>(&mut self, from_name: S, to_name: S) -> FtpResult<Reply> {
        let reply = self.do_rnfr(from_name)?;
        if !reply.is(Status::RequestFilePending) {
            return Ok(reply);
        }
        self.do_rnto(to_name)
    }

    // -- operations

    /// Log in to the FTP server.
    pub fn login<S: AsRef<str>>(&mut self, user: S, password: S) -> FtpResult<()> {
        debug!("Signing in with user '{}'", user.as_ref());
        let reply = self.login_username(user, password)?;
        self.require_completion(reply, "login")?;
        debug!("Login OK");
        self.logged_in = true;
        Ok(())
    }

    /// Change the current directory to the path specified.
    pub fn cwd<S: AsRef<str>>(&mut self, path: S) -> FtpResult<()> {
        debug!("Changing working directory to {}", path.as_ref());
        let reply = self.do_cwd(path.as_ref())?;
        self.require_completion(reply, &format!("CWD {}", path.as_ref()))
            .map(|_| ())
    }

    /// Move the current directory to the parent directory.
    pub fn cdup(&mut self) -> FtpResult<()> {
        debug!("Going to parent directory");
        let reply = self.do_cdup()?;
        self.require_completion(reply, "CDUP").map(|_| ())
    }

    /// Gets the current directory
    pub fn pwd(&mut self) -> FtpResult<String> {
        debug!("Getting working directory");
        let reply = self.do_pwd()?;
        let reply = self.require(reply, Status::PathCreated, "PWD")?;
        let body = reply.text();
        match (body.find('"'), body.rfind('"')) {
            (Some(begin), Some(end)) if begin < end => Ok(body[begin + 1..end].to_string()),
            _ => Err(self.unexpected("PWD", reply)),
        }
    }

    /// This creates a new directory on the server.
    pub fn mkdir<S: AsRef<str>>(&mut self, pathname: S) -> FtpResult<()> {
        debug!("Creating directory at {}", pathname.as_ref());
        let reply = self.do_mkd(pathname.as_ref())?;
        self.require_completion(reply, &format!("MKD {}", pathname.as_ref()))
            .map(|_| ())
    }

    /// Removes the remote pathname from the server.
    pub fn rmdir<S: AsRef<str>>(&mut self, pathname: S) -> FtpResult<()> {
        debug!("Removing directory {}", pathname.as_ref());
        let reply = self.do_rmd(pathname.as_ref())?;
        self.require_completion(reply, &format!("RMD {}", pathname.as_ref()))
            .map(|_| ())
    }

    /// Remove the remote file from the server.
    pub fn rm<S: AsRef<str>>(&mut self, filename: S) -> FtpResult<()> {
        debug!("Removing file {}", filename.as_ref());
        let reply = self.do_dele(filename.as_ref())?;
        self.require_completion(reply, &format!("DELE {}", filename.as_ref()))
            .map(|_| ())
    }

    /// Renames the file from_name to to_name
    pub fn rename<S: AsRef<str>>(&mut self, from_name: S, to_name: S) -> FtpResult<()> {
        debug!(
            "Renaming '{}' to '{}'",
            from_name.as_ref(),
            to_name.as_ref()
        );
        let operation = format!("rename {}", from_name.as_ref());
        let reply = self.rename_path(from_name, to_name)?;
        self.require_completion(reply, &operation).map(|_| ())
    }

    /// Sets the type of file to be transferred. That is the implementation
    /// of `TYPE` command.
    pub fn transfer_type(&mut self, file_type: FileType) -> FtpResult<()> {
        debug!("Setting transfer type {}", file_type);
        let reply = self.do_type(file_type)?;
        self.require_completion(reply, "TYPE").map(|_| ())
    }

    /// This does nothing. This is usually just used to keep the connection open.
    pub fn noop(&mut self) -> FtpResult<()> {
        debug!("Pinging server");
        let reply = self.do_noop()?;
        self.require_completion(reply, "NOOP").map(|_| ())
    }

    /// Execute a `SITE` command on the server and return the response
    pub fn site<S: AsRef<str>>(&mut self, command: S) -> FtpResult<Reply> {
        debug!("Sending SITE command: {}", command.as_ref());
        let reply = self.do_site(command.as_ref())?;
        self.require_completion(reply, "SITE")
    }

    /// Download the file at `path`
    pub fn retrieve<S: AsRef<str>>(&mut self, path: S) -> FtpResult<Vec<u8>> {
        debug!("Retrieving '{}'", path.as_ref());
        let transfer =
            self.transfer_data(Command::Retr(path.as_ref().to_string()), FileType::Binary, None)?;
        self.require_completion(transfer.reply, &format!("RETR {}", path.as_ref()))?;
        Ok(transfer.data)
    }

    /// Upload `data` as the file at `path`
    pub fn store<S: AsRef<str>>(&mut self, path: S, data: &[u8]) -> FtpResult<()> {
        debug!("Storing {} bytes at '{}'", data.len(), path.as_ref());
        let transfer = self.transfer_data(
            Command::Store(path.as_ref().to_string()),
            FileType::Binary,
            Some(data),
        )?;
        self.require_completion(transfer.reply, &format!("STOR {}", path.as_ref()))
            .map(|_| ())
    }

    /// Append `data` to the file at `path`
    pub fn append<S: AsRef<str>>(&mut self, path: S, data: &[u8]) -> FtpResult<()> {
        debug!("Appending {} bytes to '{}'", data.len(), path.as_ref());
        let transfer = self.transfer_data(
            Command::Appe(path.as_ref().to_string()),
            FileType::Binary,
            Some(data),
        )?;
        self.require_completion(transfer.reply, &format!("APPE {}", path.as_ref()))
            .map(|_| ())
    }

    /// Execute `LIST` command which returns the detailed file listing in human readable format.
    /// If `pathname` is omited then the list of files in the current directory will be
    /// returned otherwise it will the list of files on `pathname`.
    pub fn list(&mut self, pathname: Option<&str>) -> FtpResult<Vec<String>> {
        debug!(
            "Reading {} directory content",
            pathname.unwrap_or("working")
        );
        self.stream_lines(Command::List(pathname.map(str::to_string)))
    }

    /// Execute `NLST` command which returns the list of file names only.
    pub fn nlst(&mut self, pathname: Option<&str>) -> FtpResult<Vec<String>> {
        debug!(
            "Getting file names for {} directory",
            pathname.unwrap_or("working")
        );
        self.stream_lines(Command::Nlst(pathname.map(str::to_string)))
    }

    /// Entry type and permissions of `path`, from its `LIST` line.
    /// Only Unix style listings are understood.
    pub fn file_attributes<S: AsRef<str>>(&mut self, path: S) -> FtpResult<FilePermissions> {
        debug!("Getting attributes of {}", path.as_ref());
        let lines = self.list(Some(path.as_ref()))?;
        let line = lines
            .into_iter()
            .find(|line| !line.starts_with("total "))
            .ok_or_else(|| FtpError::UnsupportedListing {
                host: self.host().to_string(),
                line: String::new(),
            })?;
        FilePermissions::from_str(&line).map_err(|err| {
            error!("cannot parse listing line {line:?}: {err}");
            FtpError::UnsupportedListing {
                host: self.host().to_string(),
                line,
            }
        })
    }

    /// Quits the current FTP session.
    pub fn quit(&mut self) -> FtpResult<()> {
        debug!("Quitting stream");
        let reply = self.do_quit()?;
        let result = self.require(reply, Status::Closing, "QUIT").map(|_| ());
        self.close();
        result
    }

    /// Send `QUIT` if the control channel is still open, then close it whatever the outcome.
    /// Further operations fail with [`FtpError::NotConnected`]
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Err(err) = self.do_quit() {
                debug!("QUIT before disconnecting failed: {err}");
            }
        }
        self.close();
    }

    fn close(&mut self) {
        self.conn.disconnect();
        self.logged_in = false;
    }

    /// Run a listing command and split its output into lines
    fn stream_lines(&mut self, command: Command) -> FtpResult<Vec<String>> {
        let operation = command.to_string();
        let transfer = self.transfer_data(command, FileType::Ascii(FormatControl::Default), None)?;
        self.require_completion(transfer.reply, &operation)?;
        let lines: Vec<String> = String::from_utf8_lossy(&transfer.data)
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        trace!("Lines from stream {:?}", lines);
        Ok(lines)
    }
}

/// Download `path` on a background thread with its own connection
pub fn fetch_in_background<A>(
    addr: A,
    user: &str,
    password: &str,
    path: &str,
) -> Result<Task<FtpResult<Vec<u8>>>, TaskError>
where
    A: ToSocketAddrs + Send + 'static,
{
    let (user, password, path) = (user.to_string(), password.to_string(), path.to_string());
    Task::spawn(format!("fetch {path}"), move || {
        let mut stream = FtpStream::connect(addr)?;
        stream.login(user.as_str(), password.as_str())?;
        let data = stream.retrieve(path.as_str())?;
        if let Err(err) = stream.quit() {
            debug!("QUIT after background fetch failed: {err}");
        }
        Ok(data)
    })
}
