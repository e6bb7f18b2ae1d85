#![crate_name = "wireline"]
#![crate_type = "lib"]

//! # Wireline
//!
//! Wireline provides blocking clients for line oriented protocols, built on a buffered reader
//! which accumulates socket input until a terminator shows up, waiting at most a configurable
//! timeout for more bytes.
//!
//! On top of it sit:
//!
//! - an **FTP** client, handling multi-line replies, active (`PORT`) and passive (`PASV`) data
//!   channels, transfers bounded by the size the server announces, permission parsing of `LIST`
//!   lines and a recursive walk of remote directories
//! - a minimal **SMTP** client, to send mail through a relay
//!
//! ## Get started
//!
//! To get started, first add **wireline** to your dependencies:
//!
//! ```toml
//! wireline = "^0.1"
//! ```
//!
//! ## Usage
//!
//! Here is a basic usage example:
//!
//! ```rust,no_run
//! use wireline::FtpStream;
//! let mut ftp_stream = FtpStream::connect("127.0.0.1:21").unwrap_or_else(|err|
//!     panic!("{}", err)
//! );
//! assert!(ftp_stream.login("anonymous", "anonymous").is_ok());
//!
//! // Download a file
//! let data = ftp_stream.retrieve("README").unwrap();
//! println!("{}", String::from_utf8_lossy(&data));
//!
//! // Disconnect from server
//! assert!(ftp_stream.quit().is_ok());
//! ```
//!
//! Each connection belongs to one thread. Work on another connection can be pushed to the
//! background with a [`Task`]:
//!
//! ```rust,no_run
//! use wireline::ftp::fetch_in_background;
//!
//! let task = fetch_in_background("127.0.0.1:21", "anonymous", "anonymous", "README").unwrap();
//! // ... do something else
//! let data = task.join().unwrap().unwrap();
//! ```
//!
//! ## Logging
//!
//! Wireline logs through the [log](https://docs.rs/log) facade: high level operations at `debug`,
//! wire traffic at `trace`. Enable the `no-log` feature to compile logging out.

#![doc(html_playground_url = "https://play.rust-lang.org")]

// -- common deps
#[macro_use]
extern crate lazy_regex;
#[macro_use]
extern crate log;

// -- private
mod regex;
#[cfg(test)]
mod test_container;
#[cfg(test)]
mod test_server;
#[cfg(test)]
mod test_socket;

// -- public
pub mod command;
pub mod ftp;
pub mod line;
pub mod list;
pub mod reader;
pub mod reply;
pub mod smtp;
pub mod socket;
pub mod status;
pub mod task;
pub mod types;

// -- export
pub use ftp::FtpStream;
pub use line::LineConnection;
pub use reader::{BufferedReader, StreamError};
pub use reply::Reply;
pub use smtp::SmtpStream;
pub use socket::Socket;
pub use status::{ReplyGroup, ReplyTopic, Status};
pub use task::{Task, TaskError};
pub use types::{FileType, FtpError, FtpResult, Mode, SmtpError, SmtpResult};

// -- test logging
#[cfg(test)]
pub fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
