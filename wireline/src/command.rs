//! # Command
//!
//! The set of FTP commands

use std::fmt;

use crate::types::FileType;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ftp commands with their arguments
pub enum Command {
    /// Provide account information
    Acct(String),
    /// Append to file
    Appe(String),
    /// Change directory to parent directory
    Cdup,
    /// Change working directory
    Cwd(String),
    /// Remove file at specified path
    Dele(String),
    /// List entries at specified path. If path is not provided list entries at current working directory
    List(Option<String>),
    /// Make directory
    Mkd(String),
    /// Get the list of file names at specified path. If path is not provided list entries at current working directory
    Nlst(Option<String>),
    /// Ping server
    Noop,
    /// Provide login password
    Pass(String),
    /// Passive mode
    Pasv,
    /// Specifies an address and port to which the server should connect (active mode)
    Port(String),
    /// Print working directory
    Pwd,
    /// Quit
    Quit,
    /// Select file to rename
    RenameFrom(String),
    /// Rename selected file to
    RenameTo(String),
    /// Resume transfer from offset
    Rest(usize),
    /// Retrieve file
    Retr(String),
    /// Remove directory
    Rmd(String),
    /// Site specific command
    Site(String),
    /// Get file size of specified path
    Size(String),
    /// Put file at specified path
    Store(String),
    /// Get the system type
    Syst,
    /// Set transfer type
    Type(FileType),
    /// Provide user to login as
    User(String),
    /// Any command line, sent verbatim
    Custom(String),
}

impl Command {
    /// Command line as it should appear in logs; hides the password
    pub fn redacted(&self) -> String {
        match self {
            Self::Pass(_) => "PASS ********".to_string(),
            command => command.to_string(),
        }
    }
}

// -- stringify

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acct(a) => write!(f, "ACCT {a}"),
            Self::Appe(p) => write!(f, "APPE {p}"),
            Self::Cdup => write!(f, "CDUP"),
            Self::Cwd(d) => write!(f, "CWD {d}"),
            Self::Dele(p) => write!(f, "DELE {p}"),
            Self::List(Some(p)) => write!(f, "LIST {p}"),
            Self::List(None) => write!(f, "LIST"),
            Self::Mkd(p) => write!(f, "MKD {p}"),
            Self::Nlst(Some(p)) => write!(f, "NLST {p}"),
            Self::Nlst(None) => write!(f, "NLST"),
            Self::Noop => write!(f, "NOOP"),
            Self::Pass(p) => write!(f, "PASS {p}"),
            Self::Pasv => write!(f, "PASV"),
            Self::Port(p) => write!(f, "PORT {p}"),
            Self::Pwd => write!(f, "PWD"),
            Self::Quit => write!(f, "QUIT"),
            Self::RenameFrom(p) => write!(f, "RNFR {p}"),
            Self::RenameTo(p) => write!(f, "RNTO {p}"),
            Self::Rest(offset) => write!(f, "REST {offset}"),
            Self::Retr(p) => write!(f, "RETR {p}"),
            Self::Rmd(p) => write!(f, "RMD {p}"),
            Self::Site(c) => write!(f, "SITE {c}"),
            Self::Size(p) => write!(f, "SIZE {p}"),
            Self::Store(p) => write!(f, "STOR {p}"),
            Self::Syst => write!(f, "SYST"),
            Self::Type(t) => write!(f, "TYPE {t}"),
            Self::User(u) => write!(f, "USER {u}"),
            Self::Custom(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_stringify_command() {
        assert_eq!(
            Command::Acct(String::from("billing")).to_string().as_str(),
            "ACCT billing"
        );
        assert_eq!(
            Command::Appe(String::from("foobar.txt")).to_string().as_str(),
            "APPE foobar.txt"
        );
        assert_eq!(Command::Cdup.to_string().as_str(), "CDUP");
        assert_eq!(
            Command::Cwd(String::from("/tmp")).to_string().as_str(),
            "CWD /tmp"
        );
        assert_eq!(
            Command::Dele(String::from("a.txt")).to_string().as_str(),
            "DELE a.txt"
        );
        assert_eq!(
            Command::List(Some(String::from("/tmp"))).to_string().as_str(),
            "LIST /tmp"
        );
        assert_eq!(Command::List(None).to_string().as_str(), "LIST");
        assert_eq!(
            Command::Mkd(String::from("/tmp")).to_string().as_str(),
            "MKD /tmp"
        );
        assert_eq!(
            Command::Nlst(Some(String::from("/tmp"))).to_string().as_str(),
            "NLST /tmp"
        );
        assert_eq!(Command::Nlst(None).to_string().as_str(), "NLST");
        assert_eq!(Command::Noop.to_string().as_str(), "NOOP");
        assert_eq!(
            Command::Pass(String::from("qwerty123")).to_string().as_str(),
            "PASS qwerty123"
        );
        assert_eq!(Command::Pasv.to_string().as_str(), "PASV");
        assert_eq!(
            Command::Port(String::from("10,0,0,5,15,185")).to_string().as_str(),
            "PORT 10,0,0,5,15,185"
        );
        assert_eq!(Command::Pwd.to_string().as_str(), "PWD");
        assert_eq!(Command::Quit.to_string().as_str(), "QUIT");
        assert_eq!(
            Command::RenameFrom(String::from("a.txt")).to_string().as_str(),
            "RNFR a.txt"
        );
        assert_eq!(
            Command::RenameTo(String::from("b.txt")).to_string().as_str(),
            "RNTO b.txt"
        );
        assert_eq!(Command::Rest(123).to_string().as_str(), "REST 123");
        assert_eq!(
            Command::Retr(String::from("a.txt")).to_string().as_str(),
            "RETR a.txt"
        );
        assert_eq!(
            Command::Rmd(String::from("/tmp")).to_string().as_str(),
            "RMD /tmp"
        );
        assert_eq!(
            Command::Site(String::from("CHMOD 644 a.txt")).to_string().as_str(),
            "SITE CHMOD 644 a.txt"
        );
        assert_eq!(
            Command::Size(String::from("a.txt")).to_string().as_str(),
            "SIZE a.txt"
        );
        assert_eq!(
            Command::Store(String::from("a.txt")).to_string().as_str(),
            "STOR a.txt"
        );
        assert_eq!(Command::Syst.to_string().as_str(), "SYST");
        assert_eq!(
            Command::Type(FileType::Binary).to_string().as_str(),
            "TYPE I"
        );
        assert_eq!(
            Command::User(String::from("omar")).to_string().as_str(),
            "USER omar"
        );
        assert_eq!(
            Command::Custom(String::from("FEAT")).to_string().as_str(),
            "FEAT"
        );
    }

    #[test]
    fn should_hide_password_in_logs() {
        assert_eq!(
            Command::Pass(String::from("secret")).redacted().as_str(),
            "PASS ********"
        );
        assert_eq!(Command::Pwd.redacted().as_str(), "PWD");
    }
}
