//! # Command
//!
//! The set of SMTP commands

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
    /// Introduce the client with its domain
    Helo(String),
    /// Start a transaction for the given sender
    MailFrom(String),
    /// Add a recipient to the transaction
    RcptTo(String),
    /// Ask to start sending the message body
    Data,
    /// Abort the current transaction
    Rset,
    Noop,
    Quit,
    /// Any command line, sent verbatim
    Custom(String),
}

impl fmt::Display for SmtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Helo(domain) => write!(f, "HELO {domain}"),
            Self::MailFrom(sender) => write!(f, "MAIL FROM:<{sender}>"),
            Self::RcptTo(recipient) => write!(f, "RCPT TO:<{recipient}>"),
            Self::Data => write!(f, "DATA"),
            Self::Rset => write!(f, "RSET"),
            Self::Noop => write!(f, "NOOP"),
            Self::Quit => write!(f, "QUIT"),
            Self::Custom(line) => write!(f, "{line}"),
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
            SmtpCommand::Helo("client.example.com".to_string())
                .to_string()
                .as_str(),
            "HELO client.example.com"
        );
        assert_eq!(
            SmtpCommand::MailFrom("me@example.com".to_string())
                .to_string()
                .as_str(),
            "MAIL FROM:<me@example.com>"
        );
        assert_eq!(
            SmtpCommand::RcptTo("you@example.com".to_string())
                .to_string()
                .as_str(),
            "RCPT TO:<you@example.com>"
        );
        assert_eq!(SmtpCommand::Data.to_string().as_str(), "DATA");
        assert_eq!(SmtpCommand::Rset.to_string().as_str(), "RSET");
        assert_eq!(SmtpCommand::Noop.to_string().as_str(), "NOOP");
        assert_eq!(SmtpCommand::Quit.to_string().as_str(), "QUIT");
        assert_eq!(
            SmtpCommand::Custom("VRFY root".to_string())
                .to_string()
                .as_str(),
            "VRFY root"
        );
    }
}
