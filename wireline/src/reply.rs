//! # Reply
//!
//! Numeric reply parsing shared by the FTP and SMTP control channels.
//!
//! A reply line starts with a three digit code. Protocols differ in the range of codes they accept
//! and in whether a character after the code announces continuation lines; both are captured by
//! [`ReplyFormat`].

use std::fmt;

use thiserror::Error;

use crate::line::LineConnection;
use crate::reader::StreamError;
use crate::socket::Socket;
use crate::status::{ReplyGroup, ReplyTopic, Status};

/// Replies accepted on an FTP control channel: `100..=559`, continued with `-`
pub const FTP_REPLY: ReplyFormat = ReplyFormat::new(100, 559, Some(b'-'));

/// Replies accepted on an SMTP control channel: `211..=554`, single line
pub const SMTP_REPLY: ReplyFormat = ReplyFormat::new(211, 554, None);

/// Errors raised while reading a reply
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// The line does not start with a valid code
    #[error("Malformed reply: {0:?}")]
    Malformed(String),
}

/// Valid code range and continuation marker of a protocol's replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyFormat {
    min: u32,
    max: u32,
    continuation: Option<u8>,
}

/// The leading code of one reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyLine {
    pub code: u32,
    /// The code is followed by the continuation marker
    pub continues: bool,
}

impl ReplyFormat {
    pub const fn new(min: u32, max: u32, continuation: Option<u8>) -> Self {
        Self {
            min,
            max,
            continuation,
        }
    }

    /// Parse the leading code of `line`.
    /// Returns `None` if the line is shorter than three characters, does not start with three
    /// digits or carries a code out of range.
    pub fn parse(&self, line: &str) -> Option<ReplyLine> {
        let bytes = line.as_bytes();
        let digits = bytes.get(..3)?;
        if !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let code = digits
            .iter()
            .fold(0, |code, digit| code * 10 + u32::from(digit - b'0'));
        if !(self.min..=self.max).contains(&code) {
            return None;
        }
        let continues = self
            .continuation
            .is_some_and(|marker| bytes.get(3) == Some(&marker));
        Some(ReplyLine { code, continues })
    }

    /// Whether `line` closes a reply opened with `code`
    fn closes(&self, line: &str, code: u32) -> bool {
        self.parse(line)
            .is_some_and(|parsed| parsed.code == code && !parsed.continues)
    }
}

/// A reply read from a control channel: its code and every raw line it spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u32,
    pub lines: Vec<String>,
}

impl Reply {
    pub fn new(code: u32, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    pub fn group(&self) -> Option<ReplyGroup> {
        ReplyGroup::of(self.code)
    }

    pub fn topic(&self) -> Option<ReplyTopic> {
        ReplyTopic::of(self.code)
    }

    /// Returns whether this reply carries `status`
    pub fn is(&self, status: Status) -> bool {
        self.code == status.code()
    }

    pub fn is_positive(&self) -> bool {
        self.group().is_some_and(ReplyGroup::is_positive)
    }

    pub fn is_positive_preliminary(&self) -> bool {
        self.group() == Some(ReplyGroup::PositivePreliminary)
    }

    pub fn is_positive_completion(&self) -> bool {
        self.group() == Some(ReplyGroup::PositiveCompletion)
    }

    pub fn is_positive_intermediate(&self) -> bool {
        self.group() == Some(ReplyGroup::PositiveIntermediate)
    }

    /// Whether the reply spans more than one line
    pub fn is_multi_line(&self) -> bool {
        self.lines.len() > 1
    }

    /// Reply text without the leading codes, one line per reply line
    pub fn text(&self) -> String {
        let prefix = self.code.to_string();
        self.lines
            .iter()
            .map(|line| match line.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.get(1..).unwrap_or_default(),
                None => line.as_str(),
            })
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.text())
    }
}

/// Read one complete reply from `conn`.
///
/// When the first line opens a multi-line block, lines are accumulated until one starts with the
/// same code not followed by the continuation marker.
pub fn read_reply<S: Socket>(
    conn: &mut LineConnection<S>,
    format: &ReplyFormat,
) -> Result<Reply, ReplyError> {
    let first = conn.read_line()?;
    trace!("CC IN: {:?}", first);
    let head = match format.parse(&first) {
        Some(head) => head,
        None => {
            error!("invalid reply from {}: {:?}", conn.host(), first);
            return Err(ReplyError::Malformed(first));
        }
    };
    let mut lines = vec![first];
    if head.continues {
        loop {
            let line = conn.read_line()?;
            trace!("CC IN: {:?}", line);
            let last = format.closes(&line, head.code);
            lines.push(line);
            if last {
                break;
            }
        }
    }
    Ok(Reply::new(head.code, lines))
}
