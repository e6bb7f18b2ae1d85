//! # Status
//!
//! Reply code classification.
//!
//! The first digit of a reply code tells whether the request succeeded ([`ReplyGroup`]), the second
//! one which area it concerns ([`ReplyTopic`]). Both are derived arithmetically from the code.
//! [`Status`] names the well known FTP codes.

use thiserror::Error;

/// Outcome class of a reply, given by the first digit of the code
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum ReplyGroup {
    /// 1xx: the action is being started; expect another reply
    PositivePreliminary = 1,
    /// 2xx: the action completed
    PositiveCompletion = 2,
    /// 3xx: the command was accepted, more information is needed
    PositiveIntermediate = 3,
    /// 4xx: the action was not taken, retrying later may work
    TransientNegative = 4,
    /// 5xx: the action was not taken
    PermanentNegative = 5,
}

impl ReplyGroup {
    /// Group of `code`, or `None` if the first digit is outside `1..=5`
    pub fn of(code: u32) -> Option<Self> {
        match code / 100 {
            1 => Some(Self::PositivePreliminary),
            2 => Some(Self::PositiveCompletion),
            3 => Some(Self::PositiveIntermediate),
            4 => Some(Self::TransientNegative),
            5 => Some(Self::PermanentNegative),
            _ => None,
        }
    }

    /// The first digit this group stands for
    pub fn digit(self) -> u32 {
        self as u32
    }

    pub fn is_positive(self) -> bool {
        matches!(
            self,
            Self::PositivePreliminary | Self::PositiveCompletion | Self::PositiveIntermediate
        )
    }

    pub fn is_negative(self) -> bool {
        !self.is_positive()
    }
}

/// Functional area of a reply, given by the second digit of the code
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum ReplyTopic {
    Syntax = 0,
    Information = 1,
    Connections = 2,
    Authentication = 3,
    /// Reserved by RFC 959
    Unspecified = 4,
    FileSystem = 5,
}

impl ReplyTopic {
    /// Topic of `code`; `None` unless the code has a valid group and a second digit in `0..=5`
    pub fn of(code: u32) -> Option<Self> {
        ReplyGroup::of(code)?;
        match (code % 100) / 10 {
            0 => Some(Self::Syntax),
            1 => Some(Self::Information),
            2 => Some(Self::Connections),
            3 => Some(Self::Authentication),
            4 => Some(Self::Unspecified),
            5 => Some(Self::FileSystem),
            _ => None,
        }
    }

    pub fn digit(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Copy, Clone, Error, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
/// Well known FTP reply codes
pub enum Status {
    // 1xx: Positive Preliminary Reply
    #[error("restart marker reply")]
    RestartMarker = 110,
    #[error("service ready in (n) minutes")]
    ReadyMinute = 120,
    #[error("data connection already open, transfer starting")]
    AlreadyOpen = 125,
    #[error("file status okay, about to open data connection")]
    AboutToSend = 150,
    // 2xx: Positive Completion Reply
    #[error("command okay")]
    CommandOk = 200,
    #[error("command not implemented, superfluous at this site")]
    CommandNotImplemented = 202,
    #[error("system status, or system help reply")]
    System = 211,
    #[error("directory status")]
    Directory = 212,
    #[error("file status")]
    File = 213,
    #[error("help message")]
    Help = 214,
    #[error("NAME system type")]
    Name = 215,
    #[error("service ready for new user")]
    Ready = 220,
    #[error("service closing control connection")]
    Closing = 221,
    #[error("data connection open; no transfer in progress")]
    DataConnectionOpen = 225,
    #[error("closing data connection")]
    ClosingDataConnection = 226,
    #[error("entering passive mode")]
    PassiveMode = 227,
    #[error("user logged in, proceed")]
    LoggedIn = 230,
    #[error("requested file action okay")]
    RequestedFileActionOk = 250,
    #[error("pathname created")]
    PathCreated = 257,
    // 3xx: Positive intermediate Reply
    #[error("user name okay, need password")]
    NeedPassword = 331,
    #[error("need account for login")]
    LoginNeedAccount = 332,
    #[error("requested file action pending further information")]
    RequestFilePending = 350,
    // 4xx: Transient Negative Completion Reply
    #[error("service not available, closing control connection")]
    NotAvailable = 421,
    #[error("can't open data connection")]
    CannotOpenDataConnection = 425,
    #[error("connection closed; transfer aborted")]
    TransferAborted = 426,
    #[error("requested file action not taken")]
    RequestFileActionIgnored = 450,
    #[error("requested action aborted")]
    ActionAborted = 451,
    #[error("requested action not taken")]
    RequestedActionNotTaken = 452,
    // 5xx: Permanent Negative Completion Reply
    #[error("syntax error, command unrecognized")]
    BadCommand = 500,
    #[error("syntax error in parameters or arguments")]
    BadArguments = 501,
    #[error("command not implemented")]
    NotImplemented = 502,
    #[error("bad sequence of commands")]
    BadSequence = 503,
    #[error("command not implemented for that parameter")]
    NotImplementedParameter = 504,
    #[error("user not logged in")]
    NotLoggedIn = 530,
    #[error("need account for storing files")]
    StoringNeedAccount = 532,
    #[error("requested action not taken; file unavailable")]
    FileUnavailable = 550,
    #[error("requested action aborted; page type unknown")]
    PageTypeUnknown = 551,
    #[error("requested file action aborted; exceeded storage allocation")]
    ExceededStorage = 552,
    #[error("requested action not taken; file name not allowed")]
    BadFilename = 553,
    #[error("unknown reply code")]
    Unknown = 0,
}

impl Status {
    /// Get status code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get status description
    pub fn desc(&self) -> String {
        self.to_string()
    }

    pub fn group(&self) -> Option<ReplyGroup> {
        ReplyGroup::of(self.code())
    }

    pub fn topic(&self) -> Option<ReplyTopic> {
        ReplyTopic::of(self.code())
    }
}

impl From<u32> for Status {
    fn from(code: u32) -> Self {
        match code {
            110 => Self::RestartMarker,
            120 => Self::ReadyMinute,
            125 => Self::AlreadyOpen,
            150 => Self::AboutToSend,
            200 => Self::CommandOk,
            202 => Self::CommandNotImplemented,
            211 => Self::System,
            212 => Self::Directory,
            213 => Self::File,
            214 => Self::Help,
            215 => Self::Name,
            220 => Self::Ready,
            221 => Self::Closing,
            225 => Self::DataConnectionOpen,
            226 => Self::ClosingDataConnection,
            227 => Self::PassiveMode,
            230 => Self::LoggedIn,
            250 => Self::RequestedFileActionOk,
            257 => Self::PathCreated,
            331 => Self::NeedPassword,
            332 => Self::LoginNeedAccount,
            350 => Self::RequestFilePending,
            421 => Self::NotAvailable,
            425 => Self::CannotOpenDataConnection,
            426 => Self::TransferAborted,
            450 => Self::RequestFileActionIgnored,
            451 => Self::ActionAborted,
            452 => Self::RequestedActionNotTaken,
            500 => Self::BadCommand,
            501 => Self::BadArguments,
            502 => Self::NotImplemented,
            503 => Self::BadSequence,
            504 => Self::NotImplementedParameter,
            530 => Self::NotLoggedIn,
            532 => Self::StoringNeedAccount,
            550 => Self::FileUnavailable,
            551 => Self::PageTypeUnknown,
            552 => Self::ExceededStorage,
            553 => Self::BadFilename,
            _ => Self::Unknown,
        }
    }
}
