use std::time::Duration;

use argh::FromArgs;

#[derive(FromArgs)]
#[argh(description = "Interactive FTP shell. Type HELP once started to list the commands")]
pub struct Args {
    #[argh(switch, short = 'D', description = "enable TRACE log level")]
    pub debug: bool,
    #[argh(switch, short = 'v', description = "verbose mode")]
    pub verbose: bool,
    #[argh(switch, short = 'V', description = "print version")]
    pub version: bool,
    #[argh(
        option,
        short = 't',
        default = "30",
        description = "seconds to wait for a reply from the server (default: 30)"
    )]
    pub read_timeout: u64,
    #[argh(
        option,
        short = 'i',
        default = "10",
        description = "seconds a transfer waits for more data (default: 10)"
    )]
    pub incoming_timeout: u64,
    #[argh(positional, description = "host to connect to")]
    pub host: Option<String>,
}

/// Timeouts applied to every new connection
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub read: Duration,
    pub incoming_data: Duration,
}

impl From<&Args> for Timeouts {
    fn from(args: &Args) -> Self {
        Self {
            read: Duration::from_secs(args.read_timeout),
            incoming_data: Duration::from_secs(args.incoming_timeout),
        }
    }
}
