//! # FTP Regex
//!
//! Regular expressions to parse FTP response

use lazy_regex::{Lazy, Regex};

/// This regex extracts the announced transfer size from a preliminary reply.
/// The regex looks for the first parenthesized number, e.g. `(1234 bytes)`.
/// Not part of RFC 959: only a hint some servers give.
pub static TRANSFER_SIZE_RE: Lazy<Regex> = lazy_regex!(r"\((\d+)[^)]*\)");

/// This regex extracts IP and Port details from PASV command response.
/// The regex looks for the pattern (h1,h2,h3,h4,p1,p2).
pub static PASV_PORT_RE: Lazy<Regex> = lazy_regex!(r"\((\d+),(\d+),(\d+),(\d+),(\d+),(\d+)\)");
