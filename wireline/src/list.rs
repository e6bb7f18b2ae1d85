//! # List
//!
//! This module exposes the parser for the permission column of a `LIST` output line.
//!
//! LIST output has no standard format, so this only understands the
//! Unix `ls -l` layout, where each line starts with ten characters: the entry type followed by
//! read/write/execute flags for owner, group and others.
//!
//! ```rust
//! use std::str::FromStr;
//! use wireline::list::{EntryKind, FilePermissions, PosixPexQuery};
//!
//! let pex = FilePermissions::from_str("drwxr-x--- 2 0 0 4096 Nov 5 2018 docs").unwrap();
//! assert_eq!(pex.kind(), EntryKind::Directory);
//! assert!(pex.can_execute(PosixPexQuery::Group));
//! assert!(!pex.can_read(PosixPexQuery::Others));
//! ```

use std::str::FromStr;

use thiserror::Error;

/// Number of leading characters making up the descriptor
const DESCRIPTOR_LEN: usize = 10;

/// Describes the kind of entry
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// This enum is used to query about posix permissions on a file
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PosixPexQuery {
    Owner,
    Group,
    Others,
}

/// Read, write and execute flags for one class of users
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct PosixPex {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

/// Entry type and permissions of a remote path, as shown by `ls -l`
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FilePermissions {
    kind: EntryKind,
    owner: PosixPex,
    group: PosixPex,
    others: PosixPex,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("Line is shorter than a permission descriptor")]
    TooShort,
    #[error("Invalid entry type {0:?}")]
    BadEntryType(char),
    #[error("Invalid permission flag {flag:?} at position {position}")]
    BadPermission { position: usize, flag: char },
}

impl FilePermissions {
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Returns whether `who` can read file
    pub fn can_read(&self, who: PosixPexQuery) -> bool {
        self.query_pex(who).read
    }

    /// Returns whether `who` can write file
    pub fn can_write(&self, who: PosixPexQuery) -> bool {
        self.query_pex(who).write
    }

    /// Returns whether `who` can execute file
    pub fn can_execute(&self, who: PosixPexQuery) -> bool {
        self.query_pex(who).execute
    }

    /// Returns the pex structure for selected query
    pub fn query_pex(&self, who: PosixPexQuery) -> &PosixPex {
        match who {
            PosixPexQuery::Owner => &self.owner,
            PosixPexQuery::Group => &self.group,
            PosixPexQuery::Others => &self.others,
        }
    }
}

impl FromStr for FilePermissions {
    type Err = ParseError;

    /// Parse the first ten characters of a Unix `ls -l` line.
    /// Every character must be `-` or one of the flags allowed at its position.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = line.chars().take(DESCRIPTOR_LEN).collect();
        if chars.len() < DESCRIPTOR_LEN {
            return Err(ParseError::TooShort);
        }
        let kind = match chars[0] {
            '-' => EntryKind::File,
            'd' => EntryKind::Directory,
            'l' => EntryKind::Symlink,
            other => return Err(ParseError::BadEntryType(other)),
        };
        let mut flags = [false; DESCRIPTOR_LEN - 1];
        for (offset, flag) in chars[1..].iter().enumerate() {
            let allowed = match offset % 3 {
                0 => 'r',
                1 => 'w',
                _ => 'x',
            };
            flags[offset] = match *flag {
                '-' => false,
                c if c == allowed || c == 's' => true,
                c => {
                    return Err(ParseError::BadPermission {
                        position: offset + 1,
                        flag: c,
                    })
                }
            };
        }
        let pex = |at: usize| PosixPex {
            read: flags[at],
            write: flags[at + 1],
            execute: flags[at + 2],
        };
        trace!("Parsed permissions of {:?}", line);
        Ok(Self {
            kind,
            owner: pex(0),
            group: pex(3),
            others: pex(6),
        })
    }
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_parse_file_permissions() {
        let pex =
            FilePermissions::from_str("-rw-r--r-- 1 0 1 8192 Nov 5 2018 omar.txt").unwrap();
        assert_eq!(pex.kind(), EntryKind::File);
        assert!(pex.is_file());
        assert_eq!(
            *pex.query_pex(PosixPexQuery::Owner),
            PosixPex {
                read: true,
                write: true,
                execute: false
            }
        );
        assert!(pex.can_read(PosixPexQuery::Group));
        assert!(!pex.can_write(PosixPexQuery::Group));
        assert!(pex.can_read(PosixPexQuery::Others));
        assert!(!pex.can_execute(PosixPexQuery::Others));
    }

    #[test]
    fn should_parse_directory_and_symlink() {
        let pex = FilePermissions::from_str("drwxrwxrwx 2 0 0 4096 Nov 5 2018 pub").unwrap();
        assert!(pex.is_directory());
        assert!(pex.can_execute(PosixPexQuery::Others));
        let pex = FilePermissions::from_str("lrwxrwxrwx 1 0 0 4 Nov 5 2018 l -> pub").unwrap();
        assert!(pex.is_symlink());
    }

    #[test]
    fn should_treat_setuid_flags_as_set() {
        let pex = FilePermissions::from_str("-rwsr-s---").unwrap();
        assert!(pex.can_execute(PosixPexQuery::Owner));
        assert!(pex.can_execute(PosixPexQuery::Group));
        assert!(!pex.can_read(PosixPexQuery::Others));
    }

    #[test]
    fn should_reject_unknown_characters() {
        assert_eq!(
            FilePermissions::from_str("crw-r--r-- 1 0 0 0 Nov 5 2018 tty"),
            Err(ParseError::BadEntryType('c'))
        );
        assert_eq!(
            FilePermissions::from_str("-rwxr-xr-t 1 0 0 0 Nov 5 2018 tmp"),
            Err(ParseError::BadPermission {
                position: 9,
                flag: 't'
            })
        );
        assert_eq!(
            FilePermissions::from_str("-wr-------"),
            Err(ParseError::BadPermission {
                position: 1,
                flag: 'w'
            })
        );
        assert_eq!(
            FilePermissions::from_str("11-05-18  10:00AM <DIR> pub"),
            Err(ParseError::BadEntryType('1'))
        );
        assert_eq!(
            FilePermissions::from_str("-rw"),
            Err(ParseError::TooShort)
        );
    }
}
