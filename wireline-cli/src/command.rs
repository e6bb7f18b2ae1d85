use std::path::PathBuf;
use std::str::FromStr;

use wireline::Mode;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Appe(PathBuf, String),
    Attr(String),
    Cdup,
    Connect(String),
    Cwd(String),
    Help,
    List(Option<String>),
    Login,
    Mkdir(String),
    Mode(Mode),
    Nlst(Option<String>),
    Noop,
    Put(PathBuf, String),
    Pwd,
    Quit,
    Quote(String),
    Rename(String, String),
    Retr(String, PathBuf),
    Rm(String),
    Rmdir(String),
    Site(String),
    Tree(String),
}

impl FromStr for Command {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split string by space
        let mut args = s.split_ascii_whitespace();
        // Match args
        match args.next() {
            Some(cmd) => match cmd.to_ascii_uppercase().as_str() {
                "APPE" => {
                    let local: PathBuf = match args.next() {
                        Some(l) => PathBuf::from(l),
                        None => return Err("Missing `source` field"),
                    };
                    match args.next() {
                        Some(d) => Ok(Self::Appe(local, d.to_string())),
                        None => Err("Missing `dest` field"),
                    }
                }
                "ATTR" => match args.next() {
                    Some(p) => Ok(Self::Attr(p.to_string())),
                    None => Err("Missing `path` field"),
                },
                "CDUP" => Ok(Self::Cdup),
                "CONNECT" => match args.next() {
                    Some(addr) => Ok(Self::Connect(addr.to_string())),
                    None => Err("Missing `addr` field"),
                },
                "CWD" => match args.next() {
                    Some(p) => Ok(Self::Cwd(p.to_string())),
                    None => Err("Missing `dir` field"),
                },
                "HELP" => Ok(Self::Help),
                "LIST" => Ok(Self::List(args.next().map(str::to_string))),
                "LOGIN" => Ok(Self::Login),
                "MKDIR" => match args.next() {
                    Some(dir) => Ok(Self::Mkdir(dir.to_string())),
                    None => Err("Missing `dir` field"),
                },
                "MODE" => match args.next().map(str::to_ascii_uppercase).as_deref() {
                    Some("ACTIVE") => Ok(Self::Mode(Mode::Active)),
                    Some("PASSIVE") => Ok(Self::Mode(Mode::Passive)),
                    Some(_) => Err("Invalid mode"),
                    None => Err("Missing `mode` field"),
                },
                "NLST" => Ok(Self::Nlst(args.next().map(str::to_string))),
                "NOOP" => Ok(Self::Noop),
                "PUT" => {
                    let local: PathBuf = match args.next() {
                        Some(l) => PathBuf::from(l),
                        None => return Err("Missing `source` field"),
                    };
                    match args.next() {
                        Some(d) => Ok(Self::Put(local, d.to_string())),
                        None => Err("Missing `dest` field"),
                    }
                }
                "PWD" => Ok(Self::Pwd),
                "QUIT" => Ok(Self::Quit),
                "QUOTE" => match args.collect::<Vec<&str>>().join(" ") {
                    line if line.is_empty() => Err("Missing `command` field"),
                    line => Ok(Self::Quote(line)),
                },
                "RENAME" => {
                    let src: String = match args.next() {
                        Some(s) => s.to_string(),
                        None => return Err("Missing `src` field"),
                    };
                    match args.next() {
                        Some(d) => Ok(Self::Rename(src, d.to_string())),
                        None => Err("Missing `dest` field"),
                    }
                }
                "RETR" => {
                    let file: String = match args.next() {
                        Some(f) => f.to_string(),
                        None => return Err("Missing `file` field"),
                    };
                    match args.next() {
                        Some(d) => Ok(Self::Retr(file, PathBuf::from(d))),
                        None => Err("Missing `dest` field"),
                    }
                }
                "RM" => match args.next() {
                    Some(file) => Ok(Self::Rm(file.to_string())),
                    None => Err("Missing `file` field"),
                },
                "RMDIR" => match args.next() {
                    Some(dir) => Ok(Self::Rmdir(dir.to_string())),
                    None => Err("Missing `dir` field"),
                },
                "SITE" => match args.collect::<Vec<&str>>().join(" ") {
                    line if line.is_empty() => Err("Missing `command` field"),
                    line => Ok(Self::Site(line)),
                },
                "TREE" => Ok(Self::Tree(args.next().unwrap_or(".").to_string())),
                _ => Err("Unknown command"),
            },
            None => Err("Unknown command"),
        }
    }
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_parse_commands() {
        assert_eq!(
            Command::from_str("connect ftp.example.com:21"),
            Ok(Command::Connect("ftp.example.com:21".to_string()))
        );
        assert_eq!(Command::from_str("LIST"), Ok(Command::List(None)));
        assert_eq!(
            Command::from_str("list /pub"),
            Ok(Command::List(Some("/pub".to_string())))
        );
        assert_eq!(
            Command::from_str("mode passive"),
            Ok(Command::Mode(Mode::Passive))
        );
        assert_eq!(
            Command::from_str("RETR a.bin /tmp/a.bin\n"),
            Ok(Command::Retr("a.bin".to_string(), PathBuf::from("/tmp/a.bin")))
        );
        assert_eq!(
            Command::from_str("SITE CHMOD 644 a.txt"),
            Ok(Command::Site("CHMOD 644 a.txt".to_string()))
        );
        assert_eq!(Command::from_str("tree"), Ok(Command::Tree(".".to_string())));
    }

    #[test]
    fn should_reject_bad_commands() {
        assert_eq!(Command::from_str(""), Err("Unknown command"));
        assert_eq!(Command::from_str("FEAT"), Err("Unknown command"));
        assert_eq!(Command::from_str("MODE EXTPASSIVE"), Err("Invalid mode"));
        assert_eq!(Command::from_str("RENAME a"), Err("Missing `dest` field"));
        assert_eq!(Command::from_str("QUOTE"), Err("Missing `command` field"));
    }
}
