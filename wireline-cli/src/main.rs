//! # Wireline Client
//!
//! This is a client you can install via `cargo install wireline-cli` on your system to connect and work with FTP servers
//!

// -- mods
mod actions;
mod args;
mod command;

use std::io;
use std::io::Write;
use std::str::FromStr;

use actions::*;
use args::{Args, Timeouts};
use command::Command;
use env_logger::Builder as LogBuilder;
use log::LevelFilter;
use wireline::FtpStream;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn usage() {
    println!("Available commands:");
    println!("APPE <file> <dest>                  Append content of local file `file` to `dest`");
    println!("ATTR <path>                         Print entry type and permissions of `path`");
    println!("CDUP                                Go to parent directory");
    println!("CONNECT <addr:port>                 Connect to remote host");
    println!("CWD <dir>                           Change working directory");
    println!("HELP                                Print this help");
    println!("LIST [dir]                          List files. If directory is not provided, current directory is used");
    println!("LOGIN                               Login to remote");
    println!("MKDIR <dir>                         Create directory");
    println!("MODE <PASSIVE|ACTIVE>               Set mode");
    println!("NLST [dir]                          List file names");
    println!("NOOP                                Ping server");
    println!("PUT <file> <dest>                   Upload local file `file` to `dest`");
    println!("PWD                                 Print working directory");
    println!("QUIT                                Quit wireline");
    println!("QUOTE <command>                     Send a raw command and print the reply");
    println!("RENAME <source> <dest>              Rename file `source` to `dest`");
    println!("RETR <file> <dest>                  Download `file` to `dest`");
    println!("RM <file>                           Remove file");
    println!("RMDIR <dir>                         Remove directory");
    println!("SITE <command>                      Run a site specific command");
    println!("TREE [dir]                          Print every file below `dir`");
}

fn input() -> Option<Command> {
    loop {
        print!(">> ");
        let _ = io::stdout().flush();
        let mut input: String = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(err) => {
                eprintln!("Failed to read stdin: {}", err);
                return None;
            }
        }
        // Try to create command
        match Command::from_str(input.as_str()) {
            Ok(cmd) => return Some(cmd),
            Err(err) => println!("{}", err),
        }
    }
}

fn main() {
    let args: Args = argh::from_env();
    // print version
    if args.version {
        println!("wireline {APP_VERSION} - developed by {APP_AUTHORS}")
    }
    // init logger
    LogBuilder::new()
        .filter_level(if args.debug {
            LevelFilter::Trace
        } else if args.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Off
        })
        .init();
    let timeouts = Timeouts::from(&args);
    // Main loop
    let mut ftp: Option<FtpStream> = None;

    // connect if host is specified
    if let Some(host) = args.host {
        perform(&mut ftp, Command::Connect(host), timeouts);
    }

    loop {
        match input() {
            // Break if quit or end of input
            Some(Command::Quit) | None => {
                quit(ftp);
                break;
            }
            Some(Command::Help) => usage(),
            Some(cmd) => perform(&mut ftp, cmd, timeouts),
        }
    }
}

fn perform(ftp: &mut Option<FtpStream>, command: Command, timeouts: Timeouts) {
    match ftp {
        Some(ftp) => perform_connected(ftp, command, timeouts),
        None => {
            if let Some(stream) = perform_uninitialized(command, timeouts) {
                *ftp = Some(stream);
            }
        }
    }
}

fn perform_uninitialized(command: Command, timeouts: Timeouts) -> Option<FtpStream> {
    match command {
        Command::Connect(remote) => connect(remote.as_str(), timeouts),
        _ => {
            eprintln!("Can't perform command: you must connect to remote first");
            None
        }
    }
}

fn perform_connected(ftp: &mut FtpStream, command: Command, timeouts: Timeouts) {
    match command {
        Command::Appe(src, dest) => appe(ftp, src.as_path(), dest.as_str()),
        Command::Attr(p) => attr(ftp, p.as_str()),
        Command::Cdup => cdup(ftp),
        Command::Connect(remote) => {
            if let Some(stream) = connect(remote.as_str(), timeouts) {
                ftp.disconnect();
                *ftp = stream;
            }
        }
        Command::Cwd(dir) => cwd(ftp, dir.as_str()),
        Command::List(p) => list(ftp, p.as_deref()),
        Command::Login => login(ftp),
        Command::Mkdir(p) => mkdir(ftp, p.as_str()),
        Command::Mode(m) => set_mode(ftp, m),
        Command::Nlst(p) => nlst(ftp, p.as_deref()),
        Command::Noop => noop(ftp),
        Command::Put(src, dest) => put(ftp, src.as_path(), dest.as_str()),
        Command::Pwd => pwd(ftp),
        Command::Quote(line) => quote(ftp, line.as_str()),
        Command::Rename(src, dest) => rename(ftp, src.as_str(), dest.as_str()),
        Command::Retr(file, dest) => retr(ftp, file.as_str(), dest.as_path()),
        Command::Rm(file) => rm(ftp, file.as_str()),
        Command::Rmdir(dir) => rmdir(ftp, dir.as_str()),
        Command::Site(line) => site(ftp, line.as_str()),
        Command::Tree(dir) => tree(ftp, dir.as_str()),
        Command::Help | Command::Quit => {
            eprintln!("Something unexpected happened")
        }
    }
}
