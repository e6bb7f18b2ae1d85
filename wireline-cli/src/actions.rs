use std::fs;
use std::io::{self, Write};
use std::path::Path;

use wireline::list::PosixPexQuery;
use wireline::{FtpStream, Mode};

use crate::args::Timeouts;

pub fn quit(mut ftp: Option<FtpStream>) {
    if let Some(mut ftp) = ftp.take() {
        match ftp.quit() {
            Ok(_) => println!("OK"),
            Err(err) => eprintln!("Failed to disconnect from remote: {}", err),
        }
    }
}

pub fn appe(ftp: &mut FtpStream, local: &Path, dest: &str) {
    let data = match fs::read(local) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read local file: {}", err);
            return;
        }
    };
    match ftp.append(dest, &data) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("APPE error: {}", err),
    }
}

pub fn attr(ftp: &mut FtpStream, path: &str) {
    match ftp.file_attributes(path) {
        Ok(pex) => {
            println!("OK: {:?}", pex.kind());
            for (who, label) in [
                (PosixPexQuery::Owner, "owner"),
                (PosixPexQuery::Group, "group"),
                (PosixPexQuery::Others, "others"),
            ] {
                let flags = pex.query_pex(who);
                println!(
                    "{:<6} {}{}{}",
                    label,
                    if flags.read { 'r' } else { '-' },
                    if flags.write { 'w' } else { '-' },
                    if flags.execute { 'x' } else { '-' },
                );
            }
        }
        Err(err) => eprintln!("ATTR error: {}", err),
    }
}

pub fn cdup(ftp: &mut FtpStream) {
    match ftp.cdup() {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("CDUP error: {}", err),
    }
}

pub fn connect(remote: &str, timeouts: Timeouts) -> Option<FtpStream> {
    match FtpStream::connect(remote) {
        Ok(stream) => {
            if let Some(welcome) = stream.get_welcome_msg() {
                println!("{}", welcome);
            }
            println!("OK");
            Some(
                stream
                    .with_read_timeout(timeouts.read)
                    .with_incoming_data_timeout(timeouts.incoming_data),
            )
        }
        Err(err) => {
            eprintln!("Failed to connect to remote: {}", err);
            None
        }
    }
}

pub fn cwd(ftp: &mut FtpStream, dir: &str) {
    match ftp.cwd(dir) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("CWD error: {}", err),
    }
}

pub fn list(ftp: &mut FtpStream, p: Option<&str>) {
    match ftp.list(p) {
        Ok(files) => {
            files.iter().for_each(|f| println!("{}", f));
        }
        Err(err) => eprintln!("LIST error: {}", err),
    }
}

pub fn nlst(ftp: &mut FtpStream, p: Option<&str>) {
    match ftp.nlst(p) {
        Ok(files) => {
            files.iter().for_each(|f| println!("{}", f));
        }
        Err(err) => eprintln!("NLST error: {}", err),
    }
}

pub fn login(ftp: &mut FtpStream) {
    // Read username
    print!("Username: ");
    let _ = io::stdout().flush();
    let mut username = String::new();
    if let Err(err) = io::stdin().read_line(&mut username) {
        eprintln!("Could not read username: {}", err);
        return;
    }
    // Read password
    let password: String = match rpassword::prompt_password("Password: ") {
        Ok(p) => p,
        Err(err) => {
            eprintln!("Could not read password: {}", err);
            return;
        }
    };
    // Login
    match ftp.login(username.trim(), password.as_str()) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("LOGIN error: {}", err),
    }
}

pub fn mkdir(ftp: &mut FtpStream, dir: &str) {
    match ftp.mkdir(dir) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("MKDIR error: {}", err),
    }
}

pub fn set_mode(ftp: &mut FtpStream, mode: Mode) {
    ftp.set_mode(mode);
    println!("OK");
}

pub fn noop(ftp: &mut FtpStream) {
    match ftp.noop() {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("NOOP error: {}", err),
    }
}

pub fn put(ftp: &mut FtpStream, local: &Path, dest: &str) {
    let data = match fs::read(local) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read local file: {}", err);
            return;
        }
    };
    match ftp.store(dest, &data) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("PUT error: {}", err),
    }
}

pub fn pwd(ftp: &mut FtpStream) {
    match ftp.pwd() {
        Ok(p) => println!("OK: {}", p),
        Err(err) => eprintln!("PWD error: {}", err),
    }
}

pub fn quote(ftp: &mut FtpStream, line: &str) {
    match ftp.execute_command(line) {
        Ok(reply) => println!("{}", reply),
        Err(err) => eprintln!("QUOTE error: {}", err),
    }
}

pub fn rename(ftp: &mut FtpStream, src: &str, dest: &str) {
    match ftp.rename(src, dest) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("RENAME error: {}", err),
    }
}

pub fn retr(ftp: &mut FtpStream, file: &str, dest: &Path) {
    let data = match ftp.retrieve(file) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("RETR error: {}", err);
            return;
        }
    };
    match fs::write(dest, data) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("Failed to write destination file: {}", err),
    }
}

pub fn rm(ftp: &mut FtpStream, file: &str) {
    match ftp.rm(file) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("RM error: {}", err),
    }
}

pub fn rmdir(ftp: &mut FtpStream, dir: &str) {
    match ftp.rmdir(dir) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("RMDIR error: {}", err),
    }
}

pub fn site(ftp: &mut FtpStream, command: &str) {
    match ftp.site(command) {
        Ok(reply) => println!("OK: {}", reply.text()),
        Err(err) => eprintln!("SITE error: {}", err),
    }
}

pub fn tree(ftp: &mut FtpStream, dir: &str) {
    match ftp.subpaths_at_path(dir) {
        Ok(files) => {
            files.iter().for_each(|f| println!("{}", f));
        }
        Err(err) => eprintln!("TREE error: {}", err),
    }
}
