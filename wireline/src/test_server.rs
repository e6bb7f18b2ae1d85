//! A TCP server on the loopback interface playing a fixed conversation with one client

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One move of the server
#[derive(Debug)]
pub enum Step {
    /// Write raw text on the control connection
    Send(&'static str),
    /// Read one line and compare it, without its terminator
    Expect(&'static str),
    ExpectOwned(String),
    /// Read one line and check how it starts
    ExpectPrefix(&'static str),
    /// Read a `PORT` command, remember the address and accept it
    ExpectPort,
    /// Read `PASV`, open a data listener and announce it
    ExpectPasv,
    /// Open the data connection, write `data`, wait `linger`, then close
    DataSend { data: Vec<u8>, linger: Duration },
    /// Open the data connection and read it until the client closes it
    DataReceive,
}

pub struct ScriptedServer {
    addr: SocketAddr,
    handle: JoinHandle<Vec<Vec<u8>>>,
}

impl ScriptedServer {
    pub fn start(steps: Vec<Step>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            play(stream, steps)
        });
        Self { addr, handle }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the script to complete; returns what every `DataReceive` step received
    pub fn finish(self) -> Vec<Vec<u8>> {
        self.handle.join().expect("scripted server failed")
    }
}

/// Where the next data connection comes from
enum DataEndpoint {
    None,
    Active(SocketAddr),
    Passive(TcpListener),
}

impl DataEndpoint {
    fn open(&self) -> TcpStream {
        match self {
            Self::Active(addr) => TcpStream::connect(addr).unwrap(),
            Self::Passive(listener) => listener.accept().unwrap().0,
            Self::None => panic!("no data connection negotiated"),
        }
    }
}

fn play(stream: TcpStream, steps: Vec<Step>) -> Vec<Vec<u8>> {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    let mut endpoint = DataEndpoint::None;
    let mut received = Vec::new();
    for step in steps {
        match step {
            Step::Send(text) => writer.write_all(text.as_bytes()).unwrap(),
            Step::Expect(expected) => assert_eq!(read_line(&mut reader), expected),
            Step::ExpectOwned(expected) => assert_eq!(read_line(&mut reader), expected),
            Step::ExpectPrefix(prefix) => {
                let line = read_line(&mut reader);
                assert!(line.starts_with(prefix), "{line:?} doesn't start with {prefix:?}");
            }
            Step::ExpectPort => {
                let line = read_line(&mut reader);
                endpoint = DataEndpoint::Active(parse_port(&line));
                writer
                    .write_all(b"200 PORT command successful\r\n")
                    .unwrap();
            }
            Step::ExpectPasv => {
                assert_eq!(read_line(&mut reader), "PASV");
                let listener = TcpListener::bind("127.0.0.1:0").unwrap();
                let port = listener.local_addr().unwrap().port();
                let reply = format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{})\r\n",
                    port >> 8,
                    port & 0xff
                );
                writer.write_all(reply.as_bytes()).unwrap();
                endpoint = DataEndpoint::Passive(listener);
            }
            Step::DataSend { data, linger } => {
                let mut data_stream = endpoint.open();
                data_stream.write_all(&data).unwrap();
                thread::sleep(linger);
            }
            Step::DataReceive => {
                let mut data_stream = endpoint.open();
                let mut buf = Vec::new();
                data_stream.read_to_end(&mut buf).unwrap();
                received.push(buf);
            }
        }
    }
    received
}

fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line.trim_end_matches(['\r', '\n']).to_string()
}

/// `PORT a,b,c,d,hi,lo`
fn parse_port(line: &str) -> SocketAddr {
    let numbers: Vec<u8> = line
        .strip_prefix("PORT ")
        .unwrap_or_else(|| panic!("expected PORT, got {line:?}"))
        .split(',')
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(numbers.len(), 6);
    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = (u16::from(numbers[4]) << 8) | u16::from(numbers[5]);
    SocketAddr::V4(SocketAddrV4::new(ip, port))
}
