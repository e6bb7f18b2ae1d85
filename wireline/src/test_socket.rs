//! A socket replaying a fixed list of deliveries, one per drain

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::socket::{PollStatus, Received, Socket};

#[derive(Debug, Default)]
pub struct ScriptedSocket {
    deliveries: VecDeque<Vec<u8>>,
    pub sent: Vec<u8>,
    pub drains: usize,
    pub closed: bool,
    pub shutdowns: usize,
}

impl ScriptedSocket {
    pub fn new<I, B>(deliveries: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            deliveries: deliveries
                .into_iter()
                .map(|chunk| chunk.as_ref().to_vec())
                .collect(),
            ..Self::default()
        }
    }

    /// Once the deliveries are exhausted, report the peer as gone instead of silent
    pub fn closing(mut self) -> Self {
        self.closed = true;
        self
    }
}

impl Socket for ScriptedSocket {
    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.sent.extend_from_slice(data);
        Ok(())
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<Received> {
        self.drains += 1;
        match self.deliveries.pop_front() {
            Some(chunk) if chunk.is_empty() => Ok(Received::Nothing),
            Some(chunk) => {
                buf.extend_from_slice(&chunk);
                Ok(Received::Bytes(chunk.len()))
            }
            None if self.closed => Ok(Received::Closed),
            None => Ok(Received::Nothing),
        }
    }

    fn poll_readable(&mut self, _timeout: Duration) -> PollStatus {
        if self.deliveries.is_empty() && !self.closed {
            PollStatus::Timeout
        } else {
            PollStatus::Ready
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.shutdowns += 1;
        Ok(())
    }
}
