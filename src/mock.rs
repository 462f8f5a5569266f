// Scripted I²C bus for the driver tests.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{Receiver, Sender};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockError {
    Nack,
    Bus,
}
impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockError::Bus => ErrorKind::Bus,
        }
    }
}

/// What the next read returns
#[derive(Debug)]
pub(crate) enum Reply {
    Bytes(Vec<u8>),
    Fail(MockError),
    /// signal `entered`, wait for `release`, then return the bytes
    Gated(Vec<u8>),
}

#[derive(Debug, Default)]
pub(crate) struct MockI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub transactions: usize,
    replies: VecDeque<Reply>,
    failing_writes: HashMap<Vec<u8>, MockError>,
    gate: Option<(Sender<()>, Receiver<()>)>,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.replies.push_back(reply);
        self
    }

    pub fn fail_write(mut self, bytes: [u8; 2], err: MockError) -> Self {
        self.failing_writes.insert(bytes.to_vec(), err);
        self
    }

    pub fn gate(mut self, entered: Sender<()>, release: Receiver<()>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    /// Command opcodes written, in order
    pub fn opcodes(&self) -> Vec<u16> {
        self.writes
            .iter()
            .map(|(_, bytes)| u16::from_be_bytes([bytes[0], bytes[1]]))
            .collect()
    }
}

impl ErrorType for MockI2c {
    type Error = MockError;
}

impl I2c<SevenBitAddress> for MockI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        self.transactions += 1;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push((address, bytes.to_vec()));
                    if let Some(err) = self.failing_writes.get(&bytes[..]) {
                        return Err(*err);
                    }
                }
                Operation::Read(buf) => match self.replies.pop_front() {
                    Some(Reply::Bytes(bytes)) => buf.copy_from_slice(&bytes),
                    Some(Reply::Fail(err)) => return Err(err),
                    Some(Reply::Gated(bytes)) => {
                        if let Some((entered, release)) = &self.gate {
                            let _ = entered.send(());
                            let _ = release.recv();
                        }
                        buf.copy_from_slice(&bytes);
                    }
                    // script exhausted
                    None => return Err(MockError::Bus),
                },
            }
        }
        Ok(())
    }
}

/// Frame with correct checksums for both words
pub(crate) fn valid_frame(temp: u16, hum: u16) -> Vec<u8> {
    let [t0, t1] = temp.to_be_bytes();
    let [h0, h1] = hum.to_be_bytes();
    std::vec![t0, t1, crate::crc8(&[t0, t1]), h0, h1, crate::crc8(&[h0, h1])]
}
