/// Receive buffer size of the UART echo loop.
pub const ECHO_BUFFER_SIZE: usize = 50;

pub type EchoChunk = heapless::Vec<u8, ECHO_BUFFER_SIZE>;

/// Collects received bytes and hands them back for echoing once a line
/// ends or the buffer fills up.
#[derive(Debug, Default)]
pub struct LineEcho {
    pending: EchoChunk,
}

impl LineEcho {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one received byte. Returns the chunk to transmit when `byte`
    /// is a carriage return or fills the buffer.
    pub fn push(&mut self, byte: u8) -> Option<EchoChunk> {
        // Never fails: the buffer is flushed as soon as it is full.
        let _ = self.pending.push(byte);
        if byte == b'\r' || self.pending.len() == ECHO_BUFFER_SIZE {
            return Some(core::mem::take(&mut self.pending));
        }
        None
    }

    /// Drop partially received data, e.g. after a framing or overrun error.
    pub fn abort(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
