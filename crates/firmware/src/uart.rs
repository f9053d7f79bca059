use crate::board::{Reg, USART1_BASE};
use secoc_core::ReportSink;

const SR: Reg = Reg::at(USART1_BASE, 0x00);
const DR: Reg = Reg::at(USART1_BASE, 0x04);
const BRR: Reg = Reg::at(USART1_BASE, 0x08);
const CR1: Reg = Reg::at(USART1_BASE, 0x0C);

const SR_PE: u32 = 1 << 0;
const SR_FE: u32 = 1 << 1;
const SR_NE: u32 = 1 << 2;
const SR_ORE: u32 = 1 << 3;
const SR_RXNE: u32 = 1 << 5;
const SR_TC: u32 = 1 << 6;
const SR_TXE: u32 = 1 << 7;
const SR_ERRORS: u32 = SR_PE | SR_FE | SR_NE | SR_ORE;

const CR1_RE: u32 = 1 << 2;
const CR1_TE: u32 = 1 << 3;
const CR1_UE: u32 = 1 << 13;

/// Status polls before a transmit is given up on.
const TX_TIMEOUT_SPINS: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxTimeout;

pub enum RxPoll {
    Byte(u8),
    Empty,
    /// Overrun, framing, noise or parity error; the byte is discarded.
    Error,
}

/// Polled USART1 driver.
pub struct Usart1 {
    _private: (),
}

impl Usart1 {
    pub fn init(brr: u32) -> Self {
        BRR.write(brr);
        CR1.write(CR1_UE | CR1_TE | CR1_RE);
        Self { _private: () }
    }

    fn wait_for(flag: u32) -> Result<(), TxTimeout> {
        for _ in 0..TX_TIMEOUT_SPINS {
            if SR.read() & flag != 0 {
                return Ok(());
            }
        }
        Err(TxTimeout)
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), TxTimeout> {
        for &byte in bytes {
            Self::wait_for(SR_TXE)?;
            DR.write(byte as u32);
        }
        Ok(())
    }

    /// Block until the last byte has left the shift register.
    pub fn flush(&mut self) -> Result<(), TxTimeout> {
        Self::wait_for(SR_TC)
    }

    pub fn poll_rx(&mut self) -> RxPoll {
        let sr = SR.read();
        if sr & SR_ERRORS != 0 {
            // SR then DR read clears the error flags.
            let _ = DR.read();
            return RxPoll::Error;
        }
        if sr & SR_RXNE != 0 {
            return RxPoll::Byte((DR.read() & 0xFF) as u8);
        }
        RxPoll::Empty
    }
}

/// Report lines over USART1, CRLF-terminated. A line that times out is
/// dropped; the self-test does not depend on delivery.
pub struct UartSink<'a> {
    uart: &'a mut Usart1,
}

impl<'a> UartSink<'a> {
    pub fn new(uart: &'a mut Usart1) -> Self {
        Self { uart }
    }
}

impl ReportSink for UartSink<'_> {
    fn log_line(&mut self, line: &str) {
        let _ = self
            .uart
            .write_all(line.as_bytes())
            .and_then(|_| self.uart.write_all(b"\r\n"))
            .and_then(|_| self.uart.flush());
    }
}
