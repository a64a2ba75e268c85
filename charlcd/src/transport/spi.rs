use crate::transport::Transport;
use crate::{LcdError, LcdResult, TransportKind};
use embedded_hal::spi::{Error, Operation, SpiDevice};
use std::fmt::Debug;

/// Transport for displays on an SPI bus.
///
/// Chip select is handled by the [SpiDevice], so each call is one framed transaction: the start byte
/// with the register select bits, then the payload.
#[derive(Debug)]
pub struct SpiTransport<S> {
    spi: S,
}

impl<S: SpiDevice> SpiTransport<S> {
    pub fn new(spi: S) -> Self {
        SpiTransport { spi }
    }

    pub fn release(self) -> S {
        self.spi
    }
}

fn bus_error(err: impl Error) -> LcdError {
    LcdError::Transport {
        bus: TransportKind::Spi,
        message: format!("{:?}", err.kind()),
    }
}

impl<S: SpiDevice + Debug> Transport for SpiTransport<S> {
    fn kind(&self) -> TransportKind {
        TransportKind::Spi
    }

    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        self.spi.write(bytes).map_err(bus_error)
    }

    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()> {
        self.spi
            .transaction(&mut [Operation::Write(&[register]), Operation::Write(bytes)])
            .map_err(bus_error)
    }
}
