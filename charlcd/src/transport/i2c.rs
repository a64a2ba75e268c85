use crate::transport::Transport;
use crate::{LcdError, LcdResult, TransportKind};
use embedded_hal::i2c::{Error, I2c, Operation};
use std::fmt::Debug;

/// The 7-bit address Newhaven serial displays answer to by default.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x28;

/// Transport for displays on an I²C bus.
///
/// Every command and data byte is one I²C write of `[control, byte]`, with the control byte
/// selecting the register.
#[derive(Debug)]
pub struct I2cTransport<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cTransport<I> {
    /// Creates the transport using [DEFAULT_I2C_ADDRESS].
    pub fn new(i2c: I) -> Self {
        I2cTransport {
            i2c,
            address: DEFAULT_I2C_ADDRESS,
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives back the underlying bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

fn bus_error(err: impl Error) -> LcdError {
    LcdError::Transport {
        bus: TransportKind::I2c,
        message: format!("{:?}", err.kind()),
    }
}

impl<I: I2c + Debug> Transport for I2cTransport<I> {
    fn kind(&self) -> TransportKind {
        TransportKind::I2c
    }

    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        self.i2c.write(self.address, bytes).map_err(bus_error)
    }

    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()> {
        // Adjacent writes go out without a repeated start.
        self.i2c
            .transaction(
                self.address,
                &mut [Operation::Write(&[register]), Operation::Write(bytes)],
            )
            .map_err(bus_error)
    }
}
