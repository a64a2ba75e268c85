//! Transports carry bytes from the controller to the display.
//!
//! A [Transport] only has to implement the two raw bus operations, [Transport::write] and
//! [Transport::write_register]. Sending an instruction or a data byte is built on top of those by
//! putting the bus-specific control byte in front, see [TransportKind::control_byte].
//!
//! Adapters for `embedded-hal` I²C and SPI devices and for `embedded-io` writers are provided.

mod i2c;
mod spi;
mod uart;

#[cfg(test)]
pub(crate) mod mock;

use crate::{LcdResult, RegisterSelect, TransportKind};
pub use i2c::*;
use log::trace;
pub use spi::*;
use std::fmt::Debug;
pub use uart::*;

pub trait Transport: Debug {
    /// Gets the bus family, which decides the control byte encoding.
    fn kind(&self) -> TransportKind;

    /// Writes the bytes to the display as a single bus transfer.
    fn write(&mut self, bytes: &[u8]) -> LcdResult<()>;

    /// Writes a register (or control) byte followed by the bytes, as a single bus transfer.
    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()>;

    /// Sends an instruction to the display (RS = 0).
    fn send_command(&mut self, command: u8) -> LcdResult<()> {
        trace!("Sending command: {:08b} over {}", command, self.kind());
        self.send(RegisterSelect::Command, command)
    }

    /// Sends a data byte to the display (RS = 1).
    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        trace!("Sending data: {:08b} over {}", data, self.kind());
        self.send(RegisterSelect::Data, data)
    }

    /// Sends a byte to the given register, prefixed with the control byte if the bus needs one.
    fn send(&mut self, rs: RegisterSelect, byte: u8) -> LcdResult<()> {
        match self.kind().control_byte(rs) {
            Some(control) => self.write_register(control, &[byte]),
            None => self.write(&[byte]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{Event, RecordingTransport};
    use super::*;

    #[test]
    fn frames_follow_the_bus_kind() {
        let mut i2c = RecordingTransport::new(TransportKind::I2c);
        i2c.send_command(0x01).unwrap();
        i2c.send_data(b'A').unwrap();
        assert_eq!(i2c.frames, [vec![0x00, 0x01], vec![0x40, b'A']]);

        let mut spi = RecordingTransport::new(TransportKind::Spi);
        spi.send_command(0x01).unwrap();
        spi.send_data(b'A').unwrap();
        assert_eq!(spi.frames, [vec![0x1F, 0x01], vec![0x5F, b'A']]);

        let mut uart = RecordingTransport::new(TransportKind::Uart);
        uart.send_command(0x01).unwrap();
        uart.send_data(b'A').unwrap();
        assert_eq!(uart.frames, [vec![0xFE, 0x01], vec![b'A']]);
        assert_eq!(uart.events(), [Event::Command(0x01), Event::Data(b'A')]);
    }
}
