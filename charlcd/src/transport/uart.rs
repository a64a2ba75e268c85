use crate::transport::Transport;
use crate::{LcdError, LcdResult, TransportKind};
use embedded_io::{Error, Write};
use std::fmt::Debug;

/// Baud rate serial character displays ship with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Transport for displays on a serial line.
///
/// Commands are sent as `0xFE` followed by the instruction, data bytes are sent as they are.
/// Every call is flushed before returning, so the byte is on the wire when the call succeeds.
#[derive(Debug)]
pub struct UartTransport<W> {
    writer: W,
}

impl<W: Write> UartTransport<W> {
    pub fn new(writer: W) -> Self {
        UartTransport { writer }
    }

    pub fn release(self) -> W {
        self.writer
    }
}

fn bus_error(err: impl Error) -> LcdError {
    LcdError::Transport {
        bus: TransportKind::Uart,
        message: format!("{:?}", err.kind()),
    }
}

impl<W: Write + Debug> Transport for UartTransport<W> {
    fn kind(&self) -> TransportKind {
        TransportKind::Uart
    }

    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        self.writer.write_all(bytes).map_err(bus_error)?;
        self.writer.flush().map_err(bus_error)
    }

    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()> {
        self.writer.write_all(&[register]).map_err(bus_error)?;
        self.writer.write_all(bytes).map_err(bus_error)?;
        self.writer.flush().map_err(bus_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{ErrorKind, ErrorType};

    #[derive(Debug, Default)]
    struct MockSerial {
        wire: Vec<u8>,
        flushes: usize,
        broken: bool,
    }

    impl ErrorType for MockSerial {
        type Error = ErrorKind;
    }

    impl Write for MockSerial {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.broken {
                return Err(ErrorKind::BrokenPipe);
            }
            self.wire.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn commands_are_prefixed_and_data_is_raw() {
        let mut transport = UartTransport::new(MockSerial::default());
        transport.send_command(0x01).unwrap();
        transport.send_data(b'o').unwrap();
        transport.send_data(b'k').unwrap();

        let serial = transport.release();
        assert_eq!(serial.wire, [0xFE, 0x01, b'o', b'k']);
        assert_eq!(serial.flushes, 3);
    }

    #[test]
    fn bus_errors_are_reported() {
        let mut transport = UartTransport::new(MockSerial {
            broken: true,
            ..Default::default()
        });
        let err = transport.send_command(0x02).unwrap_err();
        assert_eq!(
            err,
            LcdError::Transport {
                bus: TransportKind::Uart,
                message: "BrokenPipe".into(),
            }
        );
    }
}
