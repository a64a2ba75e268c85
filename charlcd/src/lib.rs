//! Bus-agnostic driver for HD44780-family character LCDs.
//!
//! The [controller::LcdController] speaks the HD44780 instruction set and sends every byte through a
//! [transport::Transport], which knows how to frame commands and data for its bus (I²C, SPI or UART).
//! Display dimensions and custom characters are validated before any byte reaches the bus, see
//! [geometry] and [glyph]. The [config] module holds the serde schema these come from, and [buffer]
//! provides a frame buffer with a polling update cycle on top of the controller.

pub mod buffer;
pub mod command;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod glyph;
pub mod transport;

use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    /// Bad geometry, glyph data or configuration, detected before any I/O.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The custom character table is full.
    #[error("custom character table is full ({0} glyphs)")]
    Capacity(usize),
    /// A write was addressed outside of the display.
    #[error("position (row {row}, column {col}) is outside of a {columns}x{rows} display")]
    OutOfBounds {
        row: usize,
        col: usize,
        columns: u8,
        rows: u8,
    },
    /// The underlying bus reported an error.
    #[error("{bus} transport error: {message}")]
    Transport { bus: TransportKind, message: String },
    /// The controller failed earlier and has to be initialized again.
    #[error("controller is faulted, re-initialize it first")]
    Faulted,
    /// Formatting text for the frame buffer failed.
    #[error("formatting failed: {0}")]
    Format(String),
}

impl LcdError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LcdError::Validation(message.into())
    }

    /// Whether the error came from the bus rather than from the caller's input.
    pub fn is_transport(&self) -> bool {
        matches!(self, LcdError::Transport { .. })
    }
}

pub type LcdResult<T> = Result<T, LcdError>;

/// The bus family a [transport::Transport] talks over.
///
/// Only affects how the control byte in front of each command or data byte is encoded, see
/// [TransportKind::control_byte].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TransportKind {
    I2c,
    Spi,
    Uart,
}

/// Register select: whether a byte is an instruction or display data.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RegisterSelect {
    Command,
    Data,
}

impl TransportKind {
    /// Gets the control byte sent in front of a byte for the given register, if the bus needs one.
    ///
    /// - I²C: `Co` = 0 (last control byte), `RS` in bit 6. `0x00` for commands, `0x40` for data.
    /// - SPI: start byte `11111 RW RS 0` read right to left, i.e. `0x1F` for commands and `0x5F` for data.
    /// - UART: commands are prefixed with `0xFE`, data goes out raw.
    pub fn control_byte(&self, rs: RegisterSelect) -> Option<u8> {
        match (self, rs) {
            (TransportKind::I2c, RegisterSelect::Command) => Some(0b0000_0000),
            (TransportKind::I2c, RegisterSelect::Data) => Some(0b0100_0000),
            (TransportKind::Spi, RegisterSelect::Command) => Some(0b0001_1111),
            (TransportKind::Spi, RegisterSelect::Data) => Some(0b0101_1111),
            (TransportKind::Uart, RegisterSelect::Command) => Some(0xFE),
            (TransportKind::Uart, RegisterSelect::Data) => None,
        }
    }
}

impl Display for TransportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::I2c => write!(f, "I2C"),
            TransportKind::Spi => write!(f, "SPI"),
            TransportKind::Uart => write!(f, "UART"),
        }
    }
}
