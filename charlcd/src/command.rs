//! The HD44780 instruction set.
//!
//! Every instruction is a single byte sent with RS = 0. The highest set bit selects the instruction,
//! the bits below it are its parameters.

use std::time::Duration;

/// Direction of the cursor or display movement.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

/// A single HD44780 instruction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// Clears the display and sets the cursor to the home position.
    ///
    /// Command: `00000001`.
    ClearDisplay,
    /// Sets the cursor to the home position and undoes display shifts.
    ///
    /// Command: `0000001?`.
    ReturnHome,
    /// Sets how the cursor moves after writing, and whether the display shifts along.
    ///
    /// Command: `000001IS`.
    /// `I` is `1` for right cursor direction, `0` for left.
    /// `S` is `1` for display shift, `0` for no display shift.
    EntryMode {
        direction: CursorDirection,
        shift: bool,
    },
    /// Turns the display, cursor and blinking on or off.
    ///
    /// Command: `00001DCB`.
    DisplayControl {
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    },
    /// Moves the cursor or shifts the display without changing DDRAM.
    ///
    /// Command: `0001DR??`.
    /// `D` is `1` for display shift, `0` for cursor move.
    /// `R` is `1` for right, `0` for left.
    CursorShift {
        display_shift: bool,
        direction: CursorDirection,
    },
    /// Sets interface width, number of lines and font.
    ///
    /// Command: `001BLF??`.
    /// `B` is `1` for 8-bit data length, `L` is `1` for 2 lines, `F` is `1` for 5x10 font.
    FunctionSet {
        eight_bit: bool,
        two_lines: bool,
        tall_font: bool,
    },
    /// Sets the CGRAM address, used to upload custom characters.
    ///
    /// Command: `01AAAAAA`.
    SetCgramAddress(u8),
    /// Sets the DDRAM address, i.e. the cursor position.
    ///
    /// Command: `1AAAAAAA`.
    SetDdramAddress(u8),
}

impl Command {
    /// Encodes the instruction byte. Address bits past the field width are dropped.
    pub fn to_byte(&self) -> u8 {
        match *self {
            Command::ClearDisplay => 0b0000_0001,
            Command::ReturnHome => 0b0000_0010,
            Command::EntryMode { direction, shift } => {
                let mut command = 0b0000_0100;
                if direction == CursorDirection::Right {
                    command |= 0b0000_0010;
                }
                if shift {
                    command |= 0b0000_0001;
                }
                command
            }
            Command::DisplayControl {
                display_on,
                cursor_on,
                blink_on,
            } => {
                let mut command = 0b0000_1000;
                if display_on {
                    command |= 0b0000_0100;
                }
                if cursor_on {
                    command |= 0b0000_0010;
                }
                if blink_on {
                    command |= 0b0000_0001;
                }
                command
            }
            Command::CursorShift {
                display_shift,
                direction,
            } => {
                let mut command = 0b0001_0000;
                if display_shift {
                    command |= 0b0000_1000;
                }
                if direction == CursorDirection::Right {
                    command |= 0b0000_0100;
                }
                command
            }
            Command::FunctionSet {
                eight_bit,
                two_lines,
                tall_font,
            } => {
                let mut command = 0b0010_0000;
                if eight_bit {
                    command |= 0b0001_0000;
                }
                if two_lines {
                    command |= 0b0000_1000;
                }
                if tall_font {
                    command |= 0b0000_0100;
                }
                command
            }
            Command::SetCgramAddress(address) => 0b0100_0000 | (address & 0b0011_1111),
            Command::SetDdramAddress(address) => 0b1000_0000 | (address & 0b0111_1111),
        }
    }

    /// How long the controller is busy after receiving the instruction.
    ///
    /// Clearing and returning home walk the whole DDRAM, everything else finishes within 37 µs.
    pub fn execution_time(&self) -> Duration {
        match self {
            Command::ClearDisplay | Command::ReturnHome => Duration::from_micros(1520),
            _ => Duration::from_micros(37),
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.to_byte()
    }
}
