//! The HD44780 controller logic, independent of the bus.
//!
//! [LcdController] borrows a [Transport] for its whole lifetime and sends every instruction and
//! data byte through it right away. Nothing is buffered or retried: a failed transfer is returned to
//! the caller, and the controller stays [ControllerState::Faulted] until [LcdController::init] is
//! called again.

use crate::command::{Command, CursorDirection};
use crate::config::ValidatedConfig;
use crate::geometry::DisplayGeometry;
use crate::glyph::GlyphTable;
use crate::transport::Transport;
use crate::{LcdError, LcdResult};
use log::{debug, error, info, warn};
use std::fmt::{Debug, Formatter};
use std::thread::sleep;

/// Lifecycle of a controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ControllerState {
    /// Constructed, the init sequence hasn't been sent yet.
    Uninitialized,
    /// Sending the init sequence.
    Initializing,
    /// Initialized and idle.
    Ready,
    /// In the middle of an operation.
    Busy,
    /// A transfer failed. Only [LcdController::init] is accepted.
    Faulted,
}

pub struct LcdController<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    geometry: DisplayGeometry,
    glyphs: GlyphTable,
    state: ControllerState,
    cursor: (usize, usize),
    display_on: bool,
    cursor_on: bool,
    blink_on: bool,
    /// Called once after the first successful initialization.
    post_init: Option<Box<dyn FnOnce(&mut LcdController<'a, T>) -> LcdResult<()> + 'a>>,
}

impl<'a, T: Transport + ?Sized> LcdController<'a, T> {
    /// Creates a controller without custom characters. Nothing is sent until [Self::init].
    ///
    /// Geometries that don't [fit](DisplayGeometry::fits_ddram) a single controller are accepted with a
    /// warning, as some of their rows share DDRAM.
    pub fn new(transport: &'a mut T, geometry: DisplayGeometry) -> Self {
        if !geometry.fits_ddram() {
            warn!(
                "A {}x{} display doesn't fit the DDRAM of one controller, rows will overlap",
                geometry.columns(),
                geometry.rows()
            );
        }
        LcdController {
            transport,
            geometry,
            glyphs: GlyphTable::new(),
            state: ControllerState::Uninitialized,
            cursor: (0, 0),
            display_on: true,
            cursor_on: false,
            blink_on: false,
            post_init: None,
        }
    }

    /// Creates a controller with the geometry and custom characters of a validated configuration.
    pub fn from_config(transport: &'a mut T, config: &ValidatedConfig) -> Self {
        LcdController {
            glyphs: config.glyphs.clone(),
            ..Self::new(transport, config.geometry)
        }
    }

    /// Registers a custom character. It's uploaded by [Self::init] or [Self::upload_glyphs].
    ///
    /// # Errors
    /// - [LcdError::Capacity] if all 8 slots are taken.
    /// - [LcdError::Validation] if the slot is out of range or taken, or `rows` is not 8 bytes.
    pub fn register_glyph(&mut self, index: u8, codepoint: u32, rows: &[u8]) -> LcdResult<()> {
        self.glyphs.register(index, codepoint, rows)
    }

    /// Sets the hook that runs once, right after the first successful [Self::init].
    pub fn configure(&mut self, hook: impl FnOnce(&mut Self) -> LcdResult<()> + 'a) {
        self.post_init = Some(Box::new(hook));
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    /// The tracked cursor position as (row, column).
    ///
    /// After text runs past the end of a row the column points past the last column, same as the
    /// controller's address counter.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Initializes the display: function set, display on, clear, entry mode, then uploads the custom
    /// characters. Accepted in every state, and the only way out of [ControllerState::Faulted].
    ///
    /// The display has to be powered for at least 40 ms before this is called.
    pub fn init(&mut self) -> LcdResult<()> {
        self.state = ControllerState::Initializing;
        debug!(
            "Initializing {}x{} display over {}",
            self.geometry.columns(),
            self.geometry.rows(),
            self.transport.kind()
        );

        if let Err(err) = self.send_init_sequence() {
            error!("Display initialization failed: {}", err);
            self.state = ControllerState::Faulted;
            return Err(err);
        }
        self.state = ControllerState::Ready;
        debug!("Display initialized");

        if let Some(hook) = self.post_init.take() {
            debug!("Running post-init hook");
            hook(self)?;
        }
        Ok(())
    }

    fn send_init_sequence(&mut self) -> LcdResult<()> {
        // The serial interfaces are always 8 bits wide
        self.command(Command::FunctionSet {
            eight_bit: true,
            two_lines: self.geometry.rows() > 1,
            tall_font: false,
        })?;
        self.display_on = true;
        self.cursor_on = false;
        self.blink_on = false;
        self.send_display_control()?;
        self.command(Command::ClearDisplay)?;
        self.command(Command::EntryMode {
            direction: CursorDirection::Right,
            shift: false,
        })?;
        self.cursor = (0, 0);
        self.send_glyphs()
    }

    /// Writes the text starting at the given position.
    ///
    /// Sends one DDRAM address command, then one data byte per character. Characters registered as
    /// custom glyphs are sent as their slot index, other non-ASCII characters as `?`. Text running
    /// past the end of the row is not clipped.
    ///
    /// # Errors
    /// - [LcdError::OutOfBounds] if `row` or `col` is outside of the display.
    /// - [LcdError::Faulted] if the controller faulted before.
    /// - [LcdError::Transport] if a transfer failed.
    pub fn write_text(&mut self, row: usize, col: usize, text: &str) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.move_to(row, col)?;
            let mut written = 0;
            for c in text.chars() {
                let byte = lcd.encode_char(c);
                lcd.transport.send_data(byte)?;
                written += 1;
            }
            if col + written > lcd.geometry.columns() as usize {
                debug!("Text {:?} runs past the end of row {}", text, row);
            }
            lcd.cursor = (row, col + written);
            Ok(())
        })
    }

    /// Uploads all registered custom characters, in ascending slot order.
    ///
    /// Each glyph is one CGRAM address command and its 8 rows. Afterwards the address counter points
    /// into CGRAM, so position the cursor with [Self::write_text], [Self::set_cursor], [Self::home] or
    /// [Self::clear] before writing more text.
    pub fn upload_glyphs(&mut self) -> LcdResult<()> {
        self.run(|lcd| lcd.send_glyphs())
    }

    fn send_glyphs(&mut self) -> LcdResult<()> {
        for slot in self.glyphs.iter() {
            debug!("Uploading glyph {} for U+{:04X}", slot.index(), slot.codepoint());
            let command = Command::SetCgramAddress(slot.cgram_address());
            self.transport.send_command(command.to_byte())?;
            sleep(command.execution_time());
            for &row in slot.rows() {
                self.transport.send_data(row)?;
            }
        }
        Ok(())
    }

    /// Clears the display and moves the cursor home.
    pub fn clear(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.command(Command::ClearDisplay)?;
            lcd.cursor = (0, 0);
            Ok(())
        })
    }

    /// Moves the cursor home and undoes any display shift.
    pub fn home(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.command(Command::ReturnHome)?;
            lcd.cursor = (0, 0);
            Ok(())
        })
    }

    /// Moves the cursor without writing anything.
    ///
    /// # Errors
    /// - [LcdError::OutOfBounds] if `row` or `col` is outside of the display.
    pub fn set_cursor(&mut self, row: usize, col: usize) -> LcdResult<()> {
        self.run(|lcd| lcd.move_to(row, col))
    }

    pub fn display_on(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.display_on = true;
            lcd.send_display_control()
        })
    }

    /// Blanks the display. DDRAM contents are kept.
    pub fn display_off(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.display_on = false;
            lcd.send_display_control()
        })
    }

    /// Shows or hides the underline cursor and the blinking block cursor.
    pub fn set_cursor_style(&mut self, underline: bool, blink: bool) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.cursor_on = underline;
            lcd.blink_on = blink;
            lcd.send_display_control()
        })
    }

    pub fn move_cursor_left(&mut self) -> LcdResult<()> {
        self.run(|lcd| lcd.shift_cursor(CursorDirection::Left))
    }

    pub fn move_cursor_right(&mut self) -> LcdResult<()> {
        self.run(|lcd| lcd.shift_cursor(CursorDirection::Right))
    }

    /// Shifts the whole display one column to the left. The cursor moves along with it.
    pub fn move_display_left(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.command(Command::CursorShift {
                display_shift: true,
                direction: CursorDirection::Left,
            })
        })
    }

    pub fn move_display_right(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            lcd.command(Command::CursorShift {
                display_shift: true,
                direction: CursorDirection::Right,
            })
        })
    }

    /// Erases the character left of the cursor and moves the cursor onto it. Does nothing in the first
    /// column.
    pub fn backspace(&mut self) -> LcdResult<()> {
        self.run(|lcd| {
            if lcd.cursor.1 == 0 {
                return Ok(());
            }
            lcd.shift_cursor(CursorDirection::Left)?;
            lcd.transport.send_data(b' ')?;
            lcd.cursor.1 += 1;
            lcd.shift_cursor(CursorDirection::Left)
        })
    }

    /// Logs the display configuration.
    pub fn log_config(&self) {
        info!("Character LCD:");
        info!(
            "  Columns: {}, Rows: {}",
            self.geometry.columns(),
            self.geometry.rows()
        );
        info!("  Transport: {}", self.transport.kind());
        info!("  Custom characters: {}", self.glyphs.len());
        if self.state == ControllerState::Faulted {
            error!("Communication with LCD failed!");
        }
    }

    /// Runs an operation, keeping track of the busy and faulted states.
    fn run<R>(&mut self, operation: impl FnOnce(&mut Self) -> LcdResult<R>) -> LcdResult<R> {
        let previous = match self.state {
            ControllerState::Faulted => return Err(LcdError::Faulted),
            ControllerState::Busy => ControllerState::Ready,
            state => state,
        };
        self.state = ControllerState::Busy;
        let result = operation(self);
        self.state = match &result {
            Err(err) if err.is_transport() => {
                error!("Display operation failed: {}", err);
                ControllerState::Faulted
            }
            _ => previous,
        };
        result
    }

    fn command(&mut self, command: Command) -> LcdResult<()> {
        self.transport.send_command(command.to_byte())?;
        sleep(command.execution_time());
        Ok(())
    }

    fn move_to(&mut self, row: usize, col: usize) -> LcdResult<()> {
        self.geometry.check(row, col)?;
        self.command(Command::SetDdramAddress(self.geometry.ddram_address(row, col)))?;
        self.cursor = (row, col);
        Ok(())
    }

    fn shift_cursor(&mut self, direction: CursorDirection) -> LcdResult<()> {
        self.command(Command::CursorShift {
            display_shift: false,
            direction,
        })?;
        self.cursor.1 = match direction {
            CursorDirection::Left => self.cursor.1.saturating_sub(1),
            CursorDirection::Right => self.cursor.1 + 1,
        };
        Ok(())
    }

    fn send_display_control(&mut self) -> LcdResult<()> {
        self.command(Command::DisplayControl {
            display_on: self.display_on,
            cursor_on: self.cursor_on,
            blink_on: self.blink_on,
        })
    }

    fn encode_char(&self, c: char) -> u8 {
        if let Some(index) = self.glyphs.lookup(c) {
            index
        } else if c.is_ascii() {
            c as u8
        } else {
            warn!("Non-ASCII character: {}", c);
            b'?'
        }
    }
}

impl<T: Transport + ?Sized> Debug for LcdController<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LcdController")
            .field("transport", &self.transport)
            .field("geometry", &self.geometry)
            .field("glyphs", &self.glyphs.len())
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
