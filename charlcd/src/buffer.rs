//! A frame buffer in front of the controller, redrawn on every update.
//!
//! The writer closure of a [BufferedDisplay] draws into a blank [FrameBuffer] and the whole buffer is
//! then sent to the display row by row.

use crate::controller::LcdController;
use crate::geometry::DisplayGeometry;
use crate::transport::Transport;
use crate::{LcdError, LcdResult};
use log::warn;
use std::fmt::{Arguments, Debug, Formatter};
use std::time::Duration;
use time::OffsetDateTime;
use time::formatting::Formattable;

/// Characters of the whole display, row after row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameBuffer {
    geometry: DisplayGeometry,
    cells: Vec<char>,
}

impl FrameBuffer {
    pub fn new(geometry: DisplayGeometry) -> Self {
        FrameBuffer {
            geometry,
            cells: vec![' '; geometry.positions()],
        }
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    /// Fills the buffer with spaces.
    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Prints the text starting at the given position.
    ///
    /// Text wraps into the next row, and `\n` continues at the start of the next row. Whatever doesn't
    /// fit on the display anymore is dropped with a warning.
    ///
    /// # Errors
    /// - [LcdError::OutOfBounds] if the starting position is outside of the display.
    pub fn print(&mut self, row: usize, col: usize, text: &str) -> LcdResult<()> {
        self.geometry.check(row, col)?;
        let columns = self.geometry.columns() as usize;
        let mut pos = row * columns + col;
        for c in text.chars() {
            if c == '\n' {
                pos = (pos / columns + 1) * columns;
                continue;
            }
            if pos >= self.cells.len() {
                warn!("Writing out of range, dropping the rest of {:?}", text);
                break;
            }
            self.cells[pos] = c;
            pos += 1;
        }
        Ok(())
    }

    /// Prints formatted text, use with [format_args!].
    pub fn print_fmt(&mut self, row: usize, col: usize, args: Arguments<'_>) -> LcdResult<()> {
        self.print(row, col, &args.to_string())
    }

    /// Prints the time in the given format.
    pub fn strftime<F: Formattable + ?Sized>(
        &mut self,
        row: usize,
        col: usize,
        format: &F,
        time: OffsetDateTime,
    ) -> LcdResult<()> {
        let text = time
            .format(format)
            .map_err(|err| LcdError::Format(err.to_string()))?;
        self.print(row, col, &text)
    }

    /// Gets the contents of one row.
    pub fn row_text(&self, row: usize) -> String {
        let columns = self.geometry.columns() as usize;
        self.cells
            .iter()
            .skip(row * columns)
            .take(columns)
            .collect()
    }
}

/// A display that redraws itself from a writer closure.
pub struct BufferedDisplay<'a, T: Transport + ?Sized> {
    controller: LcdController<'a, T>,
    buffer: FrameBuffer,
    update_interval: Duration,
    writer: Option<Box<dyn FnMut(&mut FrameBuffer) + 'a>>,
}

impl<'a, T: Transport + ?Sized> BufferedDisplay<'a, T> {
    /// Wraps the controller, with an update interval of one second.
    pub fn new(controller: LcdController<'a, T>) -> Self {
        BufferedDisplay {
            buffer: FrameBuffer::new(controller.geometry()),
            controller,
            update_interval: Duration::from_secs(1),
            writer: None,
        }
    }

    pub fn with_update_interval(mut self, update_interval: Duration) -> Self {
        self.update_interval = update_interval;
        self
    }

    /// Sets the closure that draws the contents on every [Self::update].
    pub fn set_writer(&mut self, writer: impl FnMut(&mut FrameBuffer) + 'a) {
        self.writer = Some(Box::new(writer));
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn controller(&mut self) -> &mut LcdController<'a, T> {
        &mut self.controller
    }

    /// Clears the buffer, lets the writer draw, and sends the result to the display.
    pub fn update(&mut self) -> LcdResult<()> {
        self.buffer.clear();
        if let Some(writer) = self.writer.as_mut() {
            writer(&mut self.buffer);
        }
        self.flush()
    }

    /// Sends the buffer to the display as it is, one row at a time.
    pub fn flush(&mut self) -> LcdResult<()> {
        for row in 0..self.buffer.geometry().rows() as usize {
            let text = self.buffer.row_text(row);
            self.controller.write_text(row, 0, &text)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Debug for BufferedDisplay<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedDisplay")
            .field("controller", &self.controller)
            .field("update_interval", &self.update_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportKind;
    use crate::transport::mock::{Event, RecordingTransport};
    use time::format_description;

    fn buffer(columns: usize, rows: usize) -> FrameBuffer {
        FrameBuffer::new(DisplayGeometry::new(columns, rows).unwrap())
    }

    #[test]
    fn starts_blank() {
        let buffer = buffer(4, 2);
        assert_eq!(buffer.row_text(0), "    ");
        assert_eq!(buffer.row_text(1), "    ");
    }

    #[test]
    fn newline_moves_to_next_row() {
        let mut buffer = buffer(8, 2);
        buffer.print(0, 2, "ab\ncd").unwrap();
        assert_eq!(buffer.row_text(0), "  ab    ");
        assert_eq!(buffer.row_text(1), "cd      ");
    }

    #[test]
    fn long_text_wraps_and_is_clipped_at_the_end() {
        let mut buffer = buffer(4, 2);
        buffer.print(1, 2, "wxyz").unwrap();
        assert_eq!(buffer.row_text(0), "    ");
        assert_eq!(buffer.row_text(1), "  wx");

        buffer.clear();
        buffer.print(0, 3, "12345").unwrap();
        assert_eq!(buffer.row_text(0), "   1");
        assert_eq!(buffer.row_text(1), "2345");
    }

    #[test]
    fn rejects_start_outside_of_display() {
        let mut buffer = buffer(16, 2);
        assert!(matches!(buffer.print(2, 0, "x"), Err(LcdError::OutOfBounds { .. })));
        assert!(matches!(buffer.print(0, 16, "x"), Err(LcdError::OutOfBounds { .. })));
    }

    #[test]
    fn formats_text_and_time() {
        let mut buffer = buffer(16, 2);
        buffer.print_fmt(0, 0, format_args!("T={:>3}C", 21)).unwrap();
        let format = format_description::parse_borrowed::<2>("[hour]:[minute]:[second]").unwrap();
        buffer
            .strftime(1, 8, &format, OffsetDateTime::from_unix_timestamp(3723).unwrap())
            .unwrap();
        assert_eq!(buffer.row_text(0), "T= 21C          ");
        assert_eq!(buffer.row_text(1), "        01:02:03");
    }

    #[test]
    fn update_redraws_every_row() {
        let mut transport = RecordingTransport::new(TransportKind::I2c);
        {
            let controller =
                LcdController::new(&mut transport, DisplayGeometry::new(4, 2).unwrap());
            let mut ticks = 0;
            let mut display =
                BufferedDisplay::new(controller).with_update_interval(Duration::from_millis(250));
            display.set_writer(move |buffer| {
                ticks += 1;
                buffer.print_fmt(1, 0, format_args!("#{ticks}")).unwrap();
            });
            assert_eq!(display.update_interval(), Duration::from_millis(250));

            display.update().unwrap();
            display.update().unwrap();
            assert_eq!(display.buffer().row_text(1), "#2  ");
        }

        let events = transport.events();
        assert_eq!(events.len(), 2 * 2 * 5);
        assert_eq!(events[10], Event::Command(0x80));
        assert_eq!(
            events[15..],
            [
                Event::Command(0xC0),
                Event::Data(b'#'),
                Event::Data(b'2'),
                Event::Data(b' '),
                Event::Data(b' '),
            ]
        );
    }

    #[test]
    fn update_without_writer_blanks_the_display() {
        let mut transport = RecordingTransport::new(TransportKind::Uart);
        let controller = LcdController::new(&mut transport, DisplayGeometry::new(2, 1).unwrap());
        let mut display = BufferedDisplay::new(controller);
        display.update().unwrap();
        assert_eq!(display.controller().cursor(), (0, 2));
        drop(display);
        assert_eq!(
            transport.events(),
            [Event::Command(0x80), Event::Data(b' '), Event::Data(b' ')]
        );
    }
}
