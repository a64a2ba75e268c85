mod config;

use crate::config::Config;
use charlcd::buffer::{BufferedDisplay, FrameBuffer};
use charlcd::controller::LcdController;
use charlcd::transport::Transport;
use charlcd::{LcdError, LcdResult, TransportKind};
use dotenv::{dotenv, var};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::thread;
use time::OffsetDateTime;
use time::format_description;
use time::format_description::BorrowedFormatItem;

/// Writes frames to a serial device file, e.g. `/dev/ttyUSB0` set up beforehand with `stty`.
#[derive(Debug)]
struct DeviceTransport {
    path: String,
    file: File,
}

impl DeviceTransport {
    fn open(path: String) -> std::io::Result<Self> {
        let file = OpenOptions::new().write(true).open(&path)?;
        Ok(DeviceTransport { path, file })
    }

    fn device_error(&self, err: std::io::Error) -> LcdError {
        LcdError::Transport {
            bus: TransportKind::Uart,
            message: format!("{}: {}", self.path, err.kind()),
        }
    }
}

impl Transport for DeviceTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Uart
    }

    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        let result = self.file.write_all(bytes).and_then(|_| self.file.flush());
        result.map_err(|err| self.device_error(err))
    }

    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()> {
        let mut frame = Vec::with_capacity(bytes.len() + 1);
        frame.push(register);
        frame.extend_from_slice(bytes);
        self.write(&frame)
    }
}

/// Logs every frame instead of sending it anywhere.
#[derive(Debug)]
struct DryRunTransport {
    kind: TransportKind,
    frames: usize,
}

impl Transport for DryRunTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        self.frames += 1;
        debug!("[{}] frame {}: {:02X?}", self.kind, self.frames, bytes);
        Ok(())
    }

    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()> {
        self.frames += 1;
        debug!(
            "[{}] frame {}: {:02X} {:02X?}",
            self.kind, self.frames, register, bytes
        );
        Ok(())
    }
}

/// Greets on the first row, and shows the version on the second one if there is one.
fn greet<T: Transport + ?Sized>(lcd: &mut LcdController<'_, T>) -> LcdResult<()> {
    lcd.write_text(0, 0, "Hello!")?;
    if lcd.geometry().rows() > 1 {
        let version = concat!("v.", env!("CARGO_PKG_VERSION"));
        let columns = lcd.geometry().columns() as usize;
        lcd.write_text(1, columns.saturating_sub(version.len()), version)?;
    }
    Ok(())
}

fn draw_clock(
    buffer: &mut FrameBuffer,
    format: &[BorrowedFormatItem<'_>],
    now: OffsetDateTime,
    tick: usize,
) {
    if let Err(err) = buffer.strftime(0, 0, format, now) {
        warn!("Can't print the time: {}", err);
    }
    if buffer.geometry().rows() > 1 {
        if let Err(err) = buffer.print_fmt(1, 0, format_args!("Update #{tick}, 21°C")) {
            warn!("Can't print the update counter: {}", err);
        }
    }
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("Character LCD demo starting...");

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    let validated = config.display.validate()?;
    let clock_format = format_description::parse_borrowed::<2>(&config.clock_format)?;
    let updates = var("DEMO_UPDATES")
        .ok()
        .map(|updates| updates.parse::<usize>())
        .transpose()?
        .unwrap_or(5);

    let mut transport: Box<dyn Transport> = match var("LCD_DEVICE") {
        Ok(path) => {
            if validated.bus.kind() != TransportKind::Uart {
                warn!(
                    "{} is written as a serial device, ignoring the configured {} bus",
                    path,
                    validated.bus.kind()
                );
            }
            Box::new(DeviceTransport::open(path)?)
        }
        Err(_) => {
            info!("LCD_DEVICE not set, frames are only logged");
            Box::new(DryRunTransport {
                kind: validated.bus.kind(),
                frames: 0,
            })
        }
    };

    let mut lcd = LcdController::from_config(&mut *transport, &validated);
    lcd.configure(greet);
    lcd.init()?;
    lcd.log_config();

    thread::sleep(validated.update_interval);

    let mut display = BufferedDisplay::new(lcd).with_update_interval(validated.update_interval);
    let mut tick = 0;
    display.set_writer(move |buffer| {
        tick += 1;
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        draw_clock(buffer, &clock_format, now, tick);
    });

    info!("Running {} updates...", updates);
    for _ in 0..updates {
        display.update()?;
        thread::sleep(display.update_interval());
    }

    info!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use charlcd::controller::ControllerState;
    use charlcd::geometry::DisplayGeometry;

    fn dry_run() -> DryRunTransport {
        DryRunTransport {
            kind: TransportKind::I2c,
            frames: 0,
        }
    }

    #[test]
    fn greeting_fits_single_row_displays() {
        let mut transport = dry_run();
        let mut lcd = LcdController::new(&mut transport, DisplayGeometry::new(16, 1).unwrap());
        lcd.configure(greet);
        lcd.init().unwrap();
        assert_eq!(lcd.state(), ControllerState::Ready);
        assert_eq!(lcd.cursor(), (0, "Hello!".len()));
    }

    #[test]
    fn greeting_shows_version_on_the_second_row() {
        let mut transport = dry_run();
        let mut lcd = LcdController::new(&mut transport, DisplayGeometry::new(20, 2).unwrap());
        lcd.configure(greet);
        lcd.init().unwrap();
        assert_eq!(lcd.cursor(), (1, 20));
    }

    #[test]
    fn clock_fills_what_fits() {
        let format = format_description::parse_borrowed::<2>("[hour]:[minute]").unwrap();
        let now = OffsetDateTime::from_unix_timestamp(3723).unwrap();

        let mut single = FrameBuffer::new(DisplayGeometry::new(8, 1).unwrap());
        draw_clock(&mut single, &format, now, 1);
        assert_eq!(single.row_text(0), "01:02   ");

        let mut tall = FrameBuffer::new(DisplayGeometry::new(20, 4).unwrap());
        draw_clock(&mut tall, &format, now, 3);
        assert_eq!(tall.row_text(1), "Update #3, 21°C     ");
    }
}
