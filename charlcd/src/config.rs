//! Configuration schema of a character display.
//!
//! ```json
//! {
//!   "dimensions": "20x4",
//!   "custom_chars": [
//!     { "char": "°", "pixel_data": ["0x0C", "0x12", "0x12", "0x0C", 0, 0, 0, 0] }
//!   ],
//!   "update_interval_ms": 1000,
//!   "bus": { "type": "i2c", "address": 40 }
//! }
//! ```
//!
//! Deserializing only checks the shape, [DisplayConfig::validate] checks everything else and turns
//! the config into what the controller needs.

use crate::geometry::DisplayGeometry;
use crate::glyph::{GLYPH_ROWS, GLYPH_SLOTS, GlyphTable};
use crate::transport::{DEFAULT_BAUD_RATE, DEFAULT_I2C_ADDRESS};
use crate::{LcdError, LcdResult, TransportKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_chars: Vec<CustomChar>,
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    #[serde(default)]
    pub bus: BusConfig,
}

fn default_update_interval_ms() -> u64 {
    1000
}

/// Display size, written as `"20x4"` or `[20, 4]` (columns first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DimensionsRepr", into = "String")]
pub struct Dimensions {
    pub columns: usize,
    pub rows: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionsRepr {
    Text(String),
    Pair([usize; 2]),
}

impl TryFrom<DimensionsRepr> for Dimensions {
    type Error = String;

    fn try_from(repr: DimensionsRepr) -> Result<Self, Self::Error> {
        match repr {
            DimensionsRepr::Pair([columns, rows]) => Ok(Dimensions { columns, rows }),
            DimensionsRepr::Text(text) => {
                let invalid = || format!("invalid dimensions {text:?}, expected COLUMNSxROWS");
                let (columns, rows) = text
                    .trim()
                    .split_once(['x', 'X'])
                    .ok_or_else(invalid)?;
                Ok(Dimensions {
                    columns: columns.trim().parse().map_err(|_| invalid())?,
                    rows: rows.trim().parse().map_err(|_| invalid())?,
                })
            }
        }
    }
}

impl From<Dimensions> for String {
    fn from(dimensions: Dimensions) -> Self {
        format!("{}x{}", dimensions.columns, dimensions.rows)
    }
}

/// A custom character: the character it replaces and its 8 pixel rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomChar {
    #[serde(rename = "char")]
    pub character: String,
    pub pixel_data: Vec<HexByte>,
}

/// A byte written either as a number or as a hex string like `"0x1F"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HexRepr", into = "u8")]
pub struct HexByte(pub u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum HexRepr {
    Int(u64),
    Text(String),
}

impl TryFrom<HexRepr> for HexByte {
    type Error = String;

    fn try_from(repr: HexRepr) -> Result<Self, Self::Error> {
        let out_of_range = |value: &dyn std::fmt::Display| format!("{value} does not fit in a byte");
        match repr {
            HexRepr::Int(value) => u8::try_from(value)
                .map(HexByte)
                .map_err(|_| out_of_range(&value)),
            HexRepr::Text(text) => {
                let trimmed = text.trim();
                let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => trimmed.parse(),
                };
                let value = parsed.map_err(|_| format!("invalid byte {text:?}"))?;
                u8::try_from(value)
                    .map(HexByte)
                    .map_err(|_| out_of_range(&text))
            }
        }
    }
}

impl From<HexByte> for u8 {
    fn from(byte: HexByte) -> u8 {
        byte.0
    }
}

/// The bus the display hangs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        #[serde(default = "default_i2c_address")]
        address: u8,
    },
    Spi,
    Uart {
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },
}

fn default_i2c_address() -> u8 {
    DEFAULT_I2C_ADDRESS
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig::I2c {
            address: DEFAULT_I2C_ADDRESS,
        }
    }
}

impl BusConfig {
    pub fn kind(&self) -> TransportKind {
        match self {
            BusConfig::I2c { .. } => TransportKind::I2c,
            BusConfig::Spi => TransportKind::Spi,
            BusConfig::Uart { .. } => TransportKind::Uart,
        }
    }
}

/// A configuration that passed [DisplayConfig::validate].
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub geometry: DisplayGeometry,
    pub glyphs: GlyphTable,
    pub update_interval: Duration,
    pub bus: BusConfig,
}

impl DisplayConfig {
    pub fn new(columns: usize, rows: usize) -> Self {
        DisplayConfig {
            dimensions: Dimensions { columns, rows },
            custom_chars: Vec::new(),
            update_interval_ms: default_update_interval_ms(),
            bus: BusConfig::default(),
        }
    }

    /// Validates the whole configuration. Custom characters get slots in the order they're listed.
    ///
    /// # Errors
    /// - [LcdError::Validation] for bad dimensions, more than 8 custom characters, a `char` that is
    ///   not exactly one character, pixel data without exactly 8 rows, a zero update interval, or an
    ///   I²C address wider than 7 bits.
    pub fn validate(&self) -> LcdResult<ValidatedConfig> {
        let geometry = DisplayGeometry::new(self.dimensions.columns, self.dimensions.rows)?;

        if self.custom_chars.len() > GLYPH_SLOTS {
            return Err(LcdError::validation(format!(
                "at most {GLYPH_SLOTS} custom characters are supported, got {}",
                self.custom_chars.len()
            )));
        }

        let mut glyphs = GlyphTable::new();
        for (index, custom) in self.custom_chars.iter().enumerate() {
            let mut chars = custom.character.chars();
            let codepoint = match (chars.next(), chars.next()) {
                (Some(c), None) => c as u32,
                _ => {
                    return Err(LcdError::validation(format!(
                        "custom character {index}: {:?} must be exactly one character",
                        custom.character
                    )));
                }
            };
            if custom.pixel_data.len() != GLYPH_ROWS {
                return Err(LcdError::validation(format!(
                    "custom character {index}: pixel data must supply exactly {GLYPH_ROWS} rows, got {}",
                    custom.pixel_data.len()
                )));
            }
            let rows: Vec<u8> = custom.pixel_data.iter().map(|row| row.0).collect();
            glyphs.register(index as u8, codepoint, &rows)?;
        }

        if self.update_interval_ms == 0 {
            return Err(LcdError::validation("update interval must be positive"));
        }

        if let BusConfig::I2c { address } = self.bus {
            if address > 0x7F {
                return Err(LcdError::validation(format!(
                    "I2C address {address:#04X} is wider than 7 bits"
                )));
            }
        }

        Ok(ValidatedConfig {
            geometry,
            glyphs,
            update_interval: Duration::from_millis(self.update_interval_ms),
            bus: self.bus,
        })
    }
}
