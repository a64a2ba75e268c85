//! Custom characters stored in the display's CGRAM.
//!
//! An HD44780 controller has room for 8 user-defined 5x8 characters. Each one is 8 bytes, one per
//! pixel row from the top, where only the lowest 5 bits are shown (bit 4 is the leftmost pixel).

use crate::{LcdError, LcdResult};
use log::warn;

/// Number of CGRAM slots.
pub const GLYPH_SLOTS: usize = 8;
/// Pixel rows per glyph.
pub const GLYPH_ROWS: usize = 8;
/// The pixel bits of a row.
pub const ROW_MASK: u8 = 0b0001_1111;

/// A custom character registered in one of the CGRAM slots.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GlyphSlot {
    index: u8,
    codepoint: u32,
    rows: [u8; GLYPH_ROWS],
}

impl GlyphSlot {
    /// Slot index, `0..=7`. This is also the character code the glyph is displayed with.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The character this glyph replaces when writing text.
    pub fn codepoint(&self) -> u32 {
        self.codepoint
    }

    /// Pixel rows, already masked to 5 bits.
    pub fn rows(&self) -> &[u8; GLYPH_ROWS] {
        &self.rows
    }

    /// The CGRAM address of the first row of this glyph.
    pub fn cgram_address(&self) -> u8 {
        self.index << 3
    }
}

/// The table of custom characters of a single controller.
#[derive(Clone, Debug, Default)]
pub struct GlyphTable {
    slots: [Option<GlyphSlot>; GLYPH_SLOTS],
}

impl GlyphTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a glyph in the given slot.
    ///
    /// Bits above bit 4 of each row can't be shown, so they're dropped with a warning.
    ///
    /// # Errors
    /// - [LcdError::Capacity] if all 8 slots are already taken.
    /// - [LcdError::Validation] if `index` is not within `0..=7`, the slot is already taken, or `rows`
    ///   doesn't have exactly 8 bytes.
    pub fn register(&mut self, index: u8, codepoint: u32, rows: &[u8]) -> LcdResult<()> {
        if self.len() >= GLYPH_SLOTS {
            return Err(LcdError::Capacity(GLYPH_SLOTS));
        }
        if index as usize >= GLYPH_SLOTS {
            return Err(LcdError::validation(format!(
                "glyph index {index} is out of range 0..={}",
                GLYPH_SLOTS - 1
            )));
        }
        if self.slots[index as usize].is_some() {
            return Err(LcdError::validation(format!("glyph slot {index} is already registered")));
        }
        let rows: [u8; GLYPH_ROWS] = rows.try_into().map_err(|_| {
            LcdError::validation(format!(
                "pixel data must supply exactly {GLYPH_ROWS} rows, got {}",
                rows.len()
            ))
        })?;

        if rows.iter().any(|row| row & !ROW_MASK != 0) {
            warn!("Glyph {} has pixels past column 5, dropping them: {:02X?}", index, rows);
        }

        self.slots[index as usize] = Some(GlyphSlot {
            index,
            codepoint,
            rows: rows.map(|row| row & ROW_MASK),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u8) -> Option<&GlyphSlot> {
        self.slots.get(index as usize)?.as_ref()
    }

    /// Iterates over the registered glyphs in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &GlyphSlot> {
        self.slots.iter().flatten()
    }

    /// Finds the slot that replaces the given character.
    pub fn lookup(&self, c: char) -> Option<u8> {
        self.iter()
            .find(|slot| slot.codepoint == c as u32)
            .map(|slot| slot.index)
    }
}
