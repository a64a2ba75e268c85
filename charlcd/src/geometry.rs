use crate::{LcdError, LcdResult};

/// Largest number of columns a character display may have.
pub const MAX_COLUMNS: u8 = 64;
/// Largest number of rows a character display may have.
pub const MAX_ROWS: u8 = 4;

/// Validated display dimensions, in characters.
///
/// Can only be built through [DisplayGeometry::new], so holding one means both bounds were checked.
///
/// A single HD44780 has two 40 character lines of DDRAM, and rows 3 and 4 are the second halves of
/// lines 1 and 2. Geometries past that are accepted, but their rows overlap in DDRAM, see
/// [DisplayGeometry::fits_ddram].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DisplayGeometry {
    columns: u8,
    rows: u8,
}

impl DisplayGeometry {
    /// Validates the dimensions of a display.
    ///
    /// # Errors
    /// - [LcdError::Validation] if `columns` is not within `1..=64` or `rows` is not within `1..=4`.
    pub fn new(columns: usize, rows: usize) -> LcdResult<Self> {
        if columns > MAX_COLUMNS as usize {
            return Err(LcdError::validation(format!(
                "{columns} columns exceeds maximum columns ({MAX_COLUMNS})"
            )));
        }
        if rows > MAX_ROWS as usize {
            return Err(LcdError::validation(format!(
                "{rows} rows exceeds maximum rows ({MAX_ROWS})"
            )));
        }
        if columns == 0 || rows == 0 {
            return Err(LcdError::validation("display must have at least one column and row"));
        }
        Ok(DisplayGeometry {
            columns: columns as u8,
            rows: rows as u8,
        })
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of character cells on the display.
    pub fn positions(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows as usize && col < self.columns as usize
    }

    /// Checks that the position is on the display.
    ///
    /// # Errors
    /// - [LcdError::OutOfBounds] if `row` or `col` is past the last row or column.
    pub fn check(&self, row: usize, col: usize) -> LcdResult<()> {
        if self.contains(row, col) {
            Ok(())
        } else {
            Err(LcdError::OutOfBounds {
                row,
                col,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    /// Whether every position has its own DDRAM address on a single controller.
    ///
    /// One row can use all 64 columns, two rows up to 40 columns each, and three or four rows up to
    /// 20 columns, since rows 3 and 4 continue rows 1 and 2.
    pub fn fits_ddram(&self) -> bool {
        match self.rows {
            1 => true,
            2 => self.columns <= 40,
            _ => self.columns <= 20,
        }
    }

    /// Gets the DDRAM address of the given position.
    ///
    /// HD44780 controllers map the first two lines to `0x00` and `0x40`, and lines 3 and 4 continue
    /// lines 1 and 2 right after the last column. The address is 7 bits wide, so it wraps past `0x7F`.
    ///
    /// The position has to be checked by the caller. On geometries that don't [fit](Self::fits_ddram)
    /// different positions can share an address.
    pub fn ddram_address(&self, row: usize, col: usize) -> u8 {
        let row_offset = match row {
            0 => 0x00,
            1 => 0x40,
            2 => self.columns as usize,
            _ => 0x40 + self.columns as usize,
        };
        ((row_offset + col) & 0b0111_1111) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn accepts_every_supported_size(columns in 1usize..=64, rows in 1usize..=4) {
            let geometry = DisplayGeometry::new(columns, rows).unwrap();
            prop_assert_eq!(geometry.columns() as usize, columns);
            prop_assert_eq!(geometry.rows() as usize, rows);
        }

        #[test]
        fn rejects_too_many_columns(columns in 65usize..1000, rows in 1usize..=4) {
            let err = DisplayGeometry::new(columns, rows).unwrap_err();
            prop_assert!(matches!(err, LcdError::Validation(ref msg) if msg.contains("maximum columns")));
        }

        #[test]
        fn rejects_too_many_rows(columns in 1usize..=64, rows in 5usize..1000) {
            let err = DisplayGeometry::new(columns, rows).unwrap_err();
            prop_assert!(matches!(err, LcdError::Validation(ref msg) if msg.contains("maximum rows")));
        }
    }

    #[test]
    fn rejects_empty_display() {
        assert!(DisplayGeometry::new(0, 2).is_err());
        assert!(DisplayGeometry::new(16, 0).is_err());
    }

    #[test]
    fn bounds_are_exclusive() {
        let geometry = DisplayGeometry::new(16, 2).unwrap();
        assert!(geometry.check(1, 15).is_ok());
        assert_eq!(
            geometry.check(1, 16),
            Err(LcdError::OutOfBounds { row: 1, col: 16, columns: 16, rows: 2 })
        );
        assert!(geometry.check(2, 0).is_err());
    }

    #[test]
    fn ddram_addresses_follow_hd44780_layout() {
        let geometry = DisplayGeometry::new(20, 4).unwrap();
        assert_eq!(geometry.ddram_address(0, 0), 0x00);
        assert_eq!(geometry.ddram_address(1, 0), 0x40);
        assert_eq!(geometry.ddram_address(2, 0), 0x14);
        assert_eq!(geometry.ddram_address(3, 19), 0x67);
    }

    #[test]
    fn oversized_layouts_overlap_in_ddram() {
        for (columns, rows) in [(64, 1), (40, 2), (20, 4), (16, 4), (20, 3)] {
            assert!(DisplayGeometry::new(columns, rows).unwrap().fits_ddram());
        }
        for (columns, rows) in [(41, 2), (21, 4), (26, 3), (64, 4)] {
            assert!(!DisplayGeometry::new(columns, rows).unwrap().fits_ddram());
        }

        let geometry = DisplayGeometry::new(64, 4).unwrap();
        assert_eq!(geometry.ddram_address(2, 0), geometry.ddram_address(1, 0));
        assert_eq!(geometry.ddram_address(3, 0), geometry.ddram_address(0, 0));
    }

    proptest! {
        #[test]
        fn fitting_layouts_have_distinct_addresses(columns in 1usize..=64, rows in 1usize..=4) {
            let geometry = DisplayGeometry::new(columns, rows).unwrap();
            prop_assume!(geometry.fits_ddram());
            let mut addresses: Vec<u8> = (0..rows)
                .flat_map(|row| (0..columns).map(move |col| geometry.ddram_address(row, col)))
                .collect();
            addresses.sort_unstable();
            addresses.dedup();
            prop_assert_eq!(addresses.len(), geometry.positions());
        }
    }
}
