//! Spreadsheet-style cell addressing.
//!
//! A cell label is one row letter (`A` = row 0) followed by a 1-based column
//! number, e.g. `"B3"`. Single-letter rows cap the scheme at 26 rows, and the
//! column range is capped to match; larger grids are rejected rather than
//! wrapped into multi-letter labels.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AddressError;

/// Largest grid the single-letter addressing scheme can describe.
pub const MAX_ROWS: u32 = 26;
pub const MAX_COLS: u32 = 26;

/// One grid square. Ordering is (row, column) with a numeric column, so
/// labels sort the way a human reads them: `A9` before `A10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    row: u8,
    col: u8,
}

impl CellId {
    pub fn new(row: u32, col: u32) -> Result<Self, AddressError> {
        if row >= MAX_ROWS {
            return Err(AddressError::RowOutOfRange(row));
        }
        if col < 1 || col > MAX_COLS {
            return Err(AddressError::ColumnOutOfRange(col));
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Row index, 0-based.
    pub fn row(&self) -> u32 {
        self.row as u32
    }

    /// Column index, 1-based.
    pub fn col(&self) -> u32 {
        self.col as u32
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }

    /// True when the other cell touches this one by edge or corner.
    pub fn is_adjacent(&self, other: &CellId) -> bool {
        let row_delta = (self.row() as i32 - other.row() as i32).abs();
        let col_delta = (self.col() as i32 - other.col() as i32).abs();
        row_delta <= 1 && col_delta <= 1 && self != other
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col)
    }
}

impl FromStr for CellId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = match chars.next() {
            Some(letter) if letter.is_ascii_alphabetic() => letter,
            _ => return Err(AddressError::MalformedLabel(s.to_string())),
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::MalformedLabel(s.to_string()));
        }
        let col: u32 = digits
            .parse()
            .map_err(|_| AddressError::MalformedLabel(s.to_string()))?;
        let row = (letter.to_ascii_uppercase() as u8 - b'A') as u32;
        Self::new(row, col)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        let a1 = CellId::new(0, 1).unwrap();
        assert_eq!(a1.to_string(), "A1");
        let z26 = CellId::new(25, 26).unwrap();
        assert_eq!(z26.to_string(), "Z26");
        assert_eq!("A1".parse::<CellId>().unwrap(), a1);
        assert_eq!("Z26".parse::<CellId>().unwrap(), z26);
    }

    #[test]
    fn parse_extracts_row_and_column() {
        let b3 = "B3".parse::<CellId>().unwrap();
        assert_eq!(b3.row(), 1);
        assert_eq!(b3.col(), 3);
    }

    #[test]
    fn row_past_z_is_rejected() {
        assert!(matches!(
            CellId::new(26, 1),
            Err(AddressError::RowOutOfRange(26))
        ));
    }

    #[test]
    fn column_bounds_are_enforced() {
        assert!(matches!(
            CellId::new(0, 0),
            Err(AddressError::ColumnOutOfRange(0))
        ));
        assert!(matches!(
            CellId::new(0, 27),
            Err(AddressError::ColumnOutOfRange(27))
        ));
        assert!("A0".parse::<CellId>().is_err());
        assert!("A27".parse::<CellId>().is_err());
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for label in ["", "12", "1A", "A1b", "AA1", "A-1", "A 1"] {
            assert!(
                matches!(label.parse::<CellId>(), Err(AddressError::MalformedLabel(_))),
                "{label:?} should be malformed"
            );
        }
    }

    #[test]
    fn ordering_is_numeric_aware() {
        let a9 = "A9".parse::<CellId>().unwrap();
        let a10 = "A10".parse::<CellId>().unwrap();
        let b1 = "B1".parse::<CellId>().unwrap();
        assert!(a9 < a10);
        assert!(a10 < b1);
    }

    #[test]
    fn adjacency_is_eight_connected() {
        let b2 = "B2".parse::<CellId>().unwrap();
        for neighbor in ["A1", "A2", "A3", "B1", "B3", "C1", "C2", "C3"] {
            assert!(b2.is_adjacent(&neighbor.parse().unwrap()), "{neighbor}");
        }
        assert!(!b2.is_adjacent(&b2));
        assert!(!b2.is_adjacent(&"D2".parse().unwrap()));
        assert!(!b2.is_adjacent(&"B4".parse().unwrap()));
    }

    #[test]
    fn serializes_as_label_string() {
        let cell = "C7".parse::<CellId>().unwrap();
        assert_eq!(serde_json::to_string(&cell).unwrap(), "\"C7\"");
        let back: CellId = serde_json::from_str("\"C7\"").unwrap();
        assert_eq!(back, cell);
    }
}
