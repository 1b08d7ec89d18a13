//! Remote cell addressing.
//!
//! The remote store addresses cells in A1 notation: a 1-based row number and
//! a letter column label (A..Z, AA..ZZ, AAA..). Everything inside the cache
//! is 0-based; translation happens only here.

use std::fmt;

/// A cell address in the remote store's native scheme.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: usize,
    /// Column label ("A", "B", ..., "AA", ...)
    pub column: String,
}

impl CellAddress {
    /// Translate a 0-based grid position.
    pub fn from_grid(row: usize, col: usize) -> Self {
        Self {
            row: row + 1,
            column: col_to_letters(col),
        }
    }

    /// Address qualified with its worksheet, e.g. `'Time Log'!B2`.
    pub fn qualified(&self, worksheet: &str) -> String {
        format!("{}!{}", quote_worksheet(worksheet), self)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Convert a 0-based column index to its label: 0 -> A, 25 -> Z, 26 -> AA.
///
/// Bijective base-26: there is no zero digit, so `Z` is followed by `AA`.
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Convert a column label back to a 0-based index. Case-insensitive.
pub fn letters_to_col(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for ch in label.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Parse an A1 reference ("B2", "aa10") into a 0-based (row, col).
pub fn parse_a1(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.trim();
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = letters_to_col(letters)?;
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col))
}

/// Quote a worksheet title for use in a range: `Sheet1` -> `'Sheet1'`.
pub fn quote_worksheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}
