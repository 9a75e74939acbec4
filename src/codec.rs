//! Text encoding of a [`Board`], used to save and restore it.
//!
//! A board is written row by row. Cells in a row are joined by [`CELL_DELIMITER`], and rows are
//! joined by [`ROW_DELIMITER`]:
//!
//! ```notrust
//! | . . . |
//! | o o . | => "false,false,false-true,true,false-false,false,true"
//! | . . o |
//! ```
//!
//! The format carries no version and no dimensions. Whoever decodes a string must already know
//! the shape it expects.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::board::Board;

pub const CELL_DELIMITER: char = ',';
pub const ROW_DELIMITER: char = '-';

const ALIVE: &str = "true";
const DEAD: &str = "false";

/// Prefix put in front of [`derive_key`] when a board goes into a store.
pub const STORAGE_KEY_PREFIX: &str = "board";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("Expected {expected} cells in row {row}, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid cell \"{token}\" at ({row}, {col})")]
    InvalidToken {
        row: usize,
        col: usize,
        token: String,
    },
}

/// How cell tokens are read back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPolicy {
    /// Exactly `false` is dead, and so is any token that reads as the number zero once surrounding
    /// whitespace is dropped (`0`, ` 0 `, `0.0`, a blank token). Anything else is alive, including
    /// ` false` with a leading space.
    #[default]
    Permissive,

    /// Only `true` and `false` are accepted.
    Strict,
}

impl TokenPolicy {
    fn parse(self, token: &str) -> Option<bool> {
        match (self, token) {
            (_, ALIVE) => Some(true),
            (_, DEAD) => Some(false),
            (TokenPolicy::Strict, _) => None,
            (TokenPolicy::Permissive, t) => {
                let t = t.trim();
                let zero = t.is_empty() || t.parse::<f64>().is_ok_and(|n| n == 0.0);
                let alive = !zero;

                debug!(token, alive, "Non-canonical cell token");

                Some(alive)
            }
        }
    }
}

/// Encode a board into its canonical string.
pub fn encode(board: &Board) -> String {
    let mut s = String::with_capacity(board.rows() * board.cols() * (DEAD.len() + 1));

    for (i, row) in board.iter_rows().enumerate() {
        if i > 0 {
            s.push(ROW_DELIMITER);
        }

        for (j, &alive) in row.iter().enumerate() {
            if j > 0 {
                s.push(CELL_DELIMITER);
            }

            s.push_str(if alive { ALIVE } else { DEAD });
        }
    }

    s
}

/// Decode a string produced by [`encode`] into a `rows` by `cols` board, reading cells with
/// [`TokenPolicy::Permissive`].
pub fn decode(s: &str, rows: usize, cols: usize) -> Result<Board, DecodeError> {
    decode_with(s, rows, cols, TokenPolicy::Permissive)
}

/// Like [`decode`], with an explicit [`TokenPolicy`].
///
/// The shape is never guessed. If splitting `s` does not give exactly `rows` rows of `cols` cells
/// each, decoding fails.
pub fn decode_with(
    s: &str,
    rows: usize,
    cols: usize,
    policy: TokenPolicy,
) -> Result<Board, DecodeError> {
    let found = s.split(ROW_DELIMITER).count();
    if found != rows {
        return Err(DecodeError::RowCount {
            expected: rows,
            found,
        });
    }

    let mut cells = Vec::with_capacity(rows);

    for (row, line) in s.split(ROW_DELIMITER).enumerate() {
        let mut cs = Vec::with_capacity(cols);

        for (col, token) in line.split(CELL_DELIMITER).enumerate() {
            let alive = policy
                .parse(token)
                .ok_or_else(|| DecodeError::InvalidToken {
                    row,
                    col,
                    token: token.to_string(),
                })?;

            cs.push(alive);
        }

        if cs.len() != cols {
            return Err(DecodeError::ColumnCount {
                row,
                expected: cols,
                found: cs.len(),
            });
        }

        cells.push(cs);
    }

    // rows and cols were both checked above, so the only way to fail here is a zero dimension
    Board::from_rows(cells).ok_or(DecodeError::RowCount {
        expected: rows,
        found: 0,
    })
}

/// Derive the key a board of the given dimensions is looked up under, `"<rows>-<cols>"`.
///
/// Neither number can contain the separator, so distinct dimensions give distinct keys.
pub fn derive_key(rows: usize, cols: usize) -> String {
    format!("{rows}{ROW_DELIMITER}{cols}")
}

/// Key a board of the given dimensions is stored under, [`derive_key`] with
/// [`STORAGE_KEY_PREFIX`] in front.
pub fn storage_key(rows: usize, cols: usize) -> String {
    format!("{STORAGE_KEY_PREFIX}{}", derive_key(rows, cols))
}
