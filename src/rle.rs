use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::board::Board;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::rules;

/// A pattern read out of an RLE file. Live cells are stored relative to the pattern's top left
/// corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: Option<String>,
    width: usize,
    height: usize,

    /// `(row, col)` of each live cell
    cells: Vec<(usize, usize)>,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Header line error: {0}")]
    Header(#[from] ParseError),

    #[error("Invalid number: {0}")]
    Number(#[from] ConvertError),

    #[error("Unsupported rule \"{0}\", only B3/S23 is supported")]
    UnsupportedRule(String),

    #[error("Unrecognized character '{0}'")]
    UnexpectedChar(char),

    #[error("Live cell ({row}, {col}) lies outside the {width}x{height} pattern")]
    OutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("Run of {run} at ({row}, {col}) runs past any representable position")]
    RunTooLong { run: usize, row: usize, col: usize },

    #[error("Unexpected end of input, expected '!'")]
    UnexpectedEof,
}

impl Pattern {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    /// Return a copy of `board` with this pattern's live cells set, its top left corner at
    /// `(top, left)`. Cells that fall off the board are dropped. Cells the pattern leaves dead are
    /// not touched.
    pub fn place(&self, board: &Board, top: usize, left: usize) -> Board {
        let cells = self
            .cells
            .iter()
            .filter_map(|&(r, c)| Some((r.checked_add(top)?, c.checked_add(left)?)));

        board.with_live_cells(cells)
    }

    /// Like [`Pattern::place`], with the pattern centered on the board.
    pub fn place_centered(&self, board: &Board) -> Board {
        let top = board.rows().saturating_sub(self.height) / 2;
        let left = board.cols().saturating_sub(self.width) / 2;

        self.place(board, top, left)
    }
}

/// Parse the RLE file format. Assumes the bytes are valid Ascii.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle(mut bytes: &[u8]) -> Result<Pattern, RleError> {
    let mut name = None;

    // Parse as many comment lines as possible
    loop {
        bytes = parse_util::take_ws(bytes);

        let Ok(rest) = parse_util::expect(b'#', bytes) else {
            break;
        };

        let (kind, rest) = parse_util::take_1(rest);
        let (line, rest) = parse_util::take_line(rest);
        let line = String::from_utf8_lossy(line).trim().to_string();

        match kind {
            Some(b'N') => {
                if name.is_some() {
                    warn!("RLE pattern name already defined. Using latest");
                }

                name = Some(line);
            }
            Some(b'r') => {
                if !rules::is_b3s23(&line) {
                    return Err(RleError::UnsupportedRule(line));
                }
            }
            // Comments, author, and offsets. The pattern gets placed by whoever loads it.
            Some(b'C' | b'c' | b'O' | b'P' | b'R') => {
                debug!(%line, "Skipping RLE comment line");
            }
            Some(b) => {
                warn!("Unrecognized RLE comment type '{}'", b as char);
            }
            None => {}
        }

        bytes = rest;
    }

    let (line, rest) = parse_util::take_line(bytes);
    let (width, height) = read_header(line)?;

    let cells = read_encoding(rest, width, height)?;

    Ok(Pattern {
        name,
        width,
        height,
        cells,
    })
}

/// Read a header line such as `x = 3, y = 3, rule = B3/S23`. Returns `(width, height)`.
fn read_header(bytes: &[u8]) -> Result<(usize, usize), RleError> {
    let (width, bytes) = read_dimension(b'x', bytes)?;

    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b',', bytes)?;

    let (height, bytes) = read_dimension(b'y', bytes)?;

    let bytes = parse_util::take_ws(bytes);
    if bytes.is_empty() {
        return Ok((width, height));
    }

    let bytes = parse_util::expect(b',', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect_slice(b"rule", bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;

    let rule = String::from_utf8_lossy(bytes).trim().to_string();
    if !rules::is_b3s23(&rule) {
        return Err(RleError::UnsupportedRule(rule));
    }

    Ok((width, height))
}

/// Read `<axis> = <n>`, leaving whatever comes after `n`.
fn read_dimension(axis: u8, bytes: &[u8]) -> Result<(usize, &[u8]), RleError> {
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(axis, bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    let (Some(n), bytes) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes) else {
        let err = match parse_util::take_1(bytes) {
            (Some(got), _) => ParseError::UnexpectedToken {
                exp: '0',
                got: got as char,
            },
            (None, _) => ParseError::UnexpectedEof { exp: '0' },
        };

        return Err(err.into());
    };

    Ok((parse_util::convert(n)?, bytes))
}

fn read_encoding(
    mut bytes: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<(usize, usize)>, RleError> {
    let mut cells = Vec::new();
    let (mut row, mut col): (usize, usize) = (0, 0);

    // Run count of the next tag
    let mut run: Option<usize> = None;

    loop {
        let (Some(b), rest) = parse_util::take_1(bytes) else {
            return Err(RleError::UnexpectedEof);
        };

        match b {
            // End of pattern
            b'!' => break,

            b if b.is_ascii_whitespace() => {}

            // Dead cells
            b'b' => {
                let n = run.take().unwrap_or(1);
                col = col
                    .checked_add(n)
                    .ok_or(RleError::RunTooLong { run: n, row, col })?;
            }

            // Live cells
            b'o' => {
                let n = run.take().unwrap_or(1);
                let end = col
                    .checked_add(n)
                    .ok_or(RleError::RunTooLong { run: n, row, col })?;

                if row >= height || end > width {
                    return Err(RleError::OutOfBounds {
                        row,
                        col: if row >= height { col } else { col.max(width) },
                        width,
                        height,
                    });
                }

                cells.extend((col..end).map(|c| (row, c)));
                col = end;
            }

            // End of line(s)
            b'$' => {
                let n = run.take().unwrap_or(1);
                row = row
                    .checked_add(n)
                    .ok_or(RleError::RunTooLong { run: n, row, col })?;
                col = 0;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    unreachable!("We peeked and found a digit")
                };

                run = Some(parse_util::convert(n)?);
                bytes = rest;

                continue;
            }

            b => return Err(RleError::UnexpectedChar(b as char)),
        }

        bytes = rest;
    }

    Ok(cells)
}
