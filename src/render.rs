use crate::board::Board;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Glyphs of a single cell in the block view. Each cell is two terminal columns wide, which keeps
/// it roughly square.
const ALIVE: &str = "██";
const DEAD: &str = " ·";
const CURSOR_ALIVE: &str = "▓▓";
const CURSOR_DEAD: &str = "░░";

/// Draw the board with two terminal columns per cell, one line per row. The cell under `cursor`,
/// if any, is shaded so it can be told apart whether alive or dead.
pub fn blocks(board: &Board, cursor: Option<(usize, usize)>) -> String {
    let mut s = String::with_capacity(board.rows() * (board.cols() * ALIVE.len() + 1));

    for (r, row) in board.iter_rows().enumerate() {
        for (c, &alive) in row.iter().enumerate() {
            let glyph = match (cursor == Some((r, c)), alive) {
                (true, true) => CURSOR_ALIVE,
                (true, false) => CURSOR_DEAD,
                (false, true) => ALIVE,
                (false, false) => DEAD,
            };

            s.push_str(glyph);
        }

        s.push('\n');
    }

    s
}

/// Draw the board in braille, packing 2 columns by 4 rows of cells into each character.
///
/// This fits a board eight times larger on the same screen, at the cost of not showing a cursor.
pub fn braille(board: &Board) -> String {
    // Let `w` and `h` refer to width and height of the board. Then `bw = ceil(w / 2)` and
    // `bh = ceil(h / 4)` are the width and height of the output in braille characters.
    let (bw, bh) = (board.cols().div_ceil(2), board.rows().div_ceil(4));

    // Codepoints, one per output character
    let mut cp = vec![BRAILLE_EMPTY; bw * bh];

    for (y, row) in board.iter_rows().enumerate() {
        for (x, &alive) in row.iter().enumerate() {
            if alive {
                cp[(y / 4) * bw + (x / 2)] += dot(x, y);
            }
        }
    }

    // Each braille character is 3 bytes, and newlines one byte
    let mut fb = String::with_capacity(3 * (bw * bh) + bh);

    for line in cp.chunks(bw) {
        // Every codepoint lies in U+2800..=U+28FF, all of which are valid chars
        fb.extend(line.iter().filter_map(|&c| char::from_u32(c)));
        fb.push('\n');
    }

    fb
}

/// The dot a cell lands on within its braille character.
fn dot(x: usize, y: usize) -> u32 {
    match (x % 2, y % 4) {
        (0, 0) => 0x1,
        (1, 0) => 0x8,
        (0, 1) => 0x2,
        (1, 1) => 0x10,
        (0, 2) => 0x4,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        _ => unreachable!(),
    }
}
