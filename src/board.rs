use std::fmt;

use rand::Rng;

use crate::rules;

/// Offsets of the Moore neighbourhood, read row by row and skipping the center.
///
///   (-1, -1) (-1, 0) (-1, 1)
///   ( 0, -1)    x    ( 0, 1)
///   ( 1, -1) ( 1, 0) ( 1, 1)
///
const NEIGHBOURHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// One generation of a fixed size, hard edged Game of Life grid.
///
/// A `Board` is never changed by the simulation. Stepping and toggling both return a new `Board`,
/// so an older generation can be kept around (say, by whoever last drew it) without it changing
/// under their feet. Each row owns its own storage, and cloning a board deep copies every row.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,

    /// `cells[row][col]`, `true` for a live cell
    cells: Vec<Vec<bool>>,
}

impl Board {
    /// Create a board where every cell is dead.
    ///
    /// # Panics
    /// If `rows` or `cols` is zero.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| false)
    }

    /// Create a board where every cell flips a fair coin.
    ///
    /// The random source is handed in so callers can pick between an entropy backed generator and
    /// a seeded one.
    ///
    /// # Panics
    /// If `rows` or `cols` is zero.
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::from_fn(rows, cols, |_, _| rng.random_bool(0.5))
    }

    /// Create a board by asking `f` for the state of every cell, in row-major order.
    ///
    /// # Panics
    /// If `rows` or `cols` is zero.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        assert!(rows > 0, "a board needs at least one row");
        assert!(cols > 0, "a board needs at least one column");

        let cells = (0..rows)
            .map(|row| (0..cols).map(|col| f(row, col)).collect())
            .collect();

        Self { rows, cols, cells }
    }

    /// Build a board out of rows of cells. Returns `None` if there are no rows, a row is empty, or
    /// the rows are not all the same length.
    pub fn from_rows(cells: Vec<Vec<bool>>) -> Option<Self> {
        let rows = cells.len();
        let cols = cells.first()?.len();

        if cols == 0 || cells.iter().any(|row| row.len() != cols) {
            return None;
        }

        Some(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check that `(row, col)` lies on the board.
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// State of the cell at `(row, col)`. Anything off the board is dead.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.in_bounds(row, col) && self.cells[row][col]
    }

    /// Iterate over the rows of the board, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().flatten().filter(|&&alive| alive).count()
    }

    /// Return a copy of this board with the cell at `(row, col)` flipped, or `None` if the cell is
    /// not on the board. `self` is left untouched.
    pub fn toggled(&self, row: usize, col: usize) -> Option<Self> {
        self.with_cell(row, col, !self.get(row, col))
    }

    /// Return a copy of this board with the cell at `(row, col)` set to `alive`, or `None` if the
    /// cell is not on the board.
    pub fn with_cell(&self, row: usize, col: usize, alive: bool) -> Option<Self> {
        if !self.in_bounds(row, col) {
            return None;
        }

        let mut next = self.clone();
        next.cells[row][col] = alive;

        Some(next)
    }

    /// Return a copy of this board with every cell in `cells` brought to life. Cells that are not
    /// on the board are skipped.
    pub fn with_live_cells<I>(&self, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut next = self.clone();

        for (row, col) in cells {
            if next.in_bounds(row, col) {
                next.cells[row][col] = true;
            }
        }

        next
    }

    /// Count the live cells among the 8 neighbours of `(row, col)`. Positions past the edge of the
    /// board count as dead; the grid does not wrap.
    pub fn live_neighbours(&self, row: usize, col: usize) -> u8 {
        let mut n = 0;

        for (dr, dc) in NEIGHBOURHOOD {
            let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc))
            else {
                continue;
            };

            if self.get(r, c) {
                n += 1;
            }
        }

        n
    }

    /// Compute the following generation.
    ///
    /// Every cell is evaluated against `self` as a whole, so no cell ever sees a neighbour that has
    /// already moved on to the next generation.
    pub fn next_generation(&self) -> Self {
        Self::from_fn(self.rows, self.cols, |row, col| {
            rules::next_state(self.cells[row][col], self.live_neighbours(row, col))
        })
    }
}

impl fmt::Display for Board {
    /// One line per row, `o` for a live cell and `.` for a dead one, like RLE uses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.iter_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            for &alive in row {
                f.write_str(if alive { "o" } else { "." })?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.rows, self.cols)?;
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    /// Build a board from a picture made of `o` and `.`
    fn board(picture: &str) -> Board {
        let cells = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| c == 'o').collect())
            .collect();

        Board::from_rows(cells).unwrap()
    }

    #[test]
    fn empty_board_is_dead() {
        let b = Board::empty(4, 7);

        assert_eq!(b.rows(), 4);
        assert_eq!(b.cols(), 7);
        assert_eq!(b.population(), 0);
    }

    #[test]
    #[should_panic(expected = "at least one row")]
    fn zero_rows_panics() {
        Board::empty(0, 3);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Board::from_rows(vec![]).is_none());
        assert!(Board::from_rows(vec![vec![]]).is_none());
        assert!(Board::from_rows(vec![vec![true, false], vec![true]]).is_none());
    }

    #[test]
    fn random_is_reproducible_with_a_seeded_source() {
        let a = Board::random(8, 8, &mut ChaCha8Rng::seed_from_u64(7));
        let b = Board::random(8, 8, &mut ChaCha8Rng::seed_from_u64(7));

        assert_eq!(a, b);
    }

    #[test]
    fn random_draws_both_states() {
        let b = Board::random(32, 32, &mut ChaCha8Rng::seed_from_u64(1));
        let alive = b.population();

        assert!(alive > 0 && alive < 32 * 32, "{alive} live cells");
    }

    #[test]
    fn neighbours_do_not_wrap() {
        let b = board(
            "
            o..
            ...
            ..o
            ",
        );

        assert_eq!(b.live_neighbours(0, 0), 0);
        assert_eq!(b.live_neighbours(1, 1), 2);
        assert_eq!(b.live_neighbours(0, 2), 0);
        assert_eq!(b.live_neighbours(2, 0), 0);
    }

    #[test]
    fn full_board_neighbour_counts() {
        let b = Board::from_fn(3, 3, |_, _| true);

        assert_eq!(b.live_neighbours(0, 0), 3);
        assert_eq!(b.live_neighbours(0, 1), 5);
        assert_eq!(b.live_neighbours(1, 1), 8);
    }

    #[test]
    fn out_of_bounds_is_dead() {
        let b = Board::from_fn(2, 2, |_, _| true);

        assert!(!b.get(2, 0));
        assert!(!b.get(0, 2));
        assert!(!b.in_bounds(2, 2));
    }

    #[test]
    fn dead_board_stays_dead() {
        let b = Board::empty(5, 5);

        assert_eq!(b.next_generation(), b);
    }

    #[test]
    fn lonely_corner_cell_dies() {
        let b = Board::empty(4, 4).toggled(0, 0).unwrap();

        assert_eq!(b.next_generation().population(), 0);
    }

    #[test]
    fn blinker_has_period_two() {
        let horizontal = board(
            "
            .....
            .....
            .ooo.
            .....
            .....
            ",
        );
        let vertical = board(
            "
            .....
            ..o..
            ..o..
            ..o..
            .....
            ",
        );

        let once = horizontal.next_generation();
        assert_eq!(once, vertical);
        assert_eq!(once.next_generation(), horizontal);
    }

    #[test]
    fn block_is_still() {
        let block = board(
            "
            ....
            .oo.
            .oo.
            ....
            ",
        );

        assert_eq!(block.next_generation(), block);
    }

    #[test]
    fn block_in_corner_is_still() {
        let block = board(
            "
            oo.
            oo.
            ...
            ",
        );

        assert_eq!(block.next_generation(), block);
    }

    #[test]
    fn glider_is_truncated_by_the_edge() {
        // A glider heading into the bottom right corner turns into a block, instead of wrapping
        // around or growing the grid.
        let mut b = board(
            "
            .o...
            ..o..
            ooo..
            .....
            .....
            ",
        );

        for _ in 0..12 {
            b = b.next_generation();
        }

        insta::assert_snapshot!(b, @r"
        .....
        .....
        .....
        ...oo
        ...oo
        ");
    }

    #[test]
    fn stepping_leaves_the_input_alone() {
        let b = board(
            "
            ...
            ooo
            ...
            ",
        );
        let before = b.clone();

        let _ = b.next_generation();

        assert_eq!(b, before);
    }

    #[test]
    fn toggle_out_of_bounds_is_none() {
        assert!(Board::empty(3, 3).toggled(3, 0).is_none());
        assert!(Board::empty(3, 3).toggled(0, 3).is_none());
    }

    #[test]
    fn display() {
        let b = Board::empty(2, 3).toggled(1, 1).unwrap();

        insta::assert_snapshot!(b, @r"
        ...
        .o.
        ");
    }

    proptest! {
        #[test]
        fn boards_are_rectangular(rows in 1usize..40, cols in 1usize..40, seed: u64) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            for b in [Board::empty(rows, cols), Board::random(rows, cols, &mut rng)] {
                prop_assert_eq!(b.rows(), rows);
                prop_assert_eq!(b.cols(), cols);
                prop_assert_eq!(b.iter_rows().count(), rows);
                prop_assert!(b.iter_rows().all(|row| row.len() == cols));
            }
        }

        #[test]
        fn toggling_a_copy_leaves_the_original(
            rows in 1usize..20,
            cols in 1usize..20,
            r in 0usize..20,
            c in 0usize..20,
            seed: u64,
        ) {
            let (r, c) = (r % rows, c % cols);
            let b = Board::random(rows, cols, &mut ChaCha8Rng::seed_from_u64(seed));
            let before = b.get(r, c);

            let t = b.clone().toggled(r, c).unwrap();

            prop_assert_eq!(b.get(r, c), before);
            prop_assert_eq!(t.get(r, c), !before);
            prop_assert_eq!(
                b.population().abs_diff(t.population()),
                1
            );
        }

        #[test]
        fn next_generation_keeps_dimensions(rows in 1usize..30, cols in 1usize..30, seed: u64) {
            let b = Board::random(rows, cols, &mut ChaCha8Rng::seed_from_u64(seed));
            let n = b.next_generation();

            prop_assert_eq!((n.rows(), n.cols()), (rows, cols));
        }
    }
}
