use rand::Rng;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::board::Board;
use crate::codec;
use crate::codec::DecodeError;
use crate::codec::TokenPolicy;
use crate::rle::Pattern;
use crate::store::BoardStore;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No board stored with current dimensions ({rows}x{cols})")]
    NoSavedBoard { rows: usize, cols: usize },

    #[error("Stored board is corrupt: {0}")]
    Decode(#[from] DecodeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Everything a front end needs to run one board: the current generation, whether it is running,
/// and how many generations have passed since it was last replaced.
///
/// The dimensions are fixed when the session is made. Every action swaps in a new [`Board`]; the
/// session is the only place the current board lives.
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    running: bool,
    generation: u64,
    policy: TokenPolicy,
}

impl Session {
    /// Start a paused session on an empty board.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            board: Board::empty(rows, cols),
            running: false,
            generation: 0,
            policy: TokenPolicy::default(),
        }
    }

    /// Use `policy` when reading saved boards back.
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    pub fn cols(&self) -> usize {
        self.board.cols()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(generation = self.generation, "Simulation started");
        }

        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(generation = self.generation, "Simulation stopped");
        }

        self.running = false;
    }

    /// Flip between running and paused, returning whether the session is now running.
    pub fn toggle_running(&mut self) -> bool {
        if self.running {
            self.stop();
        } else {
            self.start();
        }

        self.running
    }

    /// Advance one generation, but only if the session is still running. Returns whether a step
    /// happened.
    ///
    /// A step can be scheduled while running and only get here after a pause. Checking the flag
    /// here turns such a step into a no-op.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.step();

        true
    }

    /// Advance one generation whether or not the session is running.
    pub fn step(&mut self) {
        self.board = self.board.next_generation();
        self.generation += 1;
    }

    /// Flip a single cell. This pauses the simulation. Returns `false`, changing nothing, if the
    /// cell is not on the board.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        let Some(board) = self.board.toggled(row, col) else {
            warn!(row, col, "Ignoring toggle outside the board");
            return false;
        };

        self.stop();
        self.board = board;

        true
    }

    /// Pause and replace the board with an empty one.
    pub fn clear(&mut self) {
        self.stop();
        self.replace(Board::empty(self.rows(), self.cols()));
    }

    /// Replace the board with a random one drawn from `rng`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.replace(Board::random(self.rows(), self.cols(), rng));
    }

    /// Stamp `pattern` onto the middle of the board, clipping whatever does not fit.
    pub fn place(&mut self, pattern: &Pattern) {
        self.replace(pattern.place_centered(&self.board));
    }

    /// Save the current board under the key for the current dimensions. Returns the key used.
    pub fn save<S: BoardStore + ?Sized>(&self, store: &mut S) -> Result<String, SessionError> {
        let key = codec::storage_key(self.rows(), self.cols());
        store.set(&key, &codec::encode(&self.board))?;

        info!(%key, population = self.board.population(), "Saved board");

        Ok(key)
    }

    /// Load the board saved for the current dimensions.
    ///
    /// If nothing was saved, this is [`SessionError::NoSavedBoard`] and the board is untouched.
    pub fn load<S: BoardStore + ?Sized>(&mut self, store: &S) -> Result<(), SessionError> {
        let (rows, cols) = (self.rows(), self.cols());
        let key = codec::storage_key(rows, cols);

        let encoded = match store.get(&key) {
            Ok(encoded) => encoded,
            Err(StoreError::NotFound { .. }) => {
                debug!(%key, "Nothing saved");
                return Err(SessionError::NoSavedBoard { rows, cols });
            }
            Err(e) => return Err(e.into()),
        };

        let board = codec::decode_with(&encoded, rows, cols, self.policy)?;

        info!(%key, population = board.population(), "Loaded board");
        self.replace(board);

        Ok(())
    }

    fn replace(&mut self, board: Board) {
        self.board = board;
        self.generation = 0;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::store::MemoryStore;

    fn blinker() -> Session {
        let mut s = Session::new(5, 5);

        s.toggle(2, 1);
        s.toggle(2, 2);
        s.toggle(2, 3);

        s
    }

    #[test]
    fn new_session_is_paused_and_empty() {
        let s = Session::new(3, 4);

        assert!(!s.is_running());
        assert_eq!(s.generation(), 0);
        assert_eq!(s.board(), &Board::empty(3, 4));
    }

    #[test]
    fn tick_does_nothing_while_paused() {
        let mut s = blinker();
        let before = s.board().clone();

        assert!(!s.tick());
        assert_eq!(s.board(), &before);
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn tick_steps_while_running() {
        let mut s = blinker();
        let start = s.board().clone();

        s.start();
        assert!(s.tick());
        assert_ne!(s.board(), &start);
        assert!(s.tick());
        assert_eq!(s.board(), &start);
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn toggle_pauses() {
        let mut s = Session::new(3, 3);
        s.start();

        assert!(s.toggle(0, 0));
        assert!(!s.is_running());
        assert!(s.board().get(0, 0));
    }

    #[test]
    fn toggle_out_of_bounds_is_ignored() {
        let mut s = Session::new(3, 3);
        s.start();

        assert!(!s.toggle(3, 3));
        assert!(s.is_running());
    }

    #[test]
    fn clear_pauses_and_empties() {
        let mut s = blinker();
        s.start();
        s.tick();

        s.clear();

        assert!(!s.is_running());
        assert_eq!(s.board().population(), 0);
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn randomize_keeps_dimensions_and_running_state() {
        let mut s = Session::new(6, 9);
        s.start();

        s.randomize(&mut ChaCha8Rng::seed_from_u64(3));

        assert!(s.is_running());
        assert_eq!((s.rows(), s.cols()), (6, 9));
    }

    #[test]
    fn toggle_running() {
        let mut s = Session::new(1, 1);

        assert!(s.toggle_running());
        assert!(!s.toggle_running());
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        let mut s = blinker();

        let key = s.save(&mut store).unwrap();
        assert_eq!(key, "board5-5");

        let saved = s.board().clone();
        s.clear();
        s.load(&store).unwrap();

        assert_eq!(s.board(), &saved);
    }

    #[test]
    fn load_without_save() {
        let store = MemoryStore::new();
        let mut s = blinker();
        let before = s.board().clone();

        let err = s.load(&store).unwrap_err();

        assert!(matches!(err, SessionError::NoSavedBoard { rows: 5, cols: 5 }));
        assert_eq!(
            err.to_string(),
            "No board stored with current dimensions (5x5)"
        );
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn load_corrupt_entry() {
        let mut store = MemoryStore::new();
        store.set("board2-2", "true,true").unwrap();

        let mut s = Session::new(2, 2);
        let err = s.load(&store).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Decode(DecodeError::RowCount {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn strict_policy_rejects_quirky_tokens() {
        let mut store = MemoryStore::new();
        store.set("board1-2", "true,1").unwrap();

        let mut permissive = Session::new(1, 2);
        permissive.load(&store).unwrap();
        assert_eq!(permissive.board().population(), 2);

        let mut strict = Session::new(1, 2).with_policy(TokenPolicy::Strict);
        assert!(matches!(
            strict.load(&store),
            Err(SessionError::Decode(DecodeError::InvalidToken { .. }))
        ));
    }

    #[test]
    fn boards_of_other_dimensions_are_not_loaded() {
        let mut store = MemoryStore::new();
        Session::new(4, 4).save(&mut store).unwrap();

        let mut s = Session::new(4, 5);

        assert!(matches!(
            s.load(&store),
            Err(SessionError::NoSavedBoard { rows: 4, cols: 5 })
        ));
    }
}
