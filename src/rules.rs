/// Rulestring of Conway's Game of Life, the only rule this crate simulates.
///
/// See: https://conwaylife.com/wiki/Rulestring
pub const B3S23: &str = "b3s23";

/// Number of neighbours that brings a dead cell to life.
const BIRTH: u8 = 3;

/// Number of neighbours that keeps a cell in whatever state it is in.
const STABLE: u8 = 2;

/// Compute the next state of a single cell given its current state and the number of live cells
/// in its Moore neighbourhood.
///
/// ```notrust
/// neighbours | next
/// -----------+---------------
///          2 | current state
///          3 | alive
///      other | dead
/// ```
pub const fn next_state(alive: bool, neighbours: u8) -> bool {
    match neighbours {
        STABLE => alive,
        BIRTH => true,
        _ => false,
    }
}

/// Check whether `rule` spells out B3/S23, in any of the notations found in the wild.
///
/// Accepted forms are `b3s23`, `b3/s23`, `23/3` (survival first, as in RLE `#r` lines), ignoring
/// ascii case and surrounding whitespace.
pub fn is_b3s23(rule: &str) -> bool {
    let rule = rule.trim().to_ascii_lowercase();

    let halves = if rule.starts_with('b') {
        rule.find('s').map(|i| rule.split_at(i))
    } else {
        rule.split_once('/').map(|(s, b)| (b, s))
    };

    let Some((b, s)) = halves else {
        return false;
    };

    // Digits may appear in any order, e.g. `b3/s32`
    digits(b) == [BIRTH] && digits(s) == [STABLE, BIRTH]
}

fn digits(s: &str) -> Vec<u8> {
    let mut ds: Vec<u8> = s
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    ds.sort_unstable();
    ds.dedup();
    ds
}
