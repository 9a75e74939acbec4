//! Small helpers for walking a byte slice. Each one returns what it consumed along with what is
//! left over, so callers can thread the rest of the input through.

use std::str::FromStr;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of input, expected '{exp}'")]
    UnexpectedEof { exp: char },

    #[error("Expected '{exp}', but got '{got}'")]
    UnexpectedToken { exp: char, got: char },

    #[error("Expected \"{exp}\", but got \"{got}\"")]
    UnexpectedSlice { exp: String, got: String },
}

/// Consumes leading ascii whitespace, including line breaks.
pub fn take_ws(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Takes the next byte. If there is none, the slice is left as-is.
pub const fn take_1(bytes: &[u8]) -> (Option<u8>, &[u8]) {
    let [b, bytes @ ..] = bytes else {
        return (None, bytes);
    };

    (Some(*b), bytes)
}

/// Expects the next byte in `bytes` to be `b`, and consumes it.
pub fn expect(b: u8, bytes: &[u8]) -> ParseResult<&[u8]> {
    let (Some(a), rest) = take_1(bytes) else {
        return Err(ParseError::UnexpectedEof { exp: b as char });
    };

    if a != b {
        return Err(ParseError::UnexpectedToken {
            exp: b as char,
            got: a as char,
        });
    }

    Ok(rest)
}

/// Expects `bytes` to start with `bs`, compared ignoring ascii case, and consumes it.
pub fn expect_slice<'a>(bs: &[u8], bytes: &'a [u8]) -> ParseResult<&'a [u8]> {
    match bytes.split_at_checked(bs.len()) {
        Some((head, rest)) if head.eq_ignore_ascii_case(bs) => Ok(rest),
        _ => {
            let n = bs.len().min(bytes.len());

            Err(ParseError::UnexpectedSlice {
                exp: String::from_utf8_lossy(bs).to_string(),
                got: String::from_utf8_lossy(&bytes[..n]).to_string(),
            })
        }
    }
}

/// Advance the slice until `p` is satisfied, without consuming the byte that satisfied it. If `p`
/// is never satisfied, everything is taken.
///
/// Returns `None` if nothing was taken.
pub fn take_until_fn<P>(p: P, bytes: &[u8]) -> (Option<&[u8]>, &[u8])
where
    P: Fn(u8) -> bool,
{
    let i = bytes.iter().position(|&b| p(b)).unwrap_or(bytes.len());

    if i == 0 {
        return (None, bytes);
    }

    let (res, bytes) = bytes.split_at(i);

    (Some(res), bytes)
}

/// Takes everything up to the end of the line. The line break is consumed, but not returned. A
/// trailing `\r` is dropped as well.
pub fn take_line(bytes: &[u8]) -> (&[u8], &[u8]) {
    let (line, rest) = match bytes.iter().position(|&b| b == b'\n') {
        Some(i) => (&bytes[..i], &bytes[i + 1..]),
        None => (bytes, &bytes[bytes.len()..]),
    };

    let line = line.strip_suffix(b"\r").unwrap_or(line);

    (line, rest)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Invalid UTF-8 in \"{str}\"")]
    InvalidUtf8 { str: String },

    #[error("Failed to convert \"{str}\"")]
    ParseError { str: String },
}

/// Converts `&[u8]` to `T` if `T: FromStr`.
pub fn convert<T: FromStr>(bytes: &[u8]) -> Result<T, ConvertError> {
    let Ok(str) = std::str::from_utf8(bytes) else {
        return Err(ConvertError::InvalidUtf8 {
            str: String::from_utf8_lossy(bytes).to_string(),
        });
    };

    str.parse::<T>().map_err(|_| ConvertError::ParseError {
        str: str.to_string(),
    })
}
