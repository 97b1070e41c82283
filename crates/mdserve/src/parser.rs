//! Parses the plain-text wire protocol: `get <message> <delay_ms>\n`.
//!
//! Tokenization is a straight split on ASCII spaces into exactly three
//! fields — a literal `get`, the message to digest, and a delay in
//! milliseconds. Anything else (wrong field count, wrong verb, a
//! non-numeric delay) is rejected as a single `ParseError::Invalid`; the
//! original protocol does not distinguish which field was wrong, only
//! that the request as a whole is invalid.

use std::fmt;

/// A successfully parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub message: String,
    pub delay_ms: u64,
}

/// Why a raw request line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Field count, verb, or delay field did not match the protocol.
    Invalid,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request")
    }
}

impl std::error::Error for ParseError {}

/// Parses a single request line.
///
/// `line` should have its trailing newline already stripped by the caller;
/// leading/trailing whitespace around the whole line is tolerated, but
/// internal whitespace is taken literally as the field separator.
pub fn parse(line: &str) -> Result<Request, ParseError> {
    let mut fields = line.trim_end_matches(['\r', '\n']).split(' ');

    let verb = fields.next().ok_or(ParseError::Invalid)?;
    let message = fields.next().ok_or(ParseError::Invalid)?;
    let delay = fields.next().ok_or(ParseError::Invalid)?;

    if fields.next().is_some() {
        return Err(ParseError::Invalid);
    }
    if verb != "get" || message.is_empty() {
        return Err(ParseError::Invalid);
    }

    let delay_ms = delay.parse::<u64>().map_err(|_| ParseError::Invalid)?;

    Ok(Request {
        message: message.to_owned(),
        delay_ms,
    })
}
