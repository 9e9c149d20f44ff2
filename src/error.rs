use thiserror::Error;

/// Failure modes of [`CellId::from_token`](crate::CellId::from_token).
///
/// Token parsing is the only fallible operation in the crate; everything else
/// clamps out-of-range inputs instead of rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token was the empty string.
    #[error("empty cell id token")]
    Empty,
    /// The token had more than 16 hex digits.
    #[error("cell id token longer than 16 digits ({0})")]
    TooLong(usize),
    /// The token contained a character that is not a hex digit.
    #[error("invalid digit {0:?} in cell id token")]
    InvalidDigit(char),
}
