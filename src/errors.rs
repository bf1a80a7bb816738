//! Error types

/// Errors returned by the decoders and the registry.
///
/// `TooShort` carries a hex dump of the offending bytes, which turns out to be
/// invaluable when a capture contains truncated frames. Decoders must return
/// one of these instead of letting a slice index escape.
#[derive(Debug, PartialEq)]
pub enum Error {
    TooShort {
        required: usize,
        available: usize,
        data: String,
    },
    ParseError(String),
    RegisterError(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TooShort {
                required,
                available,
                data,
            } => write!(
                f,
                "too short: {} bytes required, {} available (data: {})",
                required, available, data
            ),
            Error::ParseError(s) => write!(f, "parse error: {}", s),
            Error::RegisterError(s) => write!(f, "register error: {}", s),
        }
    }
}
