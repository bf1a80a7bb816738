//! IMAP Layer

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

/// IMAP traffic rendered as its tagged command and response lines.
#[derive(Debug, Default, Serialize)]
pub struct IMAP {
    lines: Vec<String>,
}

impl IMAP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<IMAP>::default()
    }
}

impl Layer for IMAP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        let text = String::from_utf8_lossy(bytes);

        self.lines = text
            .split("\r\n")
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Decoded::terminal(bytes.len()))
    }

    fn name(&self) -> &'static str {
        "IMAP"
    }

    fn short_name(&self) -> &'static str {
        "imap"
    }
}
