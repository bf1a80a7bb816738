//! POP3 Layer

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

/// POP3 traffic: server status taken from the first line plus all lines.
#[derive(Debug, Default, Serialize)]
pub struct POP3 {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    lines: Vec<String>,
}

impl POP3 {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<POP3>::default()
    }
}

impl Layer for POP3 {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        let text = String::from_utf8_lossy(bytes);

        self.lines = text
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        if let Some(first) = self.lines.first() {
            self.status = if first.starts_with("+OK") {
                Some("OK")
            } else if first.starts_with("-ERR") {
                Some("ERROR")
            } else {
                Some("Unknown")
            };
        }

        Ok(Decoded::terminal(bytes.len()))
    }

    fn name(&self) -> &'static str {
        "POP3"
    }

    fn short_name(&self) -> &'static str {
        "pop3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status() {
        let mut pop = POP3::default();
        pop.decode_bytes(b"+OK 2 messages\r\n").unwrap();
        assert_eq!(pop.status, Some("OK"));
    }

    #[test]
    fn err_status() {
        let mut pop = POP3::default();
        pop.decode_bytes(b"-ERR no such message\r\n").unwrap();
        assert_eq!(pop.status, Some("ERROR"));
    }

    #[test]
    fn client_command_is_unknown_status() {
        let mut pop = POP3::default();
        pop.decode_bytes(b"RETR 1\r\n").unwrap();
        assert_eq!(pop.status, Some("Unknown"));
        assert_eq!(pop.lines, vec!["RETR 1"]);
    }
}
