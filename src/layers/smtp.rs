//! SMTP Layer (commands, replies and message content)

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

const BODY_LIMIT: usize = 500;

/// SMTP traffic split into header lines and a bounded body preview.
#[derive(Debug, Default, Serialize)]
pub struct SMTP {
    headers: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    body: String,
}

impl SMTP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<SMTP>::default()
    }
}

impl Layer for SMTP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        let text = String::from_utf8_lossy(bytes);
        let lines: Vec<&str> = text.split("\r\n").collect();

        // headers run until the first blank line, the rest is message body
        let mut body_start = lines.len();
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                body_start = i + 1;
                break;
            }
            self.headers.push((*line).to_string());
        }

        if body_start < lines.len() {
            let body = lines[body_start..].join("\r\n");
            let trimmed = body.trim_end();
            self.body = trimmed.chars().take(BODY_LIMIT).collect();
        }

        Ok(Decoded::terminal(bytes.len()))
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }

    fn short_name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines_are_headers() {
        let mut smtp = SMTP::default();
        smtp.decode_bytes(b"EHLO client.example.com\r\nMAIL FROM:<a@b.c>\r\n")
            .unwrap();
        assert_eq!(smtp.headers.len(), 2);
        assert_eq!(smtp.headers[0], "EHLO client.example.com");
        assert!(smtp.body.is_empty());
    }

    #[test]
    fn body_follows_blank_line() {
        let mut smtp = SMTP::default();
        smtp.decode_bytes(b"Subject: hi\r\nFrom: a@b.c\r\n\r\nhello there\r\n")
            .unwrap();
        assert_eq!(smtp.headers, vec!["Subject: hi", "From: a@b.c"]);
        assert_eq!(smtp.body, "hello there");
    }

    #[test]
    fn body_is_bounded() {
        let mut payload = b"DATA\r\n\r\n".to_vec();
        payload.extend(std::iter::repeat(b'x').take(2000));

        let mut smtp = SMTP::default();
        smtp.decode_bytes(&payload).unwrap();
        assert_eq!(smtp.body.len(), BODY_LIMIT);
    }
}
