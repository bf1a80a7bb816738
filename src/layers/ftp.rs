//! FTP control-channel Layer (plain-text commands and numeric responses)

use serde::Serialize;

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

const FTP_COMMANDS: [&str; 12] = [
    "USER", "PASS", "LIST", "RETR", "STOR", "PWD", "CWD", "QUIT", "TYPE", "PORT", "PASV", "SYST",
];

/// One classified control-channel line.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum FtpLine {
    #[serde(rename = "command")]
    Command { command: String, raw: String },
    #[serde(rename = "response")]
    Response { code: String, message: String },
    #[serde(rename = "unknown")]
    Unknown { raw: String },
}

impl FtpLine {
    fn classify(line: &str) -> Self {
        let upper = line.to_ascii_uppercase();
        for cmd in FTP_COMMANDS.iter() {
            if upper.starts_with(cmd) {
                return FtpLine::Command {
                    command: (*cmd).to_string(),
                    raw: line.to_string(),
                };
            }
        }

        // numeric responses: "220 Service ready", "331 User name okay". Checking the raw bytes
        // keeps a lossy-decoded multi-byte char from landing under the slice index.
        let bytes = line.as_bytes();
        if bytes.len() >= 3 && bytes[..3].iter().all(u8::is_ascii_digit) {
            return FtpLine::Response {
                code: line[..3].to_string(),
                message: line.get(4..).unwrap_or("").to_string(),
            };
        }

        FtpLine::Unknown {
            raw: line.to_string(),
        }
    }
}

/// FTP control traffic: the raw lines plus their classification.
#[derive(Debug, Default, Serialize)]
pub struct FTP {
    lines: Vec<String>,
    parsed: Vec<FtpLine>,
}

impl FTP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<FTP>::default()
    }
}

impl Layer for FTP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        let text = String::from_utf8_lossy(bytes);

        self.lines = text
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        self.parsed = self.lines.iter().map(|l| FtpLine::classify(l)).collect();

        Ok(Decoded::terminal(bytes.len()))
    }

    fn name(&self) -> &'static str {
        "FTP"
    }

    fn short_name(&self) -> &'static str {
        "ftp"
    }
}
