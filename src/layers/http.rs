//! HTTP Layer (line-oriented, requests and responses)

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::Error;
use crate::layer::{Decoded, Layer};

const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"];

// Bodies are previews, not transfers; anything beyond this is cut off.
const BODY_PREVIEW_LIMIT: usize = 200_usize;

/// One HTTP message: the classified start line, folded headers and a bounded body preview.
#[derive(Debug, Default, Serialize)]
pub struct HTTP {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    headers: Map<String, Value>,
    body: String,
}

impl HTTP {
    pub fn creator() -> Box<dyn Layer + Send> {
        Box::<HTTP>::default()
    }
}

impl Layer for HTTP {
    fn decode_bytes(&mut self, bytes: &[u8]) -> Result<Decoded, Error> {
        let text = String::from_utf8_lossy(bytes);
        let lines: Vec<&str> = text.split("\r\n").collect();
        let first = lines.first().copied().unwrap_or("");

        if HTTP_METHODS
            .iter()
            .any(|m| first.starts_with(m) && first[m.len()..].starts_with(' '))
        {
            let mut parts = first.split_whitespace();
            self.kind = "request".to_string();
            self.method = parts.next().map(str::to_string);
            self.path = Some(parts.next().unwrap_or("/").to_string());
            self.version = Some(parts.next().unwrap_or("HTTP/1.1").to_string());
        } else if first.starts_with("HTTP/") {
            let mut parts = first.split_whitespace();
            self.kind = "response".to_string();
            self.version = parts.next().map(str::to_string);
            self.status_code = Some(parts.next().unwrap_or("0").to_string());
            self.reason = Some(parts.collect::<Vec<_>>().join(" "));
        } else {
            // not HTTP after all, keep the layer but classify nothing
            self.kind = "unknown".to_string();
            return Ok(Decoded::terminal(bytes.len()));
        }

        // fold header lines up to the first blank one, the rest is body
        let mut i = 1_usize;
        while i < lines.len() && !lines[i].is_empty() {
            if let Some((key, value)) = lines[i].split_once(':') {
                self.headers
                    .insert(key.trim().to_string(), json!(value.trim()));
            }
            i += 1;
        }
        let body = lines.get(i + 1..).unwrap_or(&[]).join("\n");
        self.body = body.chars().take(BODY_PREVIEW_LIMIT).collect();

        Ok(Decoded::terminal(bytes.len()))
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }

    fn short_name(&self) -> &'static str {
        "http"
    }
}
