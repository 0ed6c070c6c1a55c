pub mod export;
pub mod health;
pub mod ingestion;
pub mod scoring;

mod error;

pub use error::{Error, Result};
pub use export::ExportFormat;

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

use makfuzz_config::Backend;

const MAX_TEXT_MESSAGE_LEN: usize = 200;

pub fn default_headers(default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Extracts a human-readable message from a failure body.
///
/// JSON bodies contribute their `message` or `error` string. Short plain-text bodies are used
/// as is. Anything else yields `None`.
pub fn failure_message(body: &str) -> Option<String> {
	let trimmed = body.trim();

	if trimmed.is_empty() {
		return None;
	}
	if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
		return ["message", "error"]
			.iter()
			.filter_map(|key| json.get(key).and_then(Value::as_str))
			.map(str::trim)
			.find(|message| !message.is_empty())
			.map(str::to_string);
	}
	if trimmed.starts_with('<') || trimmed.len() > MAX_TEXT_MESSAGE_LEN {
		return None;
	}

	Some(trimmed.to_string())
}

pub(crate) fn client(cfg: &Backend) -> Result<Client> {
	Ok(Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.default_headers(default_headers(&cfg.default_headers)?)
		.build()?)
}

pub(crate) fn endpoint(cfg: &Backend, path: &str) -> String {
	format!("{}{}", cfg.api_base, path)
}

pub(crate) async fn ensure_success(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();

	Err(Error::Status { status: status.as_u16(), message: failure_message(&body) })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefers_json_message_field() {
		let body = r#"{"message":"Search failed: Invalid regex in search term","error":"Bad"}"#;

		assert_eq!(
			failure_message(body).as_deref(),
			Some("Search failed: Invalid regex in search term")
		);
		assert_eq!(failure_message(r#"{"error":"File not found"}"#).as_deref(), Some("File not found"));
		assert_eq!(failure_message(r#"{"status":500}"#), None);
	}

	#[test]
	fn accepts_short_plain_text_only() {
		assert_eq!(failure_message(" Gateway down \n").as_deref(), Some("Gateway down"));
		assert_eq!(failure_message("<html><body>502</body></html>"), None);
		assert_eq!(failure_message(&"x".repeat(500)), None);
		assert_eq!(failure_message("   "), None);
	}
}
