use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub session: Session,
	pub pagination: Pagination,
	pub export: Export,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	/// Base URL of the fuzzy-matching API, e.g. "http://127.0.0.1:8080/api/v1/fuzz".
	pub api_base: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
	/// Quiet period after the last continuous edit before a search is dispatched.
	pub debounce_ms: u64,
	pub threshold: f64,
	pub top_n: u32,
	/// Either "en" or "fr".
	pub language: String,
	/// Keep the criteria list when a new file is loaded instead of resetting it.
	#[serde(default)]
	pub retain_criteria: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
	pub page_size: usize,
	#[serde(default = "default_page_sizes")]
	pub page_sizes: Vec<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
	pub top_n: u32,
	#[serde(default = "default_output_dir")]
	pub output_dir: PathBuf,
}

fn default_page_sizes() -> Vec<usize> {
	vec![10, 100, 1_000, 10_000]
}

fn default_output_dir() -> PathBuf {
	PathBuf::from(".")
}
