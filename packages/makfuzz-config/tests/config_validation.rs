use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use makfuzz_config::Config;
use makfuzz_domain::MAX_TOP_N;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root
		.as_table_mut()
		.and_then(|root| root.get_mut(section))
		.and_then(Value::as_table_mut)
		.expect("Sample config must include the requested section.");

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("makfuzz_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> makfuzz_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = makfuzz_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.")
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = base_config();

	assert_eq!(cfg.backend.api_base, "http://127.0.0.1:8080/api/v1/fuzz");
	assert_eq!(cfg.session.language, "en");
	assert_eq!(cfg.pagination.page_sizes, vec![10, 100, 1_000, 10_000]);
	assert!(!cfg.session.retain_criteria);
	assert_eq!(cfg.export.output_dir, PathBuf::from("exports"));
}

#[test]
fn missing_file_reports_path() {
	let err = makfuzz_config::load(&PathBuf::from("/nonexistent/makfuzz.toml"))
		.expect_err("Expected read error.");

	assert!(err.to_string().contains("makfuzz.toml"), "Unexpected error: {err}");
}

#[test]
fn threshold_must_be_in_unit_range() {
	let payload = sample_toml_with("session", "threshold", Value::Float(1.5));
	let err = load_payload(payload).expect_err("Expected threshold validation error.");

	assert!(
		err.to_string().contains("session.threshold must be in the range 0.0-1.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn language_must_be_supported() {
	let payload = sample_toml_with("session", "language", Value::String("de".to_string()));
	let err = load_payload(payload).expect_err("Expected language validation error.");

	assert!(
		err.to_string().contains("session.language must be one of en or fr."),
		"Unexpected error: {err}"
	);
}

#[test]
fn debounce_must_be_positive() {
	let mut cfg = base_config();

	cfg.session.debounce_ms = 0;

	let err = makfuzz_config::validate(&cfg).expect_err("Expected debounce validation error.");

	assert!(
		err.to_string().contains("session.debounce_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn page_size_must_be_offered() {
	let mut cfg = base_config();

	cfg.pagination.page_size = 25;

	let err = makfuzz_config::validate(&cfg).expect_err("Expected page size validation error.");

	assert!(
		err.to_string().contains("pagination.page_size must be one of pagination.page_sizes."),
		"Unexpected error: {err}"
	);
}

#[test]
fn top_n_bounds_are_enforced() {
	let mut cfg = base_config();

	cfg.session.top_n = 0;

	assert!(makfuzz_config::validate(&cfg).is_err());

	cfg = base_config();
	cfg.session.top_n = MAX_TOP_N;
	cfg.export.top_n = MAX_TOP_N;

	assert!(makfuzz_config::validate(&cfg).is_ok());

	cfg.export.top_n = MAX_TOP_N + 1;

	let err = makfuzz_config::validate(&cfg).expect_err("Expected export top_n validation error.");

	assert_eq!(err.to_string(), "export.top_n must be in the range 1-100000.");
}

#[test]
fn default_headers_must_be_strings() {
	let mut cfg = base_config();

	cfg.backend.default_headers.insert("x-retries".to_string(), serde_json::json!(3));

	let err = makfuzz_config::validate(&cfg).expect_err("Expected header validation error.");

	assert!(
		err.to_string().contains("backend.default_headers.x-retries must be a string."),
		"Unexpected error: {err}"
	);
}
