mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, Export, Pagination, Service, Session};

use std::{fs, path::Path};

use makfuzz_domain::{Language, MAX_TOP_N};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.backend.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "backend.api_base must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.api_base.starts_with("http://") && !cfg.backend.api_base.starts_with("https://")
	{
		return Err(Error::Validation {
			message: "backend.api_base must be an http or https URL.".to_string(),
		});
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.backend.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("backend.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.session.debounce_ms == 0 {
		return Err(Error::Validation {
			message: "session.debounce_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.session.threshold.is_finite() {
		return Err(Error::Validation {
			message: "session.threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.session.threshold) {
		return Err(Error::Validation {
			message: "session.threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.session.top_n == 0 || cfg.session.top_n > MAX_TOP_N {
		return Err(Error::Validation {
			message: format!("session.top_n must be in the range 1-{MAX_TOP_N}."),
		});
	}
	if cfg.session.language.parse::<Language>().is_err() {
		return Err(Error::Validation {
			message: "session.language must be one of en or fr.".to_string(),
		});
	}
	if cfg.pagination.page_sizes.is_empty() {
		return Err(Error::Validation {
			message: "pagination.page_sizes must be non-empty.".to_string(),
		});
	}
	if cfg.pagination.page_sizes.contains(&0) {
		return Err(Error::Validation {
			message: "pagination.page_sizes must only contain values greater than zero."
				.to_string(),
		});
	}
	if !cfg.pagination.page_sizes.contains(&cfg.pagination.page_size) {
		return Err(Error::Validation {
			message: "pagination.page_size must be one of pagination.page_sizes.".to_string(),
		});
	}
	if cfg.export.top_n == 0 || cfg.export.top_n > MAX_TOP_N {
		return Err(Error::Validation {
			message: format!("export.top_n must be in the range 1-{MAX_TOP_N}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.backend.api_base.trim().trim_end_matches('/');

	if trimmed.len() != cfg.backend.api_base.len() {
		cfg.backend.api_base = trimmed.to_string();
	}

	cfg.session.language = cfg.session.language.trim().to_ascii_lowercase();

	cfg.pagination.page_sizes.sort_unstable();
	cfg.pagination.page_sizes.dedup();
}
