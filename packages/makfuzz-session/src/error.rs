use makfuzz_domain::{ConfigurationInvalid, InvalidPattern, UnknownLanguage};

pub type Result<T, E = Error> = std::result::Result<T, E>;

const GENERIC_SEARCH_FAILURE: &str = "Search failed. Check that the backend is reachable.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	ConfigurationInvalid(#[from] ConfigurationInvalid),
	#[error(transparent)]
	InvalidPattern(#[from] InvalidPattern),
	#[error(transparent)]
	UnknownLanguage(#[from] UnknownLanguage),
	#[error("{message}")]
	Dispatch { message: String },
	#[error("{message}")]
	Export { message: String },
	#[error("{message}")]
	Upload { message: String },
	#[error("{message}")]
	Health { message: String },
	#[error("No file is loaded.")]
	NoFile,
	#[error("The search session has shut down.")]
	Closed,
}
impl Error {
	/// Uses the backend's own message when it sent one.
	pub fn dispatch(err: &makfuzz_providers::Error) -> Self {
		Self::Dispatch {
			message: err.backend_message().unwrap_or(GENERIC_SEARCH_FAILURE).to_string(),
		}
	}

	pub fn export(err: &makfuzz_providers::Error) -> Self {
		Self::Export { message: format!("Export failed: {}", provider_message(err)) }
	}

	pub fn upload(err: &makfuzz_providers::Error) -> Self {
		Self::Upload { message: format!("Upload failed: {}", provider_message(err)) }
	}

	pub fn health(err: &makfuzz_providers::Error) -> Self {
		Self::Health { message: format!("Backend unreachable: {}", provider_message(err)) }
	}
}

fn provider_message(err: &makfuzz_providers::Error) -> String {
	err.backend_message().map(str::to_string).unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dispatch_message_prefers_backend_payload() {
		let err = makfuzz_providers::Error::Status {
			status: 400,
			message: Some("Invalid regex in search term".to_string()),
		};

		assert_eq!(Error::dispatch(&err).to_string(), "Invalid regex in search term");

		let err = makfuzz_providers::Error::Status { status: 502, message: None };

		assert_eq!(Error::dispatch(&err).to_string(), GENERIC_SEARCH_FAILURE);
	}

	#[test]
	fn upload_message_falls_back_to_error_text() {
		let err = makfuzz_providers::Error::InvalidResponse {
			message: "File info response is malformed.".to_string(),
		};

		assert_eq!(
			Error::upload(&err).to_string(),
			"Upload failed: File info response is malformed."
		);
	}

	#[test]
	fn health_failure_is_not_a_search_failure() {
		let err = makfuzz_providers::Error::Status {
			status: 503,
			message: Some("Down".to_string()),
		};
		let err = Error::health(&err);

		assert!(matches!(err, Error::Health { .. }));
		assert_eq!(err.to_string(), "Backend unreachable: Down");
	}
}
