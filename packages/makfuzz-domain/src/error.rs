/// A REGEX criterion whose value does not compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid regex in search term \"{term}\": {reason}.")]
pub struct InvalidPattern {
	pub term: String,
	pub reason: String,
}

/// Reasons a configuration is held locally instead of being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationInvalid {
	#[error("At least one search term is required.")]
	NoActiveCriteria,
	#[error("At least one column must be selected.")]
	NoSelectedColumns,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language {0:?}; expected en or fr.")]
pub struct UnknownLanguage(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported matching type {0:?}; expected similarity, exact or regex.")]
pub struct UnknownMatchingType(pub String);
