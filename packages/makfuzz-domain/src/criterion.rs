use std::{fmt, str::FromStr};

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidPattern, UnknownMatchingType};

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingType {
	#[default]
	Similarity,
	Exact,
	Regex,
}
impl MatchingType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Similarity => "SIMILARITY",
			Self::Exact => "EXACT",
			Self::Regex => "REGEX",
		}
	}
}
impl FromStr for MatchingType {
	type Err = UnknownMatchingType;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_uppercase().as_str() {
			"SIMILARITY" => Ok(Self::Similarity),
			"EXACT" => Ok(Self::Exact),
			"REGEX" => Ok(Self::Regex),
			_ => Err(UnknownMatchingType(raw.to_string())),
		}
	}
}
impl fmt::Display for MatchingType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Text-valued criterion fields. Edits to any of them are continuous edits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CriterionField {
	Value,
	SpellingWeight,
	PhoneticWeight,
	/// Entered as a percentage, stored as a fraction.
	MinSpellingScore,
	/// Entered as a percentage, stored as a fraction.
	MinPhoneticScore,
}

/// One weighted match rule.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
	pub value: String,
	pub spelling_weight: f64,
	pub phonetic_weight: f64,
	pub min_spelling_score: f64,
	pub min_phonetic_score: f64,
	pub matching_type: MatchingType,
}
impl Criterion {
	pub fn new(value: impl Into<String>) -> Self {
		Self { value: value.into(), ..Self::default() }
	}

	pub fn is_active(&self) -> bool {
		!self.value.trim().is_empty()
	}

	/// Returns a copy with `field` set from raw user input.
	///
	/// Numeric input never fails: anything that does not parse as a finite number becomes 0.
	/// Weights are clamped to be non-negative and minimum scores are read as percentages and
	/// clamped to [0, 1].
	pub fn update(&self, field: CriterionField, raw: &str) -> Self {
		let mut next = self.clone();

		match field {
			CriterionField::Value => next.value = raw.to_string(),
			CriterionField::SpellingWeight => next.spelling_weight = coerce_weight(raw),
			CriterionField::PhoneticWeight => next.phonetic_weight = coerce_weight(raw),
			CriterionField::MinSpellingScore => next.min_spelling_score = coerce_min_score(raw),
			CriterionField::MinPhoneticScore => next.min_phonetic_score = coerce_min_score(raw),
		}

		next
	}

	pub fn with_matching_type(&self, matching_type: MatchingType) -> Self {
		Self { matching_type, ..self.clone() }
	}

	/// Only active REGEX criteria are checked; the other types have nothing to compile.
	///
	/// Terms use the scoring service's backtracking dialect: look-around and backreferences
	/// compile.
	pub fn validate(&self) -> Result<(), InvalidPattern> {
		if self.matching_type != MatchingType::Regex || !self.is_active() {
			return Ok(());
		}

		Regex::new(&self.value)
			.map(|_| ())
			.map_err(|err| InvalidPattern { term: self.value.clone(), reason: regex_reason(&err) })
	}

	pub fn min_spelling_percent(&self) -> u32 {
		to_percent(self.min_spelling_score)
	}

	pub fn min_phonetic_percent(&self) -> u32 {
		to_percent(self.min_phonetic_score)
	}
}
impl Default for Criterion {
	fn default() -> Self {
		Self {
			value: String::new(),
			spelling_weight: DEFAULT_WEIGHT,
			phonetic_weight: DEFAULT_WEIGHT,
			min_spelling_score: 0.0,
			min_phonetic_score: 0.0,
			matching_type: MatchingType::Similarity,
		}
	}
}

fn coerce_number(raw: &str) -> f64 {
	raw.trim().parse::<f64>().ok().filter(|value| value.is_finite()).unwrap_or(0.0)
}

fn coerce_weight(raw: &str) -> f64 {
	coerce_number(raw).max(0.0)
}

fn coerce_min_score(raw: &str) -> f64 {
	(coerce_number(raw) / 100.0).clamp(0.0, 1.0)
}

fn to_percent(fraction: f64) -> u32 {
	(fraction * 100.0).round() as u32
}

// The syntax error renders the pattern with a caret; only the final line is useful in a
// one-line message.
fn regex_reason(err: &fancy_regex::Error) -> String {
	let rendered = err.to_string();
	let last = rendered.lines().last().unwrap_or_default().trim();

	last.strip_prefix("error: ").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_criterion_is_inactive_similarity() {
		let criterion = Criterion::default();

		assert!(!criterion.is_active());
		assert_eq!(criterion.spelling_weight, 1.0);
		assert_eq!(criterion.phonetic_weight, 1.0);
		assert_eq!(criterion.min_spelling_score, 0.0);
		assert_eq!(criterion.min_phonetic_score, 0.0);
		assert_eq!(criterion.matching_type, MatchingType::Similarity);
	}

	#[test]
	fn whitespace_only_value_is_inactive() {
		assert!(!Criterion::new("   \t").is_active());
		assert!(Criterion::new(" a ").is_active());
	}

	#[test]
	fn weights_clamp_to_non_negative() {
		let criterion = Criterion::default();

		assert_eq!(criterion.update(CriterionField::SpellingWeight, "2.5").spelling_weight, 2.5);
		assert_eq!(criterion.update(CriterionField::PhoneticWeight, "-3").phonetic_weight, 0.0);
	}

	#[test]
	fn malformed_numbers_coerce_to_zero() {
		let criterion = Criterion::default();

		assert_eq!(criterion.update(CriterionField::SpellingWeight, "abc").spelling_weight, 0.0);
		assert_eq!(criterion.update(CriterionField::SpellingWeight, "").spelling_weight, 0.0);
		assert_eq!(criterion.update(CriterionField::PhoneticWeight, "inf").phonetic_weight, 0.0);
		assert_eq!(
			criterion.update(CriterionField::MinSpellingScore, "NaN").min_spelling_score,
			0.0
		);
	}

	#[test]
	fn min_scores_are_percentages() {
		let criterion = Criterion::default();
		let updated = criterion.update(CriterionField::MinSpellingScore, "85");

		assert!((updated.min_spelling_score - 0.85).abs() < 1e-9);
		assert_eq!(updated.min_spelling_percent(), 85);
		assert_eq!(
			criterion.update(CriterionField::MinPhoneticScore, "150").min_phonetic_score,
			1.0
		);
		assert_eq!(
			criterion.update(CriterionField::MinPhoneticScore, "-5").min_phonetic_score,
			0.0
		);
	}

	#[test]
	fn update_leaves_source_untouched() {
		let criterion = Criterion::new("smith");
		let updated = criterion.update(CriterionField::Value, "smyth");

		assert_eq!(criterion.value, "smith");
		assert_eq!(updated.value, "smyth");
	}

	#[test]
	fn unclosed_class_fails_regex_validation() {
		let criterion = Criterion::new("[").with_matching_type(MatchingType::Regex);
		let err = criterion.validate().expect_err("Expected invalid pattern.");

		assert_eq!(err.term, "[");
		assert!(!err.reason.is_empty());
		assert!(err.to_string().contains("\"[\""), "Unexpected message: {err}");
	}

	#[test]
	fn anchored_pattern_passes_regex_validation() {
		let criterion = Criterion::new("^A.*").with_matching_type(MatchingType::Regex);

		assert!(criterion.validate().is_ok());
	}

	#[test]
	fn backtracking_constructs_pass_regex_validation() {
		for term in ["^(?!Jean).*", "(?<=M)artin", "(a)\\1", "(?i)dupont"] {
			let criterion = Criterion::new(term).with_matching_type(MatchingType::Regex);

			assert!(criterion.validate().is_ok(), "Rejected {term:?}.");
		}
	}

	#[test]
	fn malformed_patterns_still_fail_regex_validation() {
		for term in ["[", "(unclosed"] {
			let criterion = Criterion::new(term).with_matching_type(MatchingType::Regex);
			let err = criterion.validate().expect_err("Expected invalid pattern.");

			assert_eq!(err.term, term);
		}
	}

	#[test]
	fn only_regex_type_is_compiled() {
		assert!(Criterion::new("[").validate().is_ok());
		assert!(Criterion::new("[").with_matching_type(MatchingType::Exact).validate().is_ok());
		assert!(Criterion::default().with_matching_type(MatchingType::Regex).validate().is_ok());
	}

	#[test]
	fn matching_type_parses_any_case() {
		assert_eq!("regex".parse::<MatchingType>(), Ok(MatchingType::Regex));
		assert_eq!(" Exact ".parse::<MatchingType>(), Ok(MatchingType::Exact));
		assert!("fuzzy".parse::<MatchingType>().is_err());
	}

	#[test]
	fn serializes_with_wire_names() {
		let json = serde_json::to_value(Criterion::new("x").with_matching_type(MatchingType::Exact))
			.expect("Failed to serialize criterion.");

		assert_eq!(json["value"], "x");
		assert_eq!(json["spellingWeight"], 1.0);
		assert_eq!(json["minPhoneticScore"], 0.0);
		assert_eq!(json["matchingType"], "EXACT");
	}
}
