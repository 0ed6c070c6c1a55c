use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
	criterion::{Criterion, CriterionField, MatchingType},
	error::{ConfigurationInvalid, InvalidPattern, UnknownLanguage},
};

pub const MAX_TOP_N: u32 = 100_000;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
	#[default]
	En,
	Fr,
}
impl Language {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::En => "en",
			Self::Fr => "fr",
		}
	}
}
impl FromStr for Language {
	type Err = UnknownLanguage;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"en" => Ok(Self::En),
			"fr" => Ok(Self::Fr),
			_ => Err(UnknownLanguage(raw.to_string())),
		}
	}
}
impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The body sent to the scoring and export endpoints.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	pub criterias: Vec<Criterion>,
	pub search_column_indexes: Vec<usize>,
	pub threshold: f64,
	pub top_n: u32,
	pub language: Language,
}

/// Everything the user tunes for one search session.
///
/// The criteria list is never empty and selected columns always lie within
/// `0..column_count`. Column order carries no meaning, so the set is kept sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfiguration {
	criteria: Vec<Criterion>,
	columns: BTreeSet<usize>,
	column_count: usize,
	threshold: f64,
	top_n: u32,
	language: Language,
}
impl SearchConfiguration {
	pub fn new(threshold: f64, top_n: u32, language: Language) -> Self {
		let mut cfg = Self {
			criteria: vec![Criterion::default()],
			columns: BTreeSet::new(),
			column_count: 0,
			threshold: 0.0,
			top_n: 1,
			language,
		};

		cfg.set_threshold(threshold);
		cfg.set_top_n(top_n);

		cfg
	}

	/// Rebuilds the configuration for a newly loaded file with `column_count` columns.
	///
	/// Every column is selected. Threshold, result cap and language carry over. Criteria are
	/// reset to a single empty criterion unless `retain_criteria` is set.
	pub fn reset_for_file(&mut self, column_count: usize, retain_criteria: bool) {
		self.column_count = column_count;
		self.columns = (0..column_count).collect();

		if !retain_criteria {
			self.criteria = vec![Criterion::default()];
		}
	}

	pub fn clear_file(&mut self) {
		self.column_count = 0;
		self.columns.clear();
	}

	pub fn criteria(&self) -> &[Criterion] {
		&self.criteria
	}

	pub fn active_criteria(&self) -> impl Iterator<Item = &Criterion> {
		self.criteria.iter().filter(|criterion| criterion.is_active())
	}

	pub fn active_count(&self) -> usize {
		self.active_criteria().count()
	}

	pub fn selected_columns(&self) -> &BTreeSet<usize> {
		&self.columns
	}

	pub fn column_count(&self) -> usize {
		self.column_count
	}

	pub fn threshold(&self) -> f64 {
		self.threshold
	}

	pub fn top_n(&self) -> u32 {
		self.top_n
	}

	pub fn language(&self) -> Language {
		self.language
	}

	pub fn add_criterion(&mut self) {
		self.criteria.push(Criterion::default());
	}

	/// Removing the last criterion leaves one fresh default criterion in its place.
	pub fn remove_criterion(&mut self, index: usize) -> bool {
		if index >= self.criteria.len() {
			return false;
		}

		self.criteria.remove(index);

		if self.criteria.is_empty() {
			self.criteria.push(Criterion::default());
		}

		true
	}

	pub fn update_criterion(&mut self, index: usize, field: CriterionField, raw: &str) -> bool {
		let Some(criterion) = self.criteria.get_mut(index) else {
			return false;
		};

		*criterion = criterion.update(field, raw);

		true
	}

	pub fn set_matching_type(&mut self, index: usize, matching_type: MatchingType) -> bool {
		let Some(criterion) = self.criteria.get_mut(index) else {
			return false;
		};

		*criterion = criterion.with_matching_type(matching_type);

		true
	}

	/// Flips column `index` in or out of the selection and reports whether it is now selected.
	/// Indices past the file's last column are ignored.
	pub fn toggle_column(&mut self, index: usize) -> Option<bool> {
		if index >= self.column_count {
			return None;
		}
		if self.columns.remove(&index) {
			return Some(false);
		}

		self.columns.insert(index);

		Some(true)
	}

	/// Non-finite input is ignored; anything else is clamped to [0, 1].
	pub fn set_threshold(&mut self, threshold: f64) -> bool {
		if !threshold.is_finite() {
			return false;
		}

		self.threshold = threshold.clamp(0.0, 1.0);

		true
	}

	/// Accepts a whole percentage as typed. Input that does not parse leaves the threshold alone.
	pub fn set_threshold_percent(&mut self, raw: &str) -> bool {
		let Ok(percent) = raw.trim().parse::<f64>() else {
			return false;
		};

		if !percent.is_finite() {
			return false;
		}

		self.set_threshold(percent.trunc().clamp(0.0, 100.0) / 100.0)
	}

	pub fn threshold_percent(&self) -> u32 {
		(self.threshold * 100.0).round() as u32
	}

	pub fn set_top_n(&mut self, top_n: u32) {
		self.top_n = top_n.clamp(1, MAX_TOP_N);
	}

	pub fn set_language(&mut self, language: Language) {
		self.language = language;
	}

	pub fn check_dispatchable(&self) -> Result<(), ConfigurationInvalid> {
		if self.active_criteria().next().is_none() {
			return Err(ConfigurationInvalid::NoActiveCriteria);
		}
		if self.columns.is_empty() {
			return Err(ConfigurationInvalid::NoSelectedColumns);
		}

		Ok(())
	}

	/// Reports the first active criterion whose pattern does not compile. A single bad pattern
	/// blocks the whole request.
	pub fn validate_patterns(&self) -> Result<(), InvalidPattern> {
		self.active_criteria().try_for_each(Criterion::validate)
	}

	pub fn to_request(&self) -> SearchRequest {
		self.to_request_with_top_n(self.top_n)
	}

	/// Builds the wire request with only active criteria and ascending column indices.
	pub fn to_request_with_top_n(&self, top_n: u32) -> SearchRequest {
		SearchRequest {
			criterias: self.active_criteria().cloned().collect(),
			search_column_indexes: self.columns.iter().copied().collect(),
			threshold: self.threshold,
			top_n: top_n.clamp(1, MAX_TOP_N),
			language: self.language,
		}
	}
}
