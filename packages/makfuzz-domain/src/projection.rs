//! Render-ready view of a page of results.
//!
//! Nothing here filters or reorders rows. The projection mirrors the ranking of the
//! [`SearchResponse`] it was built from.

use crate::model::{CriterionMatch, MatchResult, SearchResponse};

const EMPTY_CELL: &str = "-";

/// Presentation bucket for a score in [0, 1].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScoreTier {
	High,
	Medium,
	Low,
}
impl ScoreTier {
	pub fn of(score: f64) -> Self {
		if score >= 0.8 {
			Self::High
		} else if score >= 0.5 {
			Self::Medium
		} else {
			Self::Low
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::High => "high",
			Self::Medium => "medium",
			Self::Low => "low",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedCell {
	pub column: usize,
	pub value: String,
	/// Set when some criterion in the row matched in this column.
	pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedMatch {
	pub matched_value: String,
	pub spelling: String,
	pub spelling_tier: ScoreTier,
	pub phonetic: String,
	pub phonetic_tier: ScoreTier,
	pub column: Option<usize>,
}
impl ProjectedMatch {
	fn from_match(criterion_match: &CriterionMatch) -> Self {
		Self {
			matched_value: non_empty(criterion_match.matched_value.as_deref()),
			spelling: row_percent(criterion_match.spelling_score),
			spelling_tier: ScoreTier::of(criterion_match.spelling_score),
			phonetic: row_percent(criterion_match.phonetic_score),
			phonetic_tier: ScoreTier::of(criterion_match.phonetic_score),
			column: criterion_match.column(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedRow {
	pub line_index: u64,
	pub score: String,
	pub tier: ScoreTier,
	/// One group per active criterion, in criterion order.
	pub matches: Vec<ProjectedMatch>,
	/// One cell per header column.
	pub cells: Vec<ProjectedCell>,
}
impl ProjectedRow {
	fn from_result(result: &MatchResult, column_count: usize) -> Self {
		let cells = (0..column_count)
			.map(|column| ProjectedCell {
				column,
				value: non_empty(result.candidate_values.get(column).map(String::as_str)),
				highlighted: result.matches_column(column),
			})
			.collect();

		Self {
			line_index: result.line_index,
			score: row_percent(result.total_score),
			tier: ScoreTier::of(result.total_score),
			matches: result.criteria_matches.iter().map(ProjectedMatch::from_match).collect(),
			cells,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsProjection {
	pub headers: Vec<String>,
	/// "Criterion n" labels for the criteria column groups.
	pub criteria_labels: Vec<String>,
	pub rows: Vec<ProjectedRow>,
}
impl ResultsProjection {
	/// Projects one page of results. `criteria_count` is the number of active criteria the
	/// results were produced with.
	pub fn project(headers: &[String], criteria_count: usize, page: &[MatchResult]) -> Self {
		Self {
			headers: headers.to_vec(),
			criteria_labels: (1..=criteria_count).map(|n| format!("Criterion {n}")).collect(),
			rows: page.iter().map(|result| ProjectedRow::from_result(result, headers.len())).collect(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}

/// Headline figures for an accepted response.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSummary {
	pub total_found: u64,
	pub total_results: u64,
	pub match_rate: f64,
	pub best_match: f64,
	pub minimum_match: f64,
	pub near_miss: f64,
	pub search_time_ms: u64,
}
impl SearchSummary {
	pub fn from_response(response: &SearchResponse) -> Self {
		let match_rate = if response.total_results == 0 {
			0.0
		} else {
			response.total_found as f64 / response.total_results as f64 * 100.0
		};

		Self {
			total_found: response.total_found,
			total_results: response.total_results,
			match_rate,
			best_match: response.max_above_threshold,
			minimum_match: response.min_above_threshold,
			near_miss: response.max_under_threshold,
			search_time_ms: response.search_time_ms,
		}
	}

	pub fn match_rate_label(&self) -> String {
		format!("{:.1}%", self.match_rate)
	}

	pub fn best_match_label(&self) -> String {
		summary_percent(self.best_match)
	}

	pub fn minimum_match_label(&self) -> String {
		summary_percent(self.minimum_match)
	}

	pub fn near_miss_label(&self) -> String {
		summary_percent(self.near_miss)
	}
}

pub fn row_percent(score: f64) -> String {
	format!("{:.1}%", score * 100.0)
}

pub fn summary_percent(score: f64) -> String {
	format!("{:.2}%", score * 100.0)
}

/// Human-readable byte size, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
	const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

	let mut size = bytes as f64;
	let mut unit = 0;

	while size >= 1024.0 && unit < UNITS.len() - 1 {
		size /= 1024.0;
		unit += 1;
	}

	if unit == 0 { format!("{bytes} B") } else { format!("{:.1} {}", size, UNITS[unit]) }
}

fn non_empty(value: Option<&str>) -> String {
	match value {
		Some(value) if !value.trim().is_empty() => value.to_string(),
		_ => EMPTY_CELL.to_string(),
	}
}
