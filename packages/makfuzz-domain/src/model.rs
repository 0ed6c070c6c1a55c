use serde::{Deserialize, Serialize};

/// A file the ingestion service has accepted. Immutable for the lifetime of a session.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
	pub file_id: String,
	pub file_name: String,
	pub headers: Vec<String>,
	pub total_rows: u64,
	pub file_size_bytes: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionMatch {
	#[serde(default)]
	pub matched_value: Option<String>,
	pub spelling_score: f64,
	pub phonetic_score: f64,
	pub score: f64,
	/// Negative when the criterion matched no cell.
	#[serde(default = "no_column")]
	pub column_index: i64,
}
impl CriterionMatch {
	pub fn column(&self) -> Option<usize> {
		usize::try_from(self.column_index).ok()
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
	pub total_score: f64,
	/// 1-based row number in the original file.
	#[serde(default)]
	pub line_index: u64,
	pub candidate_values: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raw_line: Option<String>,
	/// One entry per active criterion, in criterion order.
	#[serde(default)]
	pub criteria_matches: Vec<CriterionMatch>,
}
impl MatchResult {
	pub fn matches_column(&self, column: usize) -> bool {
		self.criteria_matches.iter().any(|m| m.column() == Some(column))
	}
}

/// One scoring-service answer. Results arrive ranked and are never re-sorted client side.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub results: Vec<MatchResult>,
	pub total_found: u64,
	pub total_results: u64,
	pub max_under_threshold: f64,
	pub min_above_threshold: f64,
	pub max_above_threshold: f64,
	pub search_time_ms: u64,
}

fn no_column() -> i64 {
	-1
}
