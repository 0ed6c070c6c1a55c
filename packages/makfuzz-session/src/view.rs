use makfuzz_domain::{
	Criterion, FileInfo, Language, PageRange, ResultsProjection, SearchSummary,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SessionState {
	#[default]
	Idle,
	Debouncing,
	InFlight,
	Error,
}
impl SessionState {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Debouncing => "debouncing",
			Self::InFlight => "in-flight",
			Self::Error => "error",
		}
	}
}

/// Snapshot of a session, published after every event it handles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionView {
	pub state: SessionState,
	pub file: Option<FileInfo>,
	pub criteria: Vec<Criterion>,
	pub selected_columns: Vec<usize>,
	pub threshold: f64,
	pub top_n: u32,
	pub language: Language,
	pub error: Option<String>,
	/// Highest sequence number issued so far.
	pub latest_seq: u64,
	/// Sequence number of the response currently displayed.
	pub applied_seq: Option<u64>,
	/// Responses dropped because a newer request superseded them.
	pub discarded: u64,
	pub summary: Option<SearchSummary>,
	pub current_page: usize,
	pub total_pages: usize,
	pub page_size: usize,
	pub showing: Option<PageRange>,
	pub projection: ResultsProjection,
}
