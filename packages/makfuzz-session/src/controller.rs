//! Synchronous core of a search session.
//!
//! The controller owns the configuration, the latest accepted response, and the pagination
//! window. It never performs I/O. Each entry point returns an [`Effect`] that the driver carries
//! out, and results come back through [`SessionController::complete`] tagged with the sequence
//! number they were issued under.

use std::time::Duration;

use makfuzz_domain::{
	CriterionField, FileInfo, Language, MatchingType, PaginationWindow, ResultsProjection,
	SearchConfiguration, SearchRequest, SearchResponse, SearchSummary,
};

use crate::{
	DispatchDecision, EditKind, Error, Result, SessionSettings, SessionState, SessionView,
	dispatch_policy,
};

/// A search request ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
	pub seq: u64,
	pub file_id: String,
	pub request: SearchRequest,
}

/// What the driver must do after an entry point returns.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
	None,
	/// Replace any running timer with one that reports `generation` after `delay`.
	ArmTimer { generation: u64, delay: Duration },
	DisarmTimer,
	/// Send the request. Any running timer is cancelled.
	Dispatch(Dispatch),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Completion {
	Applied,
	Failed,
	Discarded,
}

#[derive(Clone, Copy, Debug)]
struct Awaited {
	seq: u64,
	criteria_count: usize,
}

#[derive(Debug)]
pub struct SessionController {
	settings: SessionSettings,
	file: Option<FileInfo>,
	config: SearchConfiguration,
	response: Option<SearchResponse>,
	applied_seq: Option<u64>,
	result_criteria: usize,
	pagination: PaginationWindow,
	latest_seq: u64,
	awaited: Option<Awaited>,
	timer: Option<u64>,
	last_generation: u64,
	error: Option<String>,
	discarded: u64,
}
impl SessionController {
	pub fn new(settings: SessionSettings) -> Self {
		let config = SearchConfiguration::new(settings.threshold, settings.top_n, settings.language);
		let pagination = PaginationWindow::new(settings.page_size);

		Self {
			settings,
			file: None,
			config,
			response: None,
			applied_seq: None,
			result_criteria: 0,
			pagination,
			latest_seq: 0,
			awaited: None,
			timer: None,
			last_generation: 0,
			error: None,
			discarded: 0,
		}
	}

	pub fn settings(&self) -> &SessionSettings {
		&self.settings
	}

	pub fn file(&self) -> Option<&FileInfo> {
		self.file.as_ref()
	}

	pub fn configuration(&self) -> &SearchConfiguration {
		&self.config
	}

	pub fn response(&self) -> Option<&SearchResponse> {
		self.response.as_ref()
	}

	pub fn pagination(&self) -> &PaginationWindow {
		&self.pagination
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn latest_seq(&self) -> u64 {
		self.latest_seq
	}

	pub fn applied_seq(&self) -> Option<u64> {
		self.applied_seq
	}

	pub fn state(&self) -> SessionState {
		if self.timer.is_some() {
			SessionState::Debouncing
		} else if self.awaited.is_some() {
			SessionState::InFlight
		} else if self.error.is_some() {
			SessionState::Error
		} else {
			SessionState::Idle
		}
	}

	/// Starts over with a freshly ingested file.
	///
	/// Results and the awaited request are dropped, so a response still travelling for the
	/// previous file can no longer be applied. If active criteria survive the reset, a search
	/// against the new file is dispatched right away.
	pub fn load_file(&mut self, file: FileInfo) -> Effect {
		self.config.reset_for_file(file.headers.len(), self.settings.retain_criteria);
		self.file = Some(file);
		self.clear_results();

		self.apply(EditKind::Discrete)
	}

	pub fn close_file(&mut self) -> Effect {
		self.file = None;
		self.config.clear_file();
		self.clear_results();

		self.apply(EditKind::Discrete)
	}

	pub fn add_criterion(&mut self) -> Effect {
		self.config.add_criterion();

		self.apply(EditKind::Passive)
	}

	pub fn remove_criterion(&mut self, index: usize) -> Effect {
		if !self.config.remove_criterion(index) {
			return Effect::None;
		}

		self.apply(EditKind::Discrete)
	}

	pub fn update_criterion(&mut self, index: usize, field: CriterionField, raw: &str) -> Effect {
		if !self.config.update_criterion(index, field, raw) {
			return Effect::None;
		}

		self.apply(EditKind::Continuous)
	}

	pub fn set_matching_type(&mut self, index: usize, matching_type: MatchingType) -> Effect {
		if !self.config.set_matching_type(index, matching_type) {
			return Effect::None;
		}

		self.apply(EditKind::Discrete)
	}

	pub fn toggle_column(&mut self, index: usize) -> Effect {
		if self.config.toggle_column(index).is_none() {
			return Effect::None;
		}

		self.apply(EditKind::Discrete)
	}

	pub fn set_threshold(&mut self, threshold: f64) -> Effect {
		if !self.config.set_threshold(threshold) {
			return Effect::None;
		}

		self.apply(EditKind::Discrete)
	}

	pub fn set_threshold_percent(&mut self, raw: &str) -> Effect {
		if !self.config.set_threshold_percent(raw) {
			return Effect::None;
		}

		self.apply(EditKind::Discrete)
	}

	pub fn set_language(&mut self, language: Language) -> Effect {
		self.config.set_language(language);

		self.apply(EditKind::Discrete)
	}

	pub fn set_top_n(&mut self, top_n: u32) -> Effect {
		self.config.set_top_n(top_n);

		self.apply(EditKind::Discrete)
	}

	/// Explicit "search now", also used for Enter inside a text field.
	pub fn run(&mut self) -> Effect {
		self.apply(EditKind::Discrete)
	}

	/// Reports an expired timer. Timers that were re-armed or cancelled since are ignored.
	pub fn timer_fired(&mut self, generation: u64) -> Effect {
		if self.timer != Some(generation) {
			return Effect::None;
		}

		self.timer = None;

		if self.config.check_dispatchable().is_err() {
			return self.hold();
		}

		self.dispatch()
	}

	/// Applies the outcome of request `seq` if it is the latest one still awaited.
	pub fn complete(&mut self, seq: u64, result: Result<SearchResponse>) -> Completion {
		let Some(awaited) = self.awaited.filter(|awaited| awaited.seq == seq) else {
			self.discarded += 1;

			return Completion::Discarded;
		};

		self.awaited = None;

		match result {
			Ok(response) => {
				self.pagination.set_len(response.results.len());
				self.result_criteria = awaited.criteria_count;
				self.response = Some(response);
				self.applied_seq = Some(seq);
				self.error = None;

				Completion::Applied
			},
			Err(err) => {
				self.error = Some(err.to_string());

				Completion::Failed
			},
		}
	}

	pub fn go_to_page(&mut self, page: usize) -> bool {
		self.pagination.go_to(page)
	}

	pub fn next_page(&mut self) -> bool {
		self.pagination.next()
	}

	pub fn previous_page(&mut self) -> bool {
		self.pagination.previous()
	}

	pub fn first_page(&mut self) {
		self.pagination.first();
	}

	pub fn last_page(&mut self) {
		self.pagination.last();
	}

	/// Only sizes offered by the settings are accepted.
	pub fn set_page_size(&mut self, page_size: usize) -> bool {
		self.settings.page_sizes.contains(&page_size) && self.pagination.set_page_size(page_size)
	}

	/// The file and request an export would use. Exports always send the export result cap.
	pub fn export_request(&self) -> Result<(String, SearchRequest)> {
		let file = self.file.as_ref().ok_or(Error::NoFile)?;

		self.config
			.check_dispatchable()
			.map_err(|err| Error::Export { message: err.to_string() })?;
		self.config.validate_patterns().map_err(|err| Error::Export { message: err.to_string() })?;

		Ok((file.file_id.clone(), self.config.to_request_with_top_n(self.settings.export_top_n)))
	}

	pub fn summary(&self) -> Option<SearchSummary> {
		self.response.as_ref().map(SearchSummary::from_response)
	}

	/// The current page, ready to render.
	pub fn projection(&self) -> ResultsProjection {
		let (Some(file), Some(response)) = (&self.file, &self.response) else {
			return ResultsProjection::default();
		};

		ResultsProjection::project(
			&file.headers,
			self.result_criteria,
			self.pagination.slice(&response.results),
		)
	}

	pub fn view(&self) -> SessionView {
		SessionView {
			state: self.state(),
			file: self.file.clone(),
			criteria: self.config.criteria().to_vec(),
			selected_columns: self.config.selected_columns().iter().copied().collect(),
			threshold: self.config.threshold(),
			top_n: self.config.top_n(),
			language: self.config.language(),
			error: self.error.clone(),
			latest_seq: self.latest_seq,
			applied_seq: self.applied_seq,
			discarded: self.discarded,
			summary: self.summary(),
			current_page: self.pagination.current_page(),
			total_pages: self.pagination.total_pages(),
			page_size: self.pagination.page_size(),
			showing: self.response.as_ref().map(|_| self.pagination.showing()),
			projection: self.projection(),
		}
	}

	fn clear_results(&mut self) {
		self.response = None;
		self.applied_seq = None;
		self.result_criteria = 0;
		self.awaited = None;
		self.error = None;
		self.pagination.set_len(0);
	}

	fn apply(&mut self, kind: EditKind) -> Effect {
		match dispatch_policy(kind, &self.config) {
			DispatchDecision::Record => Effect::None,
			DispatchDecision::Hold => self.hold(),
			DispatchDecision::Debounce => self.arm(),
			DispatchDecision::Immediate => {
				self.timer = None;

				self.dispatch()
			},
		}
	}

	fn hold(&mut self) -> Effect {
		self.error = None;

		if self.timer.take().is_some() { Effect::DisarmTimer } else { Effect::None }
	}

	// A newer edit makes any outstanding answer stale.
	fn arm(&mut self) -> Effect {
		self.last_generation += 1;
		self.timer = Some(self.last_generation);
		self.awaited = None;

		Effect::ArmTimer { generation: self.last_generation, delay: self.settings.debounce }
	}

	fn dispatch(&mut self) -> Effect {
		let Some(file) = &self.file else {
			return self.hold();
		};

		if let Err(err) = self.config.validate_patterns() {
			self.awaited = None;
			self.error = Some(err.to_string());

			return Effect::DisarmTimer;
		}

		let request = self.config.to_request();

		self.latest_seq += 1;
		self.awaited = Some(Awaited { seq: self.latest_seq, criteria_count: request.criterias.len() });
		self.error = None;

		Effect::Dispatch(Dispatch { seq: self.latest_seq, file_id: file.file_id.clone(), request })
	}
}
