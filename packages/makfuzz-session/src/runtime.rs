//! Async driver for a [`SessionController`].
//!
//! One task owns the controller, the debounce timer and the requests in flight. Everything that
//! mutates the configuration or compares sequence numbers happens inside that task, one event at
//! a time.

use std::{collections::HashMap, future, path::Path, pin::Pin, sync::Arc};

use tokio::{
	sync::{mpsc, oneshot, watch},
	task::{Id, JoinHandle, JoinSet},
	time::{self, Sleep},
};
use tracing::Instrument;
use uuid::Uuid;

use makfuzz_config::Backend;
use makfuzz_domain::{CriterionField, FileInfo, Language, MatchingType, SearchResponse};
use makfuzz_providers::ExportFormat;

use crate::{
	Backends, Completion, Dispatch, Effect, Error, Result, SessionController, SessionSettings,
	SessionView,
};

const COMMAND_BUFFER: usize = 64;
const CSV_ONLY: &str = "Please upload a CSV file";

/// A configuration edit, as issued by a front end.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
	AddCriterion,
	RemoveCriterion(usize),
	UpdateCriterion { index: usize, field: CriterionField, raw: String },
	SetMatchingType { index: usize, matching_type: MatchingType },
	ToggleColumn(usize),
	SetThreshold(f64),
	SetThresholdPercent(String),
	SetLanguage(Language),
	SetTopN(u32),
	Run,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageCommand {
	GoTo(usize),
	Next,
	Previous,
	First,
	Last,
	SetPageSize(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportArtifact {
	pub file_name: String,
	pub bytes: Vec<u8>,
}

enum Command {
	Edit(Edit),
	Page(PageCommand),
	Upload { file_name: String, bytes: Vec<u8>, reply: oneshot::Sender<Result<FileInfo>> },
	CloseFile { reply: oneshot::Sender<Result<()>> },
	Export { format: ExportFormat, reply: oneshot::Sender<Result<ExportArtifact>> },
	Health { reply: oneshot::Sender<Result<String>> },
}

enum Event {
	Command(Command),
	TimerFired(u64),
	Completed(u64, Result<SearchResponse>),
}

/// Front-end side of a running session. Dropping every handle stops the session.
#[derive(Clone)]
pub struct SessionHandle {
	session_id: Uuid,
	commands: mpsc::Sender<Command>,
	view: watch::Receiver<SessionView>,
}
impl SessionHandle {
	pub fn session_id(&self) -> Uuid {
		self.session_id
	}

	/// The latest published snapshot.
	pub fn view(&self) -> SessionView {
		self.view.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<SessionView> {
		self.view.clone()
	}

	pub async fn edit(&self, edit: Edit) -> Result<()> {
		self.send(Command::Edit(edit)).await
	}

	pub async fn page(&self, page: PageCommand) -> Result<()> {
		self.send(Command::Page(page)).await
	}

	pub async fn upload(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> Result<FileInfo> {
		let (reply, rx) = oneshot::channel();

		self.send(Command::Upload { file_name: file_name.into(), bytes, reply }).await?;

		rx.await.map_err(|_| Error::Closed)?
	}

	pub async fn close_file(&self) -> Result<()> {
		let (reply, rx) = oneshot::channel();

		self.send(Command::CloseFile { reply }).await?;

		rx.await.map_err(|_| Error::Closed)?
	}

	pub async fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
		let (reply, rx) = oneshot::channel();

		self.send(Command::Export { format, reply }).await?;

		rx.await.map_err(|_| Error::Closed)?
	}

	pub async fn health(&self) -> Result<String> {
		let (reply, rx) = oneshot::channel();

		self.send(Command::Health { reply }).await?;

		rx.await.map_err(|_| Error::Closed)?
	}

	async fn send(&self, command: Command) -> Result<()> {
		self.commands.send(command).await.map_err(|_| Error::Closed)
	}
}

/// Starts a session task on the current runtime.
pub fn spawn_session(
	settings: SessionSettings,
	backend: Backend,
	backends: Backends,
) -> (SessionHandle, JoinHandle<()>) {
	let session_id = Uuid::new_v4();
	let controller = SessionController::new(settings);
	let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
	let (view_tx, view_rx) = watch::channel(controller.view());
	let driver = Driver {
		controller,
		backend: Arc::new(backend),
		backends,
		commands: commands_rx,
		view: view_tx,
		timer: None,
		in_flight: JoinSet::new(),
		in_flight_seqs: HashMap::new(),
	};
	let span = tracing::info_span!("session", %session_id);
	let task = tokio::spawn(driver.run().instrument(span));

	(SessionHandle { session_id, commands: commands_tx, view: view_rx }, task)
}

struct Driver {
	controller: SessionController,
	backend: Arc<Backend>,
	backends: Backends,
	commands: mpsc::Receiver<Command>,
	view: watch::Sender<SessionView>,
	timer: Option<(u64, Pin<Box<Sleep>>)>,
	in_flight: JoinSet<(u64, Result<SearchResponse>)>,
	in_flight_seqs: HashMap<Id, u64>,
}
impl Driver {
	async fn run(mut self) {
		tracing::info!("Search session started.");

		loop {
			let event = tokio::select! {
				command = self.commands.recv() => match command {
					Some(command) => Event::Command(command),
					None => break,
				},
				generation = wait_timer(&mut self.timer) => Event::TimerFired(generation),
				Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
					match joined {
						Ok((id, (seq, result))) => {
							self.in_flight_seqs.remove(&id);

							Event::Completed(seq, result)
						},
						Err(err) => {
							let seq = self.in_flight_seqs.remove(&err.id()).unwrap_or_default();

							tracing::error!(seq, error = %err, "Search task did not finish.");

							Event::Completed(
								seq,
								Err(Error::Dispatch { message: "Search was interrupted.".to_string() }),
							)
						},
					}
				},
			};

			self.handle(event).await;
			self.view.send_replace(self.controller.view());
		}

		tracing::info!("Search session stopped.");
	}

	async fn handle(&mut self, event: Event) {
		match event {
			Event::Command(command) => self.handle_command(command).await,
			Event::TimerFired(generation) => {
				self.timer = None;

				let effect = self.controller.timer_fired(generation);

				self.perform(effect);
			},
			Event::Completed(seq, result) => match self.controller.complete(seq, result) {
				Completion::Applied => {
					let summary = self.controller.summary();

					tracing::info!(
						seq,
						total_found = summary.as_ref().map(|s| s.total_found),
						search_time_ms = summary.as_ref().map(|s| s.search_time_ms),
						"Search results applied."
					);
				},
				Completion::Failed => {
					tracing::warn!(seq, error = self.controller.error(), "Search failed.");
				},
				Completion::Discarded => {
					tracing::debug!(
						seq,
						latest = self.controller.latest_seq(),
						"Stale search response discarded."
					);
				},
			},
		}
	}

	async fn handle_command(&mut self, command: Command) {
		match command {
			Command::Edit(edit) => {
				let effect = self.apply_edit(edit);

				self.perform(effect);
			},
			Command::Page(page) => self.apply_page(page),
			Command::Upload { file_name, bytes, reply } => {
				let result = self.upload(file_name, bytes).await;
				let _ = reply.send(result);
			},
			Command::CloseFile { reply } => {
				let result = self.close_file().await;
				let _ = reply.send(result);
			},
			Command::Export { format, reply } => {
				let result = self.export(format).await;
				let _ = reply.send(result);
			},
			Command::Health { reply } => {
				let result = self
					.backends
					.health
					.health(&self.backend)
					.await
					.map_err(|err| Error::health(&err));
				let _ = reply.send(result);
			},
		}
	}

	fn apply_edit(&mut self, edit: Edit) -> Effect {
		let controller = &mut self.controller;

		match edit {
			Edit::AddCriterion => controller.add_criterion(),
			Edit::RemoveCriterion(index) => controller.remove_criterion(index),
			Edit::UpdateCriterion { index, field, raw } =>
				controller.update_criterion(index, field, &raw),
			Edit::SetMatchingType { index, matching_type } =>
				controller.set_matching_type(index, matching_type),
			Edit::ToggleColumn(index) => controller.toggle_column(index),
			Edit::SetThreshold(threshold) => controller.set_threshold(threshold),
			Edit::SetThresholdPercent(raw) => controller.set_threshold_percent(&raw),
			Edit::SetLanguage(language) => controller.set_language(language),
			Edit::SetTopN(top_n) => controller.set_top_n(top_n),
			Edit::Run => controller.run(),
		}
	}

	fn apply_page(&mut self, page: PageCommand) {
		let controller = &mut self.controller;
		let accepted = match page {
			PageCommand::GoTo(page) => controller.go_to_page(page),
			PageCommand::Next => controller.next_page(),
			PageCommand::Previous => controller.previous_page(),
			PageCommand::First => {
				controller.first_page();

				true
			},
			PageCommand::Last => {
				controller.last_page();

				true
			},
			PageCommand::SetPageSize(size) => controller.set_page_size(size),
		};

		if !accepted {
			tracing::debug!(?page, "Page change ignored.");
		}
	}

	fn perform(&mut self, effect: Effect) {
		match effect {
			Effect::None => {},
			Effect::ArmTimer { generation, delay } => {
				self.timer = Some((generation, Box::pin(time::sleep(delay))));
			},
			Effect::DisarmTimer => self.timer = None,
			Effect::Dispatch(dispatch) => {
				self.timer = None;

				self.spawn_search(dispatch);
			},
		}
	}

	fn spawn_search(&mut self, dispatch: Dispatch) {
		let Dispatch { seq, file_id, request } = dispatch;
		let scoring = self.backends.scoring.clone();
		let backend = self.backend.clone();

		tracing::debug!(
			seq,
			%file_id,
			criteria = request.criterias.len(),
			columns = request.search_column_indexes.len(),
			"Dispatching search."
		);

		let handle = self.in_flight.spawn(async move {
			let result = scoring
				.search(&backend, &file_id, &request)
				.await
				.map_err(|err| Error::dispatch(&err));

			(seq, result)
		});

		self.in_flight_seqs.insert(handle.id(), seq);
	}

	async fn upload(&mut self, file_name: String, bytes: Vec<u8>) -> Result<FileInfo> {
		if !is_csv(&file_name) {
			return Err(Error::Upload { message: CSV_ONLY.to_string() });
		}

		let info = self
			.backends
			.ingestion
			.upload(&self.backend, &file_name, bytes)
			.await
			.map_err(|err| Error::upload(&err))?;
		let previous = self.controller.file().map(|file| file.file_id.clone());

		tracing::info!(
			file_id = %info.file_id,
			file_name = %info.file_name,
			columns = info.headers.len(),
			total_rows = info.total_rows,
			"File loaded."
		);

		let effect = self.controller.load_file(info.clone());

		self.perform(effect);

		if let Some(previous) = previous.filter(|previous| *previous != info.file_id) {
			self.delete_quietly(&previous).await;
		}

		Ok(info)
	}

	async fn close_file(&mut self) -> Result<()> {
		let file_id = self.controller.file().map(|file| file.file_id.clone()).ok_or(Error::NoFile)?;
		let effect = self.controller.close_file();

		self.perform(effect);
		self.delete_quietly(&file_id).await;

		Ok(())
	}

	async fn delete_quietly(&self, file_id: &str) {
		if let Err(err) = self.backends.ingestion.delete(&self.backend, file_id).await {
			tracing::warn!(%file_id, error = %err, "Failed to delete previous file.");
		}
	}

	async fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
		let (file_id, request) = self.controller.export_request()?;
		let bytes = self
			.backends
			.export
			.export(&self.backend, &file_id, format, &request)
			.await
			.map_err(|err| Error::export(&err))?;

		tracing::info!(%file_id, %format, bytes = bytes.len(), "Export finished.");

		Ok(ExportArtifact { file_name: format.file_name().to_string(), bytes })
	}
}

async fn wait_timer(timer: &mut Option<(u64, Pin<Box<Sleep>>)>) -> u64 {
	match timer {
		Some((generation, sleep)) => {
			sleep.as_mut().await;

			*generation
		},
		None => future::pending().await,
	}
}

fn is_csv(file_name: &str) -> bool {
	Path::new(file_name)
		.extension()
		.is_some_and(|extension| extension.eq_ignore_ascii_case("csv"))
}
