use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Map;
use tokio::{
	sync::{mpsc, oneshot, watch},
	time,
};

use makfuzz_config::Backend;
use makfuzz_domain::{
	CriterionField, FileInfo, Language, MatchResult, SearchRequest, SearchResponse,
};
use makfuzz_providers::ExportFormat;
use makfuzz_session::{
	Backends, BoxFuture, Edit, Error, ExportService, HealthProbe, IngestionService, PageCommand,
	ScoringService, SessionHandle, SessionSettings, SessionState, SessionView, spawn_session,
};

type ProviderResult<T> = makfuzz_providers::Result<T>;

fn response(total_found: u64, rows: usize) -> SearchResponse {
	SearchResponse {
		results: (0..rows)
			.map(|i| MatchResult {
				total_score: 0.9,
				line_index: i as u64 + 1,
				candidate_values: vec![format!("row{i}"), "x".to_string()],
				raw_line: None,
				criteria_matches: Vec::new(),
			})
			.collect(),
		total_found,
		total_results: 100,
		..SearchResponse::default()
	}
}

#[derive(Clone, Default)]
struct SpyScoring {
	calls: Arc<AtomicUsize>,
	requests: Arc<Mutex<Vec<(String, SearchRequest)>>>,
}
impl SpyScoring {
	fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn requests(&self) -> Vec<(String, SearchRequest)> {
		self.requests.lock().expect("Spy lock poisoned.").clone()
	}
}
impl ScoringService for SpyScoring {
	fn search<'a>(
		&'a self,
		_cfg: &'a Backend,
		file_id: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, ProviderResult<SearchResponse>> {
		let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

		self.requests.lock().expect("Spy lock poisoned.").push((file_id.to_string(), request.clone()));

		Box::pin(async move { Ok(response(call as u64, 25)) })
	}
}

struct GatedCall {
	request: SearchRequest,
	reply: oneshot::Sender<ProviderResult<SearchResponse>>,
}

struct GatedScoring {
	calls: mpsc::UnboundedSender<GatedCall>,
}
impl ScoringService for GatedScoring {
	fn search<'a>(
		&'a self,
		_cfg: &'a Backend,
		_file_id: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, ProviderResult<SearchResponse>> {
		let (reply, rx) = oneshot::channel();
		let _ = self.calls.send(GatedCall { request: request.clone(), reply });

		Box::pin(async move {
			rx.await.unwrap_or_else(|_| {
				Err(makfuzz_providers::Error::InvalidResponse {
					message: "Gate dropped.".to_string(),
				})
			})
		})
	}
}

struct FailingScoring;
impl ScoringService for FailingScoring {
	fn search<'a>(
		&'a self,
		_cfg: &'a Backend,
		_file_id: &'a str,
		_request: &'a SearchRequest,
	) -> BoxFuture<'a, ProviderResult<SearchResponse>> {
		Box::pin(async {
			Err(makfuzz_providers::Error::Status {
				status: 500,
				message: Some("Search failed: engine down".to_string()),
			})
		})
	}
}

#[derive(Clone, Default)]
struct StubIngestion {
	uploads: Arc<AtomicUsize>,
	deleted: Arc<Mutex<Vec<String>>>,
	fail_delete: bool,
	reject_uploads: Arc<AtomicBool>,
}
impl IngestionService for StubIngestion {
	fn upload<'a>(
		&'a self,
		_cfg: &'a Backend,
		file_name: &'a str,
		_bytes: Vec<u8>,
	) -> BoxFuture<'a, ProviderResult<FileInfo>> {
		if self.reject_uploads.load(Ordering::SeqCst) {
			return Box::pin(async {
				Err(makfuzz_providers::Error::Status {
					status: 400,
					message: Some("File is empty".to_string()),
				})
			});
		}

		let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
		let info = FileInfo {
			file_id: format!("file-{n}"),
			file_name: file_name.to_string(),
			headers: vec!["last".to_string(), "first".to_string(), "city".to_string()],
			total_rows: 100,
			file_size_bytes: 4_096,
		};

		Box::pin(async move { Ok(info) })
	}

	fn delete<'a>(&'a self, _cfg: &'a Backend, file_id: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
		self.deleted.lock().expect("Stub lock poisoned.").push(file_id.to_string());

		let fail = self.fail_delete;

		Box::pin(async move {
			if fail {
				Err(makfuzz_providers::Error::Status { status: 500, message: None })
			} else {
				Ok(())
			}
		})
	}
}

#[derive(Clone, Default)]
struct StubExport {
	requests: Arc<Mutex<Vec<(ExportFormat, SearchRequest)>>>,
	fail: bool,
}
impl ExportService for StubExport {
	fn export<'a>(
		&'a self,
		_cfg: &'a Backend,
		_file_id: &'a str,
		format: ExportFormat,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
		self.requests.lock().expect("Stub lock poisoned.").push((format, request.clone()));

		let fail = self.fail;

		Box::pin(async move {
			if fail {
				Err(makfuzz_providers::Error::Status {
					status: 500,
					message: Some("Workbook generation failed".to_string()),
				})
			} else {
				Ok(b"last,first\n".to_vec())
			}
		})
	}
}

struct StubHealth {
	down: bool,
}
impl HealthProbe for StubHealth {
	fn health<'a>(&'a self, _cfg: &'a Backend) -> BoxFuture<'a, ProviderResult<String>> {
		let down = self.down;

		Box::pin(async move {
			if down {
				Err(makfuzz_providers::Error::Status { status: 503, message: None })
			} else {
				Ok("MakFuzz API is running".to_string())
			}
		})
	}
}

struct Harness {
	handle: SessionHandle,
	ingestion: StubIngestion,
	export: StubExport,
}

fn backend() -> Backend {
	Backend {
		api_base: "http://127.0.0.1:9/api/v1/fuzz".to_string(),
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

fn start(scoring: Arc<dyn ScoringService>, ingestion: StubIngestion) -> Harness {
	start_with(scoring, ingestion, StubExport::default(), StubHealth { down: false })
}

fn start_with(
	scoring: Arc<dyn ScoringService>,
	ingestion: StubIngestion,
	export: StubExport,
	health: StubHealth,
) -> Harness {
	let backends = Backends::new(
		scoring,
		Arc::new(ingestion.clone()),
		Arc::new(export.clone()),
		Arc::new(health),
	);
	let (handle, _task) = spawn_session(SessionSettings::default(), backend(), backends);

	Harness { handle, ingestion, export }
}

async fn wait_for(
	rx: &mut watch::Receiver<SessionView>,
	predicate: impl FnMut(&SessionView) -> bool,
) -> SessionView {
	time::timeout(Duration::from_secs(30), rx.wait_for(predicate))
		.await
		.expect("Timed out waiting for session view.")
		.expect("Session stopped.")
		.clone()
}

fn set_value(raw: &str) -> Edit {
	Edit::UpdateCriterion { index: 0, field: CriterionField::Value, raw: raw.to_string() }
}

async fn load(handle: &SessionHandle) -> FileInfo {
	handle.upload("people.csv", b"last,first,city\n".to_vec()).await.expect("Upload failed.")
}

#[tokio::test(start_paused = true)]
async fn rapid_text_edits_coalesce_into_one_search() {
	let spy = SpyScoring::default();
	let harness = start(Arc::new(spy.clone()), StubIngestion::default());
	let handle = &harness.handle;

	load(handle).await;

	for value in ["s", "sm", "smi", "smith"] {
		handle.edit(set_value(value)).await.expect("Edit failed.");
		time::sleep(Duration::from_millis(100)).await;
	}

	assert_eq!(spy.count(), 0);
	assert_eq!(handle.view().state, SessionState::Debouncing);

	time::sleep(Duration::from_millis(500)).await;

	let view = wait_for(&mut handle.subscribe(), |view| view.applied_seq == Some(1)).await;
	let requests = spy.requests();

	assert_eq!(spy.count(), 1);
	assert_eq!(requests[0].0, "file-1");
	assert_eq!(requests[0].1.criterias[0].value, "smith");
	assert_eq!(requests[0].1.search_column_indexes, vec![0, 1, 2]);
	assert_eq!(view.state, SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn each_discrete_edit_dispatches_immediately() {
	let spy = SpyScoring::default();
	let harness = start(Arc::new(spy.clone()), StubIngestion::default());
	let handle = &harness.handle;

	load(handle).await;
	handle.edit(set_value("smith")).await.expect("Edit failed.");

	let edits = vec![
		Edit::Run,
		Edit::ToggleColumn(1),
		Edit::ToggleColumn(1),
		Edit::SetLanguage(Language::Fr),
		Edit::SetThresholdPercent("50".to_string()),
		Edit::SetTopN(500),
	];
	let expected = edits.len();

	for edit in edits {
		handle.edit(edit).await.expect("Edit failed.");
	}

	wait_for(&mut handle.subscribe(), |view| view.applied_seq == Some(expected as u64)).await;
	time::sleep(Duration::from_secs(2)).await;

	assert_eq!(spy.count(), expected);

	let last = &spy.requests()[expected - 1].1;

	assert_eq!(last.language, Language::Fr);
	assert_eq!(last.threshold, 0.5);
	assert_eq!(last.top_n, 500);
}

#[tokio::test(start_paused = true)]
async fn invalid_configuration_never_reaches_backend() {
	let spy = SpyScoring::default();
	let harness = start(Arc::new(spy.clone()), StubIngestion::default());
	let handle = &harness.handle;

	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");
	load(handle).await;

	for column in 0..3 {
		handle.edit(Edit::ToggleColumn(column)).await.expect("Edit failed.");
	}

	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");
	time::sleep(Duration::from_secs(2)).await;

	assert_eq!(spy.count(), 0);
	assert_eq!(handle.view().latest_seq, 0);
}

#[tokio::test]
async fn slower_older_response_is_discarded() {
	let (calls_tx, mut calls_rx) = mpsc::unbounded_channel();
	let harness = start(Arc::new(GatedScoring { calls: calls_tx }), StubIngestion::default());
	let handle = &harness.handle;
	let mut views = handle.subscribe();

	load(handle).await;
	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");
	handle.edit(Edit::ToggleColumn(2)).await.expect("Edit failed.");

	let a = calls_rx.recv().await.expect("Missing first search.");
	let b = calls_rx.recv().await.expect("Missing second search.");

	assert_eq!(a.request.search_column_indexes, vec![0, 1, 2]);
	assert_eq!(b.request.search_column_indexes, vec![0, 1]);

	let _ = b.reply.send(Ok(response(2, 2)));
	let view = wait_for(&mut views, |view| view.applied_seq == Some(2)).await;

	assert_eq!(view.summary.map(|summary| summary.total_found), Some(2));

	let _ = a.reply.send(Ok(response(1, 1)));
	let view = wait_for(&mut views, |view| view.discarded == 1).await;

	assert_eq!(view.applied_seq, Some(2));
	assert_eq!(view.summary.map(|summary| summary.total_found), Some(2));
	assert_eq!(view.projection.rows.len(), 2);
}

#[tokio::test]
async fn search_failure_surfaces_backend_message() {
	let harness = start(Arc::new(FailingScoring), StubIngestion::default());
	let handle = &harness.handle;

	load(handle).await;
	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");

	let view = wait_for(&mut handle.subscribe(), |view| view.state == SessionState::Error).await;

	assert_eq!(view.error.as_deref(), Some("Search failed: engine down"));
	assert_eq!(view.criteria[0].value, "smith");
	assert!(view.summary.is_none());
}

#[tokio::test]
async fn non_csv_upload_is_rejected_without_touching_session() {
	let harness = start(Arc::new(SpyScoring::default()), StubIngestion::default());
	let err = harness
		.handle
		.upload("people.xlsx", b"PK".to_vec())
		.await
		.expect_err("Expected upload rejection.");

	assert!(matches!(&err, Error::Upload { message } if message == "Please upload a CSV file"));
	assert_eq!(harness.ingestion.uploads.load(Ordering::SeqCst), 0);
	assert!(harness.handle.view().file.is_none());
}

#[tokio::test]
async fn replacing_file_deletes_previous_best_effort() {
	let ingestion = StubIngestion { fail_delete: true, ..StubIngestion::default() };
	let harness = start(Arc::new(SpyScoring::default()), ingestion);
	let handle = &harness.handle;

	load(handle).await;

	let second = handle.upload("other.CSV", b"a,b,c\n".to_vec()).await.expect("Upload failed.");

	assert_eq!(second.file_id, "file-2");
	assert_eq!(harness.ingestion.deleted.lock().expect("Stub lock poisoned.").clone(), vec![
		"file-1".to_string()
	]);
	assert_eq!(handle.view().file.map(|file| file.file_id), Some("file-2".to_string()));

	handle.close_file().await.expect("Close failed.");

	assert!(handle.view().file.is_none());
	assert!(matches!(handle.close_file().await, Err(Error::NoFile)));
}

#[tokio::test]
async fn export_sends_export_cap_and_names_artifact() {
	let harness = start(Arc::new(SpyScoring::default()), StubIngestion::default());
	let handle = &harness.handle;

	assert!(matches!(handle.export(ExportFormat::Csv).await, Err(Error::NoFile)));

	load(handle).await;

	assert!(matches!(handle.export(ExportFormat::Csv).await, Err(Error::Export { .. })));

	handle.edit(set_value("smith")).await.expect("Edit failed.");

	let artifact = handle.export(ExportFormat::Excel).await.expect("Export failed.");
	let requests = harness.export.requests.lock().expect("Stub lock poisoned.").clone();

	assert_eq!(artifact.file_name, "makfuzz_results.xlsx");
	assert_eq!(artifact.bytes, b"last,first\n");
	assert_eq!(requests[0].0, ExportFormat::Excel);
	assert_eq!(requests[0].1.top_n, 10_000);
}

#[tokio::test]
async fn paging_through_accepted_results() {
	let harness = start(Arc::new(SpyScoring::default()), StubIngestion::default());
	let handle = &harness.handle;
	let mut views = handle.subscribe();

	load(handle).await;
	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");
	wait_for(&mut views, |view| view.applied_seq == Some(1)).await;

	handle.page(PageCommand::GoTo(5)).await.expect("Page failed.");
	handle.page(PageCommand::Last).await.expect("Page failed.");

	let view = wait_for(&mut views, |view| view.current_page == 3).await;

	assert_eq!(view.total_pages, 3);
	assert_eq!(view.projection.rows.len(), 5);
	assert_eq!(view.showing.map(|range| (range.from, range.to, range.total)), Some((21, 25, 25)));

	handle.page(PageCommand::SetPageSize(100)).await.expect("Page failed.");

	let view = wait_for(&mut views, |view| view.page_size == 100).await;

	assert_eq!(view.current_page, 1);
	assert_eq!(view.projection.rows.len(), 25);
}

#[tokio::test]
async fn health_reports_backend_status() {
	let harness = start(Arc::new(SpyScoring::default()), StubIngestion::default());

	assert_eq!(
		harness.handle.health().await.expect("Health check failed."),
		"MakFuzz API is running"
	);
}

#[tokio::test]
async fn health_failure_is_reported_as_health_error() {
	let harness = start_with(
		Arc::new(SpyScoring::default()),
		StubIngestion::default(),
		StubExport::default(),
		StubHealth { down: true },
	);
	let err = harness.handle.health().await.expect_err("Expected health failure.");

	assert!(matches!(err, Error::Health { .. }), "Unexpected error: {err:?}");
	assert_eq!(harness.handle.view().state, SessionState::Idle);
}

#[tokio::test]
async fn rejected_upload_keeps_file_and_results() {
	let spy = SpyScoring::default();
	let harness = start(Arc::new(spy.clone()), StubIngestion::default());
	let handle = &harness.handle;

	load(handle).await;
	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");

	let before = wait_for(&mut handle.subscribe(), |view| view.applied_seq == Some(1)).await;

	harness.ingestion.reject_uploads.store(true, Ordering::SeqCst);

	let err = handle
		.upload("replacement.csv", Vec::new())
		.await
		.expect_err("Expected upload rejection.");

	assert!(
		matches!(&err, Error::Upload { message } if message == "Upload failed: File is empty"),
		"Unexpected error: {err:?}"
	);
	assert_eq!(handle.view(), before);
	assert_eq!(before.file.map(|file| file.file_id), Some("file-1".to_string()));
	assert!(harness.ingestion.deleted.lock().expect("Stub lock poisoned.").is_empty());
	assert_eq!(spy.count(), 1);
}

#[tokio::test]
async fn failed_export_leaves_session_untouched() {
	let spy = SpyScoring::default();
	let harness = start_with(
		Arc::new(spy.clone()),
		StubIngestion::default(),
		StubExport { fail: true, ..StubExport::default() },
		StubHealth { down: false },
	);
	let handle = &harness.handle;

	load(handle).await;
	handle.edit(set_value("smith")).await.expect("Edit failed.");
	handle.edit(Edit::Run).await.expect("Edit failed.");

	let before = wait_for(&mut handle.subscribe(), |view| view.applied_seq == Some(1)).await;
	let err = handle.export(ExportFormat::Csv).await.expect_err("Expected export failure.");

	let Error::Export { message } = &err else {
		panic!("Unexpected error: {err:?}");
	};

	assert_eq!(message, "Export failed: Workbook generation failed");
	assert_eq!(handle.view(), before);
	assert_eq!(before.state, SessionState::Idle);
	assert!(before.error.is_none());
	assert_eq!(spy.count(), 1);
}
