pub mod controller;
pub mod policy;
pub mod runtime;
pub mod view;

mod error;

pub use controller::{Completion, Dispatch, Effect, SessionController};
pub use error::{Error, Result};
pub use policy::{DispatchDecision, EditKind, dispatch_policy};
pub use runtime::{Edit, ExportArtifact, PageCommand, SessionHandle, spawn_session};
pub use view::{SessionState, SessionView};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use makfuzz_config::{Backend, Config};
use makfuzz_domain::{FileInfo, Language, SearchRequest, SearchResponse};
use makfuzz_providers::{ExportFormat, export, health, ingestion, scoring};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ScoringService
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a Backend,
		file_id: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, makfuzz_providers::Result<SearchResponse>>;
}

pub trait IngestionService
where
	Self: Send + Sync,
{
	fn upload<'a>(
		&'a self,
		cfg: &'a Backend,
		file_name: &'a str,
		bytes: Vec<u8>,
	) -> BoxFuture<'a, makfuzz_providers::Result<FileInfo>>;

	fn delete<'a>(
		&'a self,
		cfg: &'a Backend,
		file_id: &'a str,
	) -> BoxFuture<'a, makfuzz_providers::Result<()>>;
}

pub trait ExportService
where
	Self: Send + Sync,
{
	fn export<'a>(
		&'a self,
		cfg: &'a Backend,
		file_id: &'a str,
		format: ExportFormat,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, makfuzz_providers::Result<Vec<u8>>>;
}

pub trait HealthProbe
where
	Self: Send + Sync,
{
	fn health<'a>(&'a self, cfg: &'a Backend) -> BoxFuture<'a, makfuzz_providers::Result<String>>;
}

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct Backends {
	pub scoring: Arc<dyn ScoringService>,
	pub ingestion: Arc<dyn IngestionService>,
	pub export: Arc<dyn ExportService>,
	pub health: Arc<dyn HealthProbe>,
}
impl Backends {
	pub fn new(
		scoring: Arc<dyn ScoringService>,
		ingestion: Arc<dyn IngestionService>,
		export: Arc<dyn ExportService>,
		health: Arc<dyn HealthProbe>,
	) -> Self {
		Self { scoring, ingestion, export, health }
	}
}
impl Default for Backends {
	fn default() -> Self {
		let backend = Arc::new(HttpBackends);

		Self {
			scoring: backend.clone(),
			ingestion: backend.clone(),
			export: backend.clone(),
			health: backend,
		}
	}
}

/// Session tunables resolved from the loaded configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
	pub debounce: Duration,
	pub threshold: f64,
	pub top_n: u32,
	pub language: Language,
	pub retain_criteria: bool,
	pub page_size: usize,
	pub page_sizes: Vec<usize>,
	pub export_top_n: u32,
}
impl SessionSettings {
	pub fn from_config(cfg: &Config) -> Result<Self> {
		Ok(Self {
			debounce: Duration::from_millis(cfg.session.debounce_ms),
			threshold: cfg.session.threshold,
			top_n: cfg.session.top_n,
			language: cfg.session.language.parse()?,
			retain_criteria: cfg.session.retain_criteria,
			page_size: cfg.pagination.page_size,
			page_sizes: cfg.pagination.page_sizes.clone(),
			export_top_n: cfg.export.top_n,
		})
	}
}
impl Default for SessionSettings {
	fn default() -> Self {
		Self {
			debounce: Duration::from_millis(400),
			threshold: 0.75,
			top_n: makfuzz_domain::MAX_TOP_N,
			language: Language::En,
			retain_criteria: false,
			page_size: 10,
			page_sizes: vec![10, 100, 1_000, 10_000],
			export_top_n: 10_000,
		}
	}
}

struct HttpBackends;
impl ScoringService for HttpBackends {
	fn search<'a>(
		&'a self,
		cfg: &'a Backend,
		file_id: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, makfuzz_providers::Result<SearchResponse>> {
		Box::pin(scoring::search(cfg, file_id, request))
	}
}
impl IngestionService for HttpBackends {
	fn upload<'a>(
		&'a self,
		cfg: &'a Backend,
		file_name: &'a str,
		bytes: Vec<u8>,
	) -> BoxFuture<'a, makfuzz_providers::Result<FileInfo>> {
		Box::pin(ingestion::upload(cfg, file_name, bytes))
	}

	fn delete<'a>(
		&'a self,
		cfg: &'a Backend,
		file_id: &'a str,
	) -> BoxFuture<'a, makfuzz_providers::Result<()>> {
		Box::pin(ingestion::delete_file(cfg, file_id))
	}
}
impl ExportService for HttpBackends {
	fn export<'a>(
		&'a self,
		cfg: &'a Backend,
		file_id: &'a str,
		format: ExportFormat,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, makfuzz_providers::Result<Vec<u8>>> {
		Box::pin(export::export(cfg, file_id, format, request))
	}
}
impl HealthProbe for HttpBackends {
	fn health<'a>(&'a self, cfg: &'a Backend) -> BoxFuture<'a, makfuzz_providers::Result<String>> {
		Box::pin(health::health(cfg))
	}
}
