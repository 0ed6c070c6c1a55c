pub mod configuration;
pub mod criterion;
pub mod model;
pub mod pagination;
pub mod projection;

mod error;

pub use configuration::{Language, MAX_TOP_N, SearchConfiguration, SearchRequest};
pub use criterion::{Criterion, CriterionField, MatchingType};
pub use error::{ConfigurationInvalid, InvalidPattern, UnknownLanguage, UnknownMatchingType};
pub use model::{CriterionMatch, FileInfo, MatchResult, SearchResponse};
pub use pagination::{PageRange, PaginationWindow};
pub use projection::{
	ProjectedCell, ProjectedMatch, ProjectedRow, ResultsProjection, ScoreTier, SearchSummary,
};
