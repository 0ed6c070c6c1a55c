use std::{fmt, str::FromStr};

use crate::{Error, Result};
use makfuzz_config::Backend;
use makfuzz_domain::SearchRequest;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportFormat {
	Csv,
	Excel,
}
impl ExportFormat {
	pub fn path_segment(self) -> &'static str {
		match self {
			Self::Csv => "csv",
			Self::Excel => "excel",
		}
	}

	pub fn file_name(self) -> &'static str {
		match self {
			Self::Csv => "makfuzz_results.csv",
			Self::Excel => "makfuzz_results.xlsx",
		}
	}
}
impl FromStr for ExportFormat {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"csv" => Ok(Self::Csv),
			"excel" | "xlsx" => Ok(Self::Excel),
			_ => Err(Error::InvalidConfig {
				message: format!("Unsupported export format {raw:?}; expected csv or excel."),
			}),
		}
	}
}
impl fmt::Display for ExportFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path_segment())
	}
}

/// Downloads the ranked rows for `request` in the chosen format.
pub async fn export(
	cfg: &Backend,
	file_id: &str,
	format: ExportFormat,
	request: &SearchRequest,
) -> Result<Vec<u8>> {
	let client = crate::client(cfg)?;
	let url = crate::endpoint(cfg, &format!("/export/{file_id}/{}", format.path_segment()));
	let res = client.post(url).json(request).send().await?;
	let bytes = crate::ensure_success(res).await?.bytes().await?;

	Ok(bytes.to_vec())
}
