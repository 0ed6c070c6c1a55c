use crate::Result;
use makfuzz_config::Backend;

/// Returns the backend's health text.
pub async fn health(cfg: &Backend) -> Result<String> {
	let client = crate::client(cfg)?;
	let res = client.get(crate::endpoint(cfg, "/health")).send().await?;

	Ok(crate::ensure_success(res).await?.text().await?.trim().to_string())
}
