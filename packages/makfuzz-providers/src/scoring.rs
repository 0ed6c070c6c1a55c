use serde_json::Value;

use crate::{Error, Result};
use makfuzz_config::Backend;
use makfuzz_domain::{SearchRequest, SearchResponse};

pub async fn search(
	cfg: &Backend,
	file_id: &str,
	request: &SearchRequest,
) -> Result<SearchResponse> {
	let client = crate::client(cfg)?;
	let url = crate::endpoint(cfg, &format!("/search/{file_id}"));
	let res = client.post(url).json(request).send().await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<SearchResponse> {
	serde_json::from_value(json).map_err(|err| Error::InvalidResponse {
		message: format!("Search response is malformed: {err}."),
	})
}
