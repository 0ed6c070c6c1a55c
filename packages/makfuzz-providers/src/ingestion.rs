use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::{Error, Result};
use makfuzz_config::Backend;
use makfuzz_domain::FileInfo;

pub async fn upload(cfg: &Backend, file_name: &str, bytes: Vec<u8>) -> Result<FileInfo> {
	let client = crate::client(cfg)?;
	let part = Part::bytes(bytes).file_name(file_name.to_string()).mime_str("text/csv")?;
	let form = Form::new().part("file", part);
	let res = client.post(crate::endpoint(cfg, "/upload")).multipart(form).send().await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_file_info(json)
}

pub async fn file_info(cfg: &Backend, file_id: &str) -> Result<FileInfo> {
	let client = crate::client(cfg)?;
	let res = client.get(crate::endpoint(cfg, &format!("/file/{file_id}"))).send().await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_file_info(json)
}

pub async fn delete_file(cfg: &Backend, file_id: &str) -> Result<()> {
	let client = crate::client(cfg)?;
	let res = client.delete(crate::endpoint(cfg, &format!("/file/{file_id}"))).send().await?;

	crate::ensure_success(res).await?;

	Ok(())
}

fn parse_file_info(json: Value) -> Result<FileInfo> {
	serde_json::from_value(json).map_err(|err| Error::InvalidResponse {
		message: format!("File info response is malformed: {err}."),
	})
}
