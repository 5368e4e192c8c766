//! Cloud parsing service client (LlamaParse)
//!
//! Uploads the raw file, polls the parse job until it settles, then fetches
//! the markdown result.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::providers::parser::DocumentParser;
use crate::types::{Metadata, ParsedDocument};

/// Parsing service client
pub struct LlamaParseClient {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Deserialize)]
struct JobStatus {
    status: String,
}

#[derive(Deserialize)]
struct MarkdownResult {
    markdown: String,
    #[serde(default)]
    job_metadata: Metadata,
}

impl LlamaParseClient {
    /// Create a new client from configuration
    pub fn new(config: &ParserConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("missing parsing service API key".into()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("invalid parsing service API key".into()))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
        })
    }

    async fn upload(&self, filename: &str, data: Vec<u8>) -> Result<String> {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(data).file_name(filename.to_string()),
        );

        let response = self
            .client
            .post(format!("{}/api/parsing/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::parse(filename, format!("upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::parse(
                filename,
                format!("upload failed ({}): {}", status, body),
            ));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::parse(filename, format!("failed to parse upload response: {}", e)))?;

        Ok(upload.id)
    }

    async fn wait_for_job(&self, filename: &str, job_id: &str) -> Result<()> {
        for _ in 0..self.max_polls {
            let response = self
                .client
                .get(format!("{}/api/parsing/job/{}", self.base_url, job_id))
                .send()
                .await
                .map_err(|e| Error::parse(filename, format!("status poll failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::parse(
                    filename,
                    format!("status poll failed ({}): {}", status, body),
                ));
            }

            let job: JobStatus = response.json().await.map_err(|e| {
                Error::parse(filename, format!("failed to parse job status: {}", e))
            })?;

            match job.status.as_str() {
                "SUCCESS" => return Ok(()),
                "ERROR" | "CANCELED" => {
                    return Err(Error::parse(
                        filename,
                        format!("parse job {} ended with status {}", job_id, job.status),
                    ));
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }

        Err(Error::parse(
            filename,
            format!("parse job {} did not complete in time", job_id),
        ))
    }

    async fn fetch_markdown(&self, filename: &str, job_id: &str) -> Result<MarkdownResult> {
        let response = self
            .client
            .get(format!(
                "{}/api/parsing/job/{}/result/markdown",
                self.base_url, job_id
            ))
            .send()
            .await
            .map_err(|e| Error::parse(filename, format!("result fetch failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::parse(
                filename,
                format!("result fetch failed ({}): {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::parse(filename, format!("failed to parse result: {}", e)))
    }
}

#[async_trait]
impl DocumentParser for LlamaParseClient {
    async fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::parse(path.display().to_string(), "invalid file name"))?
            .to_string();

        let data = tokio::fs::read(path).await?;

        tracing::info!("Parsing document: {}", path.display());
        let job_id = self.upload(&filename, data).await?;
        tracing::debug!("[{}] parse job {} submitted", filename, job_id);

        self.wait_for_job(&filename, &job_id).await?;
        let result = self.fetch_markdown(&filename, &job_id).await?;

        if result.markdown.trim().is_empty() {
            return Err(Error::parse(&filename, "parser returned empty text"));
        }

        let mut metadata = result.job_metadata;
        metadata.insert("file_name".to_string(), serde_json::json!(filename));

        Ok(ParsedDocument {
            text: result.markdown,
            metadata,
        })
    }

    fn name(&self) -> &str {
        "llama-parse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_result_deserializes_with_and_without_metadata() {
        let raw = serde_json::json!({
            "markdown": "# Title",
            "job_metadata": {"job_pages": 3}
        });
        let result: MarkdownResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.markdown, "# Title");
        assert_eq!(result.job_metadata["job_pages"], serde_json::json!(3));

        let bare = serde_json::json!({"markdown": "x"});
        let result: MarkdownResult = serde_json::from_value(bare).unwrap();
        assert!(result.job_metadata.is_empty());
    }
}
