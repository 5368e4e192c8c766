//! Pinecone serverless index client
//!
//! Talks to the control plane to create the index when it does not exist and
//! resolve its data-plane host, then upserts and queries through that host.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::VectorIndex;
use crate::types::{IndexRecord, QueryMatch};

const CONTROL_PLANE: &str = "https://api.pinecone.io";

/// Pinecone index over its REST data plane
pub struct PineconeIndex {
    client: Client,
    host: String,
    index_name: String,
}

impl PineconeIndex {
    /// Connect to the configured index, creating it when missing
    ///
    /// A freshly created serverless index is not immediately writable, so
    /// the describe call is polled until the index reports ready.
    pub async fn connect(config: &IndexConfig) -> Result<Self> {
        let client = Self::build_client(config)?;

        let existing = Self::list_indexes(&client).await?;
        if !existing.iter().any(|name| name == &config.index_name) {
            tracing::info!(
                "Index {} not found, creating ({}/{}, 1536 dims, cosine)",
                config.index_name,
                config.cloud,
                config.region
            );
            Self::create_index(&client, config).await?;
        }

        let host = Self::wait_until_ready(&client, &config.index_name).await?;
        tracing::info!("Connected to index {} at {}", config.index_name, host);

        Ok(Self {
            client,
            host,
            index_name: config.index_name.clone(),
        })
    }

    fn build_client(config: &IndexConfig) -> Result<Client> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("missing vector index API key".into()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(config.api_key.trim())
                .map_err(|_| Error::Config("invalid vector index API key".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::VectorDb(format!("failed to build HTTP client: {}", e)))
    }

    async fn list_indexes(client: &Client) -> Result<Vec<String>> {
        let response = client
            .get(format!("{}/indexes", CONTROL_PLANE))
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("list indexes failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "list indexes failed ({}): {}",
                status, body
            )));
        }

        let list: IndexList = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("failed to parse index list: {}", e)))?;

        Ok(list.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create_index(client: &Client, config: &IndexConfig) -> Result<()> {
        let request = CreateIndexRequest {
            name: &config.index_name,
            dimension: 1536,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &config.cloud,
                    region: &config.region,
                },
            },
        };

        let response = client
            .post(format!("{}/indexes", CONTROL_PLANE))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("create index failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "create index failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn wait_until_ready(client: &Client, index_name: &str) -> Result<String> {
        // A new serverless index usually reports ready within seconds.
        for _ in 0..30 {
            let description = Self::describe_index(client, index_name).await?;
            if description.status.ready && !description.host.is_empty() {
                return Ok(description.host);
            }
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        Err(Error::VectorDb(format!(
            "index {} did not become ready",
            index_name
        )))
    }

    async fn describe_index(client: &Client, index_name: &str) -> Result<IndexDescription> {
        let response = client
            .get(format!("{}/indexes/{}", CONTROL_PLANE, index_name))
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("describe index failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "describe index failed ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("failed to parse index description: {}", e)))
    }
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexEntry>,
}

#[derive(Deserialize)]
struct IndexEntry {
    name: String,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
    status: IndexStatus,
}

#[derive(Deserialize)]
struct IndexStatus {
    ready: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest { vectors: records };

        let response = self
            .client
            .post(format!("https://{}/vectors/upsert", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("upsert failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "upsert failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata,
        };

        let response = self
            .client
            .post(format!("https://{}/query", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "query failed ({}): {}",
                status, body
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("failed to parse query response: {}", e)))?;

        Ok(parsed.matches)
    }

    fn name(&self) -> &str {
        &self.index_name
    }
}
