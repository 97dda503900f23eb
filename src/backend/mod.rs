//! Client for the hosted backend: story view counters and AMA records.
//!
//! The backend exposes a PostgREST-style API: stored procedures under `/rest/v1/rpc/` and
//! tables under `/rest/v1/`.
pub mod types;

use crate::config::Config;
use alloy::primitives::Address;
use chrono::DateTime;
use eyre::{eyre, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

pub use types::{AmaMessage, AmaRecord, NewAma, NewAmaMessage, ViewCountRow};

#[derive(Debug)]
pub struct BackendClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl BackendClient {
    /// # Errors
    /// * If the HTTP client cannot be built
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// # Errors
    /// * If `BACKEND_URL` is not configured
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.backend_url.is_empty() {
            return Err(eyre!("BACKEND_URL not set"));
        }
        Self::new(&config.backend_url, &config.backend_key)
    }

    /// Records one view and returns the new count.
    ///
    /// `created_at` is the story's on-chain timestamp in unix seconds.
    ///
    /// # Errors
    /// * If the request fails or the backend answers with an error
    pub async fn increment_view(
        &self,
        story_id: u64,
        contract: Address,
        created_at: u64,
    ) -> Result<u64> {
        let body = increment_view_body(story_id, contract, created_at)?;
        let response: Value = self.rpc("increment_story_view", &body).await?;
        parse_count(&response)
    }

    /// View counts for a set of stories. Stories nobody viewed are absent.
    ///
    /// # Errors
    /// * If the request fails or the backend answers with an error
    pub async fn view_counts(
        &self,
        story_ids: &[u64],
        contract: Address,
    ) -> Result<HashMap<u64, u64>> {
        if story_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let body = view_counts_body(story_ids, contract);
        let rows: Vec<ViewCountRow> = self.rpc("get_story_views", &body).await?;
        Ok(rows.into_iter().map(|row| (row.story_id, row.view_count)).collect())
    }

    /// # Errors
    /// * If the request fails or the backend answers with an error
    pub async fn ama(&self, id: u64) -> Result<Option<AmaRecord>> {
        let request = self
            .client
            .get(self.table_url("amas"))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())]);
        let rows: Vec<AmaRecord> = self.send(request).await?;
        Ok(rows.into_iter().next())
    }

    /// # Errors
    /// * If the request fails or the backend answers with an error
    pub async fn insert_ama(&self, ama: &NewAma) -> Result<AmaRecord> {
        self.insert("amas", ama).await
    }

    /// Messages of one AMA, oldest first.
    ///
    /// # Errors
    /// * If the request fails or the backend answers with an error
    pub async fn ama_messages(&self, ama_id: u64) -> Result<Vec<AmaMessage>> {
        let request = self.client.get(self.table_url("ama_messages")).query(&[
            ("ama_id", format!("eq.{ama_id}")),
            ("order", "created_at.asc".to_string()),
        ]);
        self.send(request).await
    }

    /// # Errors
    /// * If the request fails or the backend answers with an error
    pub async fn insert_ama_message(&self, message: &NewAmaMessage) -> Result<AmaMessage> {
        self.insert("ama_messages", message).await
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn rpc<T: DeserializeOwned>(&self, function: &str, body: &Value) -> Result<T> {
        let request = self.client.post(self.rpc_url(function)).json(body);
        self.send(request).await
    }

    async fn insert<B, T>(&self, table: &str, row: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let rows: Vec<T> = self.send(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| eyre!("backend returned no row for insert into {table}"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("backend: request failed with {status}: {body}");
            return Err(eyre!("backend error {status}: {body}"));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Contract addresses are stored lowercased.
fn contract_key(contract: Address) -> String {
    contract.to_string().to_lowercase()
}

fn increment_view_body(story_id: u64, contract: Address, created_at: u64) -> Result<Value> {
    let created_at = i64::try_from(created_at)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| eyre!("invalid story timestamp {created_at}"))?;

    Ok(json!({
        "p_story_id": story_id,
        "p_contract_address": contract_key(contract),
        "p_created_at": created_at.to_rfc3339(),
    }))
}

fn view_counts_body(story_ids: &[u64], contract: Address) -> Value {
    json!({
        "p_story_ids": story_ids,
        "p_contract_address": contract_key(contract),
    })
}

/// The counter procedure answers with a bare number, a row, or a one-row array.
fn parse_count(value: &Value) -> Result<u64> {
    let value = value.as_array().and_then(|rows| rows.first()).unwrap_or(value);
    value
        .as_u64()
        .or_else(|| value.get("view_count").and_then(Value::as_u64))
        .ok_or_else(|| eyre!("unexpected view count response: {value}"))
}
