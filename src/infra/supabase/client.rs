use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::http::auth::ApiKey;
use crate::http::{BasicClient, HttpClient, send};
use crate::services::table_store::TableStore;
use crate::transform::types::MeasurementRow;

/// Rows requested per page when reading a table back.
const PAGE_SIZE: usize = 1000;

/// Conflict target of the upsert; the row identity of the staged dataset.
const CONFLICT_COLUMNS: &str = "city,time";

pub struct SupabaseStore<C = ApiKey<BasicClient>> {
    client: C,
    table_url: Url,
}

impl SupabaseStore {
    /// Creates a store for `table` in the project at `base_url`, sending
    /// `key` as both `apikey` and bearer token.
    pub fn connect(base_url: &str, key: &str, table: &str) -> Result<Self> {
        let client = ApiKey::supabase(BasicClient::new()?, key)?;
        Self::with_client(client, base_url, table)
    }
}

impl<C: HttpClient> SupabaseStore<C> {
    pub fn with_client(client: C, base_url: &str, table: &str) -> Result<Self> {
        let table_url = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
            .parse()
            .with_context(|| format!("invalid Supabase URL '{base_url}'"))?;

        Ok(Self { client, table_url })
    }

    fn upsert_request(&self, rows: &[MeasurementRow]) -> Result<Request> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("on_conflict", CONFLICT_COLUMNS);

        let mut req = Request::new(Method::POST, url);
        let headers = req.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
        );
        *req.body_mut() = Some(serde_json::to_vec(rows)?.into());

        Ok(req)
    }

    fn select_request(&self, offset: usize, limit: usize) -> Request {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "city.asc,time.asc")
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        Request::new(Method::GET, url)
    }
}

#[async_trait]
impl<C: HttpClient> TableStore for SupabaseStore<C> {
    async fn upsert(&self, rows: &[MeasurementRow]) -> Result<()> {
        let req = self.upsert_request(rows)?;
        send(&self.client, req).await?;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Map<String, Value>>> {
        let mut records = Vec::new();

        loop {
            let body = send(&self.client, self.select_request(records.len(), PAGE_SIZE)).await?;
            let page: Vec<Map<String, Value>> = serde_json::from_slice(&body)
                .map_err(|e| anyhow::anyhow!("Failed to parse table page: {}", e))?;
            let page_len = page.len();

            debug!(offset = records.len(), rows = page_len, "Fetched table page");
            records.extend(page);

            if page_len < PAGE_SIZE {
                break;
            }
        }

        Ok(records)
    }
}
