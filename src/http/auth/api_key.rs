use crate::http::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects API-key headers into every request.
///
/// Header names and values are validated once, at construction. Values are
/// marked sensitive so they are redacted from `Debug` output.
pub struct ApiKey<C> {
    pub inner: C,
    headers: HeaderMap,
}

impl<C> ApiKey<C> {
    /// Sets `header_name: key` on every request.
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        Self {
            inner,
            headers: HeaderMap::new(),
        }
        .with_header(header_name, key)
    }

    /// Uses `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, "Authorization", &format!("Bearer {key}"))
    }

    /// Supabase expects the key both as `apikey` and as a bearer token.
    pub fn supabase(inner: C, key: &str) -> Result<Self> {
        Self::bearer(inner, key)?.with_header("apikey", key)
    }

    pub fn with_header(mut self, header_name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(header_name.as_bytes())?;
        let mut value = HeaderValue::from_str(value)?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(self)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}
