mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

/// Executes `req` and returns the response body, or an error carrying the
/// status and body if the server did not answer with a success status.
pub async fn send<C: HttpClient + ?Sized>(client: &C, req: reqwest::Request) -> Result<Vec<u8>> {
    let method = req.method().clone();
    let url = req.url().path().to_string();

    let resp = client
        .execute(req)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send {} {}: {}", method, url, e))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("{} {} returned status {}: {}", method, url, status, body));
    }

    Ok(resp.bytes().await?.to_vec())
}
