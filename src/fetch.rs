use std::time::Duration;

use reqwest::{Client, StatusCode};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use crate::transport::{ProxyType, ResolvedEndpoint};

/// SHA-256 of a response body
pub type Digest = [u8; 32];

/// Transport-level failure of a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("failed to build client: {0}")]
	Client(#[source] reqwest::Error),
	#[error("request failed: {0}")]
	Request(#[source] reqwest::Error),
	#[error("unexpected HTTP status {0}")]
	Status(StatusCode),
	#[error("failed to read body: {0}")]
	Body(#[source] reqwest::Error),
}

/// Digest a response body.
pub fn digest(body: &[u8]) -> Digest {
	let mut out = [0u8; 32];
	out.copy_from_slice(&Sha256::digest(body));
	out
}

/// The one fetch the checker performs: GET `url` through `endpoint`
/// speaking `proxy_type`, returning the full body.
#[async_trait::async_trait]
pub trait ProxyFetch: Send + Sync {
	async fn fetch(
		&self,
		url: &str,
		endpoint: &ResolvedEndpoint,
		proxy_type: ProxyType,
	) -> Result<Vec<u8>, FetchError>;
}

/// Production fetcher backed by reqwest.
///
/// Builds a fresh client for every request with idle pooling disabled, so
/// each trial pays for its own connection through the proxy.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
	timeout: Duration,
}

impl ReqwestFetcher {
	pub fn new(timeout: Duration) -> Self {
		Self { timeout }
	}
}

#[async_trait::async_trait]
impl ProxyFetch for ReqwestFetcher {
	async fn fetch(
		&self,
		url: &str,
		endpoint: &ResolvedEndpoint,
		proxy_type: ProxyType,
	) -> Result<Vec<u8>, FetchError> {
		let proxy = reqwest::Proxy::all(proxy_type.proxy_url(endpoint))
			.map_err(FetchError::Client)?;
		let client = Client::builder()
			.proxy(proxy)
			.timeout(self.timeout)
			.pool_max_idle_per_host(0)
			.build()
			.map_err(FetchError::Client)?;
		get_body(&client, url).await
	}
}

/// Client that ignores proxy environment variables, for the baseline fetch.
pub fn direct_client(timeout: Duration) -> Result<Client, FetchError> {
	Client::builder()
		.no_proxy()
		.timeout(timeout)
		.build()
		.map_err(FetchError::Client)
}

/// GET `url` and return the body, treating non-2xx as a failure.
pub async fn get_body(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
	let resp = client.get(url).send().await.map_err(FetchError::Request)?;
	if !resp.status().is_success() {
		return Err(FetchError::Status(resp.status()));
	}
	let body = resp.bytes().await.map_err(FetchError::Body)?;
	Ok(body.to_vec())
}
