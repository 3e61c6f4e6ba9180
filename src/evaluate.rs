use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::baseline::ReferenceBaseline;
use crate::fetch::{FetchError, ProxyFetch};
use crate::stats::{summarize, LatencySummary};
use crate::transport::{CheckConfig, EvaluationOutcome, ProxyType, ResolvedEndpoint};

/// Per-endpoint proxy checks: identification, verification, measurement.
pub struct ProxyEvaluator<F> {
	fetcher: F,
	baseline: Arc<ReferenceBaseline>,
	config: Arc<CheckConfig>,
}

impl<F: ProxyFetch> ProxyEvaluator<F> {
	pub fn new(fetcher: F, baseline: Arc<ReferenceBaseline>, config: Arc<CheckConfig>) -> Self {
		Self { fetcher, baseline, config }
	}

	async fn fetch(&self, endpoint: &ResolvedEndpoint, proxy_type: ProxyType) -> Result<Vec<u8>, FetchError> {
		self.fetcher.fetch(&self.baseline.test_url, endpoint, proxy_type).await
	}

	/// Find the first proxy type, in priority order, for which one fetch
	/// completes without a transport error.
	///
	/// The body is not inspected here. A proxy that only answers under a
	/// lower priority type is identified as that type even if it tampers
	/// with the content; verification catches that afterwards.
	pub async fn identify(&self, endpoint: &ResolvedEndpoint) -> Option<ProxyType> {
		for proxy_type in ProxyType::PRIORITY {
			match self.fetch(endpoint, proxy_type).await {
				Ok(_) => return Some(proxy_type),
				Err(e) => debug!("{} as {}: {}", endpoint, proxy_type, e),
			}
		}
		None
	}

	/// Fetch once more through `proxy_type` and compare against the baseline.
	/// A transport error counts as a mismatch.
	pub async fn verify(&self, endpoint: &ResolvedEndpoint, proxy_type: ProxyType) -> bool {
		match self.fetch(endpoint, proxy_type).await {
			Ok(body) => self.baseline.matches(&body),
			Err(e) => {
				debug!("{} as {} failed verification fetch: {}", endpoint, proxy_type, e);
				false
			}
		}
	}

	/// Time `repeats` fetches, one request per trial, and summarize them.
	pub async fn measure(
		&self,
		endpoint: &ResolvedEndpoint,
		proxy_type: ProxyType,
	) -> Result<LatencySummary, FetchError> {
		let mut samples = Vec::new();
		for _ in 0..self.config.repeats {
			let start = Instant::now();
			self.fetch(endpoint, proxy_type).await?;
			samples.push(start.elapsed());
		}
		Ok(summarize(&samples, self.config.latency_scale))
	}

	/// Run all three phases against one endpoint.
	pub async fn evaluate(&self, endpoint: &ResolvedEndpoint) -> EvaluationOutcome {
		let Some(proxy_type) = self.identify(endpoint).await else {
			return EvaluationOutcome::NotResponding;
		};

		if !self.verify(endpoint, proxy_type).await {
			return EvaluationOutcome::ModifiesResponse;
		}

		match self.measure(endpoint, proxy_type).await {
			Ok(summary) => EvaluationOutcome::Success {
				proxy_type,
				mean_latency_ms: summary.mean_ms,
				stdev_latency_ms: summary.stdev_ms,
			},
			Err(e) => {
				// Answered twice, then stopped relaying
				debug!("{} as {} failed during measurement: {}", endpoint, proxy_type, e);
				EvaluationOutcome::NotResponding
			}
		}
	}
}
