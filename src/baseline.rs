use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::fetch::{digest, direct_client, get_body, Digest};

/// Ground truth for tamper detection: the test URL fetched without a proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBaseline {
	pub test_url: String,
	pub digest: Digest,
	pub length: usize,
}

impl ReferenceBaseline {
	/// Build a baseline from an already-fetched body.
	pub fn from_body(test_url: &str, body: &[u8]) -> Self {
		Self {
			test_url: test_url.to_string(),
			digest: digest(body),
			length: body.len(),
		}
	}

	/// Fetch `test_url` directly and digest it.
	///
	/// Any failure here is fatal for the run: without a baseline no
	/// candidate can be judged.
	pub async fn fetch(test_url: &str, timeout: Duration) -> Result<Self> {
		let client = direct_client(timeout)?;
		let body = get_body(&client, test_url)
			.await
			.with_context(|| format!("failed to fetch reference document {}", test_url))?;
		let baseline = Self::from_body(test_url, &body);
		info!("Testing using url: {}", test_url);
		debug!("reference document is {} bytes", baseline.length);
		Ok(baseline)
	}

	/// Whether a relayed body matches the reference byte for byte.
	pub fn matches(&self, body: &[u8]) -> bool {
		digest(body) == self.digest
	}
}
