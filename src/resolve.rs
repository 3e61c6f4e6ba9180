use std::net::IpAddr;

use hickory_resolver::TokioResolver;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveFailure {
	#[error("lookup failed: {0}")]
	Lookup(String),
	#[error("no addresses returned")]
	NoAddress,
	#[error("no system resolver available")]
	NoResolver,
}

/// Host name to IP resolution used once per candidate
#[async_trait::async_trait]
pub trait HostLookup: Send + Sync {
	async fn resolve(&self, host: &str) -> Result<IpAddr, ResolveFailure>;
}

/// Resolver using the system DNS configuration (/etc/resolv.conf, hosts file).
///
/// Without a usable system configuration only IP literals resolve; every
/// host name fails on its own candidate.
pub struct HostResolver {
	inner: Option<TokioResolver>,
}

impl HostResolver {
	pub fn from_system() -> Self {
		match TokioResolver::builder_tokio() {
			Ok(builder) => Self { inner: Some(builder.build()) },
			Err(e) => {
				warn!("failed to read system resolver config: {}, only IP literals will resolve", e);
				Self::literal_only()
			}
		}
	}

	/// Resolver that accepts IP literals and rejects every host name.
	pub fn literal_only() -> Self {
		Self { inner: None }
	}
}

#[async_trait::async_trait]
impl HostLookup for HostResolver {
	async fn resolve(&self, host: &str) -> Result<IpAddr, ResolveFailure> {
		// IP literals need no lookup
		if let Ok(ip) = host.parse::<IpAddr>() {
			return Ok(ip);
		}
		let resolver = self.inner.as_ref().ok_or(ResolveFailure::NoResolver)?;
		let lookup = resolver.lookup_ip(host)
			.await
			.map_err(|e| ResolveFailure::Lookup(e.to_string()))?;
		lookup.iter().next().ok_or(ResolveFailure::NoAddress)
	}
}
