use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Latency scale factor applied to mean and stdev (seconds -> reported value)
pub const LATENCY_SCALE: f64 = 100.0;

/// Unresolved proxy candidate as read from the input list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
	pub host: String,
	pub port: u16,
	/// 1-based line number in the input file
	pub line: usize,
}

/// Candidate after host resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEndpoint {
	pub ip: IpAddr,
	pub port: u16,
}

impl fmt::Display for ResolvedEndpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.ip {
			IpAddr::V4(ip) => write!(f, "{}:{}", ip, self.port),
			IpAddr::V6(ip) => write!(f, "[{}]:{}", ip, self.port),
		}
	}
}

/// Proxy protocol, tried in `ProxyType::PRIORITY` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
	Http,
	Socks5,
}

impl ProxyType {
	pub const PRIORITY: [ProxyType; 2] = [ProxyType::Http, ProxyType::Socks5];

	/// URL scheme understood by reqwest's proxy configuration
	pub fn scheme(self) -> &'static str {
		match self {
			ProxyType::Http => "http",
			ProxyType::Socks5 => "socks5",
		}
	}

	/// Proxy URL for this protocol at the given endpoint
	pub fn proxy_url(self, endpoint: &ResolvedEndpoint) -> String {
		format!("{}://{}", self.scheme(), endpoint)
	}
}

impl fmt::Display for ProxyType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.scheme())
	}
}

/// Final classification of one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
	Success {
		proxy_type: ProxyType,
		mean_latency_ms: f64,
		stdev_latency_ms: f64,
	},
	NotResponding,
	ModifiesResponse,
	ResolutionFailed,
}

/// What a worker hands to the reporter for one candidate
#[derive(Debug, Clone)]
pub struct CheckReport {
	pub candidate: Candidate,
	pub endpoint: Option<ResolvedEndpoint>,
	pub outcome: EvaluationOutcome,
}

/// Run configuration shared read-only by every worker
#[derive(Debug, Clone)]
pub struct CheckConfig {
	pub test_url: String,
	pub timeout: Duration,
	pub workers: usize,
	pub repeats: u32,
	pub latency_scale: f64,
}
