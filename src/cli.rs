use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::transport::{CheckConfig, LATENCY_SCALE};

/// Log verbosity accepted by --loglevel
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
	Warning,
	Info,
	Debug,
}

/// Proxy checker
#[derive(Parser, Debug)]
#[command(name = "proxy-check")]
#[command(about = "Test HTTP and SOCKS5 proxies for their utility and latency")]
pub struct Cli {
	/// Proxies to test, one HOST:PORT per line
	pub proxy_list: String,

	/// Logging level to use
	#[arg(short = 'l', long = "loglevel", value_enum, ignore_case = true, default_value = "info")]
	pub loglevel: LogLevel,

	/// Number of worker tasks to use
	#[arg(short = 't', long = "threads", default_value = "10")]
	pub threads: usize,

	/// Test URL for latency measurement
	#[arg(short = 'u', long = "testurl", default_value = "https://www.akamai.com/robots.txt")]
	pub testurl: String,

	/// Number of seconds to wait before a request times out
	#[arg(short = 's', long = "timeout", default_value = "5")]
	pub timeout: u64,

	/// Number of times to repeat the latency measurement
	#[arg(short = 'r', long = "repeats", default_value = "3")]
	pub repeats: u32,

	/// Also write working proxies to this CSV file, fastest first
	#[arg(short = 'o', long = "output")]
	pub output: Option<String>,
}

impl Cli {
	pub fn check_config(&self) -> CheckConfig {
		CheckConfig {
			test_url: self.testurl.clone(),
			timeout: Duration::from_secs(self.timeout),
			workers: self.threads,
			repeats: self.repeats,
			latency_scale: LATENCY_SCALE,
		}
	}
}
