use anyhow::{anyhow, Result};
use thiserror::Error;
use tracing::warn;

use crate::transport::Candidate;

/// Why an input line was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CandidateError {
	#[error("missing port")]
	MissingPort,
	#[error("empty host")]
	EmptyHost,
	#[error("invalid port '{0}'")]
	InvalidPort(String),
	#[error("unexpected ':' in host '{0}'")]
	ExtraColon(String),
}

/// A skipped input line, kept so callers can count parse warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
	pub line: usize,
	pub text: String,
	pub reason: String,
}

/// Parsed candidate list plus every rejected line
#[derive(Debug, Default)]
pub struct CandidateList {
	pub candidates: Vec<Candidate>,
	pub rejected: Vec<RejectedLine>,
}

/// Parse a single `host:port` entry.
///
/// Supports formats:
///   "proxy.example.net:3128"
///   "198.51.100.7:8080"
///   "[2001:db8::1]:1080"  -- bracketed IPv6
pub fn parse_candidate(input: &str, line: usize) -> Result<Candidate, CandidateError> {
	let trimmed = input.trim();

	let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
		let (host, port) = rest.split_once("]:").ok_or(CandidateError::MissingPort)?;
		(host, port)
	} else {
		let (host, port) = trimmed.split_once(':').ok_or(CandidateError::MissingPort)?;
		if port.contains(':') {
			return Err(CandidateError::ExtraColon(trimmed.to_string()));
		}
		(host, port)
	};

	if host.is_empty() {
		return Err(CandidateError::EmptyHost);
	}
	let port: u16 = port.parse()
		.map_err(|_| CandidateError::InvalidPort(port.to_string()))?;

	Ok(Candidate { host: host.to_string(), port, line })
}

/// Parse candidate file contents, one entry per line.
///
/// Blank lines and lines starting with '#' are skipped silently; malformed
/// lines are collected in `rejected`.
pub fn parse_candidates(content: &str) -> CandidateList {
	let mut list = CandidateList::default();
	for (idx, raw) in content.lines().enumerate() {
		let line = idx + 1;
		let trimmed = raw.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}
		match parse_candidate(trimmed, line) {
			Ok(candidate) => list.candidates.push(candidate),
			Err(e) => list.rejected.push(RejectedLine {
				line,
				text: trimmed.to_string(),
				reason: e.to_string(),
			}),
		}
	}
	list
}

/// Read candidates from a file, logging a warning per rejected line.
pub fn read_candidate_file(path: &str) -> Result<CandidateList> {
	let content = std::fs::read_to_string(path)
		.map_err(|e| anyhow!("failed to read proxy list '{}': {}", path, e))?;
	let list = parse_candidates(&content);
	for rejected in &list.rejected {
		warn!(
			"error parsing line {} ({}): {}, ignoring",
			rejected.line, rejected.text, rejected.reason,
		);
	}
	Ok(list)
}
