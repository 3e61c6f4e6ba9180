use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, error, info, info_span, Instrument};

use crate::evaluate::ProxyEvaluator;
use crate::fetch::ProxyFetch;
use crate::output::Reporter;
use crate::queue::WorkQueue;
use crate::resolve::HostLookup;
use crate::transport::{Candidate, CheckReport, EvaluationOutcome, ResolvedEndpoint};

/// Everything a worker needs, shared read-only across the pool
struct Shared<F, R> {
	queue: Arc<WorkQueue<Candidate>>,
	evaluator: ProxyEvaluator<F>,
	resolver: R,
	reporter: Arc<Reporter>,
}

/// Resolve and evaluate one candidate. Never fails: every path ends in
/// exactly one outcome.
pub async fn check_candidate<F: ProxyFetch, R: HostLookup>(
	candidate: &Candidate,
	resolver: &R,
	evaluator: &ProxyEvaluator<F>,
) -> CheckReport {
	let ip = match resolver.resolve(&candidate.host).await {
		Ok(ip) => ip,
		Err(e) => {
			debug!("resolving {}: {}", candidate.host, e);
			return CheckReport {
				candidate: candidate.clone(),
				endpoint: None,
				outcome: EvaluationOutcome::ResolutionFailed,
			};
		}
	};

	let endpoint = ResolvedEndpoint { ip, port: candidate.port };
	let outcome = evaluator.evaluate(&endpoint).await;
	CheckReport {
		candidate: candidate.clone(),
		endpoint: Some(endpoint),
		outcome,
	}
}

async fn worker<F: ProxyFetch, R: HostLookup>(shared: Arc<Shared<F, R>>) {
	loop {
		let candidate = shared.queue.dequeue().await;
		let report = check_candidate(&candidate, &shared.resolver, &shared.evaluator).await;
		shared.reporter.report(&report);
		if let Err(e) = shared.queue.mark_done() {
			error!("completion tracking out of sync: {}", e);
		}
	}
}

/// Check every candidate with a fixed pool of `workers` tasks.
///
/// All candidates are enqueued up front; returns once each one has been
/// reported and marked done. Idle workers are then stopped.
pub async fn run_check<F, R>(
	candidates: Vec<Candidate>,
	evaluator: ProxyEvaluator<F>,
	resolver: R,
	reporter: Arc<Reporter>,
	workers: usize,
) -> Result<()>
where
	F: ProxyFetch + 'static,
	R: HostLookup + 'static,
{
	if workers == 0 {
		bail!("worker count must be at least 1");
	}

	let queue = Arc::new(WorkQueue::new());
	let total = candidates.len();
	for candidate in candidates {
		queue.enqueue(candidate);
	}
	info!("checking {} candidates with {} workers", total, workers);

	let shared = Arc::new(Shared { queue: queue.clone(), evaluator, resolver, reporter });
	let handles: Vec<_> = (0..workers)
		.map(|id| tokio::spawn(worker(shared.clone()).instrument(info_span!("worker", id))))
		.collect();

	queue.wait_until_all_done().await;
	for handle in &handles {
		handle.abort();
	}
	debug!("all {} candidates done", total);
	Ok(())
}
