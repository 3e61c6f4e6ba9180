mod baseline;
mod candidates;
mod cli;
mod evaluate;
mod fetch;
mod logging;
mod output;
mod pool;
mod queue;
mod resolve;
mod stats;
#[cfg(test)]
mod testutil;
mod transport;

use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use tracing::info;

use crate::baseline::ReferenceBaseline;
use crate::cli::Cli;
use crate::evaluate::ProxyEvaluator;
use crate::fetch::ReqwestFetcher;
use crate::output::Reporter;
use crate::resolve::HostResolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	logging::init_logging(cli.loglevel)?;

	let list = candidates::read_candidate_file(&cli.proxy_list)?;
	if !list.rejected.is_empty() {
		info!("skipped {} malformed line(s) in {}", list.rejected.len(), cli.proxy_list);
	}

	let config = Arc::new(cli.check_config());
	if config.workers == 0 {
		bail!("--threads must be at least 1");
	}
	let resolver = HostResolver::from_system();

	// Last fatal step: every worker compares against this baseline
	let baseline = Arc::new(ReferenceBaseline::fetch(&config.test_url, config.timeout).await?);

	let reporter = Arc::new(Reporter::for_stdout()?);
	let evaluator = ProxyEvaluator::new(
		ReqwestFetcher::new(config.timeout),
		baseline,
		config.clone(),
	);

	pool::run_check(list.candidates, evaluator, resolver, reporter.clone(), config.workers).await?;

	let results = reporter.successes();
	info!("{} working proxies found", results.len());

	// Interactive runs get a summary table instead of CSV
	if !reporter.is_streaming_csv() {
		output::print_results_table(&results);
	}

	if let Some(path) = &cli.output {
		output::write_csv(path, &results)?;
	}

	Ok(())
}
