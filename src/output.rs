use std::io::{IsTerminal, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL};
use tracing::{error, info, warn};

use crate::transport::{CheckReport, EvaluationOutcome, ProxyType};

const CSV_HEADER: [&str; 5] = ["host", "port", "type", "mean", "stdev"];

/// One working proxy, as it appears in CSV output
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessRow {
	pub host: String,
	pub port: u16,
	pub proxy_type: ProxyType,
	pub mean: f64,
	pub stdev: f64,
}

impl SuccessRow {
	fn record(&self) -> [String; 5] {
		[
			self.host.clone(),
			self.port.to_string(),
			self.proxy_type.to_string(),
			format!("{:.6}", self.mean),
			format!("{:.6}", self.stdev),
		]
	}
}

type CsvSink = csv::Writer<Box<dyn Write + Send>>;

/// Turns worker reports into log lines, streamed CSV rows and a final summary.
///
/// Shared by all workers; the CSV stream and the collected rows are each
/// behind their own lock.
pub struct Reporter {
	csv: Option<Mutex<CsvSink>>,
	successes: Mutex<Vec<SuccessRow>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
	m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Reporter {
	/// Reporter that streams CSV into `sink`, or only logs when `sink` is None.
	pub fn new(sink: Option<Box<dyn Write + Send>>) -> Result<Self> {
		let csv = match sink {
			Some(sink) => {
				let mut writer = csv::Writer::from_writer(sink);
				writer.write_record(CSV_HEADER)?;
				writer.flush()?;
				Some(Mutex::new(writer))
			}
			None => None,
		};
		Ok(Self { csv, successes: Mutex::new(Vec::new()) })
	}

	/// CSV on stdout only when stdout is not an interactive terminal.
	pub fn for_stdout() -> Result<Self> {
		let stdout = std::io::stdout();
		if stdout.is_terminal() {
			info!("stdout is a terminal, suppressing CSV output");
			Self::new(None)
		} else {
			Self::new(Some(Box::new(stdout)))
		}
	}

	pub fn is_streaming_csv(&self) -> bool {
		self.csv.is_some()
	}

	/// Log one candidate's outcome and, on success, emit its CSV row.
	///
	/// Output failures are logged, never propagated to the worker.
	pub fn report(&self, report: &CheckReport) {
		let candidate = &report.candidate;
		let host = report.endpoint
			.map(|e| e.ip.to_string())
			.unwrap_or_else(|| candidate.host.clone());
		let port = candidate.port;

		match &report.outcome {
			EvaluationOutcome::Success { proxy_type, mean_latency_ms, stdev_latency_ms } => {
				info!(
					"< {:>15}:{:<5} > has a latency of {:8.2} ms (±{:8.2} ms) via {}",
					host, port, mean_latency_ms, stdev_latency_ms, proxy_type,
				);
				let row = SuccessRow {
					host,
					port,
					proxy_type: *proxy_type,
					mean: *mean_latency_ms,
					stdev: *stdev_latency_ms,
				};
				if let Some(csv) = &self.csv {
					if let Err(e) = write_row(&mut lock(csv), &row) {
						error!("failed to write CSV row for {}:{}: {}", row.host, row.port, e);
					}
				}
				lock(&self.successes).push(row);
			}
			EvaluationOutcome::ModifiesResponse => {
				warn!("< {:>15}:{:<5} > is modifying response", host, port);
			}
			EvaluationOutcome::NotResponding => {
				info!("< {:>15}:{:<5} > is not responding", host, port);
			}
			EvaluationOutcome::ResolutionFailed => {
				warn!("unable to resolve host < {} > (line {})", candidate.host, candidate.line);
			}
		}
	}

	/// Successful rows so far, fastest first.
	pub fn successes(&self) -> Vec<SuccessRow> {
		let mut rows = lock(&self.successes).clone();
		rows.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap_or(std::cmp::Ordering::Equal));
		rows
	}
}

fn write_row(writer: &mut CsvSink, row: &SuccessRow) -> Result<()> {
	writer.write_record(row.record())?;
	writer.flush()?;
	Ok(())
}

/// Print working proxies as a formatted table.
pub fn print_results_table(rows: &[SuccessRow]) {
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec!["Rank", "Proxy", "Type", "Mean", "Stdev"]);

	for (i, r) in rows.iter().enumerate() {
		table.add_row(vec![
			format!("{}", i + 1),
			format!("{}:{}", r.host, r.port),
			r.proxy_type.to_string(),
			format!("{:.2} ms", r.mean),
			format!("{:.2} ms", r.stdev),
		]);
	}

	println!("\nWorking Proxies");
	println!("===============\n");
	println!("{table}");
}

/// Write working proxies to a CSV file.
pub fn write_csv(path: &str, rows: &[SuccessRow]) -> Result<()> {
	let mut writer = csv::Writer::from_path(path)?;
	writer.write_record(CSV_HEADER)?;
	for r in rows {
		writer.write_record(r.record())?;
	}
	writer.flush()?;
	info!("results written to: {}", path);
	Ok(())
}
