use std::time::Duration;

/// Mean and spread of a run of latency trials, already scaled
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencySummary {
	pub mean_ms: f64,
	pub stdev_ms: f64,
}

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	let sum: f64 = values.iter().sum();
	Some(sum / values.len() as f64)
}

/// Calculate the sample standard deviation (n - 1 denominator).
///
/// Returns None for fewer than two values, where it is undefined.
pub fn sample_stdev(values: &[f64]) -> Option<f64> {
	if values.len() < 2 {
		return None;
	}
	let avg = mean(values)?;
	let variance = values.iter()
		.map(|v| (v - avg).powi(2))
		.sum::<f64>() / (values.len() - 1) as f64;
	Some(variance.sqrt())
}

/// Summarize latency trials: mean and sample stdev of the durations in
/// seconds, each multiplied by `scale`.
///
/// An empty run reports zero for both; a single trial reports zero stdev.
pub fn summarize(samples: &[Duration], scale: f64) -> LatencySummary {
	let secs: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();
	LatencySummary {
		mean_ms: scale * mean(&secs).unwrap_or(0.0),
		stdev_ms: scale * sample_stdev(&secs).unwrap_or(0.0),
	}
}
