//! Metrics collection and reporting using metrics-rs.
//!
//! Translation records through the global `metrics` macros; the CLI
//! installs [`CliRecorder`] to print what was collected.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_histogram, histogram,
};
use parking_lot::RwLock;

// ============================================================================
// Metric descriptions
// ============================================================================

/// Initialize metric descriptions.
///
/// Call this once at startup to register metric descriptions.
pub fn init() {
    describe_counter!(
        "cellrec_functions_translated_total",
        Unit::Count,
        "Functions translated and emitted"
    );
    describe_counter!(
        "cellrec_functions_failed_total",
        Unit::Count,
        "Functions that failed translation or a pass"
    );
    describe_counter!(
        "cellrec_pass_failures_total",
        Unit::Count,
        "Pass failures, labelled by pass"
    );
    describe_histogram!(
        "cellrec_function_instructions",
        Unit::Count,
        "Guest instructions per translated function"
    );
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record an emitted function of `instructions` guest instructions.
#[allow(clippy::cast_precision_loss)]
pub fn record_translated(instructions: u64) {
    counter!("cellrec_functions_translated_total").increment(1);
    histogram!("cellrec_function_instructions").record(instructions as f64);
}

/// Record a function that did not reach emission.
pub fn record_failed() {
    counter!("cellrec_functions_failed_total").increment(1);
}

/// Record a failure of `pass`.
pub fn record_pass_failure(pass: &'static str) {
    let labels = [("pass", pass)];
    counter!("cellrec_pass_failures_total", &labels).increment(1);
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

#[derive(Default)]
struct Storage {
    counters: RwLock<BTreeMap<String, u64>>,
    histograms: RwLock<BTreeMap<String, Vec<f64>>>,
}

struct CliCounter {
    key: String,
    storage: Arc<Storage>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        *self.storage.counters.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.counters.write().insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    storage: Arc<Storage>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        self.storage
            .histograms
            .write()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

/// Recorder that keeps counters and histograms in memory for a summary.
#[derive(Default)]
pub struct CliRecorder {
    storage: Arc<Storage>,
}

impl CliRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this recorder as the global metrics recorder.
    ///
    /// Returns `None` when a recorder is already installed.
    pub fn install(self) -> Option<CliRecorderHandle> {
        let storage = Arc::clone(&self.storage);
        metrics::set_global_recorder(self).ok()?;
        Some(CliRecorderHandle { storage })
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.storage),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CliHistogram {
            key: key_to_string(key),
            storage: Arc::clone(&self.storage),
        }))
    }
}

/// Handle for reading metrics after installing the CLI recorder.
pub struct CliRecorderHandle {
    storage: Arc<Storage>,
}

impl CliRecorderHandle {
    pub fn counter(&self, key: &str) -> Option<u64> {
        self.storage.counters.read().get(key).copied()
    }

    pub fn histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.storage.histograms.read().get(key).cloned()
    }

    /// Print all collected metrics in a human-readable format.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        let counters = self.storage.counters.read();
        let histograms = self.storage.histograms.read();
        if counters.is_empty() && histograms.is_empty() {
            println!("No metrics collected.");
            return;
        }

        println!();
        println!("## Metrics Summary");
        if !counters.is_empty() {
            println!();
            println!("### Counters");
            for (key, value) in counters.iter() {
                println!("  {key}: {value}");
            }
        }
        if !histograms.is_empty() {
            println!();
            println!("### Histograms");
            for (key, values) in histograms.iter().filter(|(_, v)| !v.is_empty()) {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                println!(
                    "  {key}: count={}, min={min:.1}, max={max:.1}, avg={avg:.1}",
                    values.len()
                );
            }
        }
    }
}
