/// Throttled progress logging for long indexing runs
use std::time::Instant;

use tracing::info;

pub struct ProgressReporter {
    start_time: Instant,
    last_report: Option<Instant>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            last_report: None,
        }
    }

    /// Log progress at most every 100ms, always logging the final file
    pub fn report(&mut self, processed: usize, total: usize) {
        let now = Instant::now();
        let throttled = self
            .last_report
            .is_some_and(|last| now.duration_since(last).as_millis() < 100);
        if throttled && processed < total {
            return;
        }
        self.last_report = Some(now);

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { processed as f64 / elapsed } else { 0.0 };
        let pct = if total > 0 {
            (processed as f64 / total as f64 * 100.0) as u32
        } else {
            100
        };

        info!(
            "Parsed {}/{} files ({}%) - {:.0} files/sec",
            processed, total, pct, rate
        );
    }
}
