//! Build timing for a pipeline run

use std::time::{Duration, Instant};

/// Per-phase timings for one build variant
#[derive(Debug)]
pub struct BuildMetrics {
    start: Instant,
    phases: Vec<(String, Duration)>,
    /// Resources generated
    pub resource_count: usize,
    /// Bytes written to the pack
    pub pack_bytes: usize,
}

impl Default for BuildMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildMetrics {
    /// Start measuring
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            phases: Vec::new(),
            resource_count: 0,
            pack_bytes: 0,
        }
    }

    /// Time a closure and record it as a phase
    pub fn time_phase<F, R>(&mut self, name: impl Into<String>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let phase_start = Instant::now();
        let result = f();
        self.phases.push((name.into(), phase_start.elapsed()));
        result
    }

    /// Recorded phases in order
    pub fn phases(&self) -> &[(String, Duration)] {
        &self.phases
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn format_duration(d: Duration) -> String {
        let ms = d.as_secs_f64() * 1000.0;
        if ms < 1.0 {
            format!("{}µs", d.as_micros())
        } else if ms < 1000.0 {
            format!("{:.2}ms", ms)
        } else {
            format!("{:.2}s", d.as_secs_f64())
        }
    }

    /// Generate a formatted report
    pub fn report(&self) -> String {
        let mut lines = vec![format!(
            "Built {} resources ({} pack bytes) in {}",
            self.resource_count,
            self.pack_bytes,
            Self::format_duration(self.elapsed())
        )];
        for (name, duration) in &self.phases {
            lines.push(format!(
                "  {:<12} {:>10}",
                name,
                Self::format_duration(*duration)
            ));
        }
        lines.join("\n")
    }

    /// Log the report using tracing
    pub fn log_report(&self) {
        for line in self.report().lines() {
            tracing::info!("{}", line);
        }
    }
}
