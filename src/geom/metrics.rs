//! Opt-in timing hooks for the fitting pipeline.
//!
//! Timing is only collected when the `fit_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to invoking the wrapped closure.
//!
//! # Usage
//!
//! ```ignore
//! use curve_fit_engine::geom::{FitMetrics, TimingBucket};
//!
//! let mut metrics = FitMetrics::default();
//! metrics.begin();
//! let params = metrics.time(TimingBucket::Parameterization, || {
//!     parameterize(&points, Parameterization::ChordLength)
//! });
//! if let Some(report) = metrics.end() {
//!     println!("parameterization: {} ns", report.parameterization_ns);
//! }
//! ```

/// Phases of a fit that accumulate time separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Chord-length or centripetal parameter computation.
    Parameterization,
    /// Knot vector synthesis.
    Knots,
    /// Collocation / normal-equation matrix and right-hand side assembly.
    Assembly,
    /// LU factorization and per-axis back substitution.
    Solve,
    /// Piecewise cubic Bézier construction.
    Bezier,
    /// Deviation measurement against the input points.
    Diagnostics,
}

/// Cumulative nanoseconds per [`TimingBucket`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FitTimingReport {
    pub parameterization_ns: u64,
    pub knots_ns: u64,
    pub assembly_ns: u64,
    pub solve_ns: u64,
    pub bezier_ns: u64,
    pub diagnostics_ns: u64,
}

impl FitTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.parameterization_ns
            .saturating_add(self.knots_ns)
            .saturating_add(self.assembly_ns)
            .saturating_add(self.solve_ns)
            .saturating_add(self.bezier_ns)
            .saturating_add(self.diagnostics_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing one fit.
///
/// When the `fit_metrics` feature is disabled (or on WASM) all methods are
/// no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct FitMetrics {
    #[cfg(all(feature = "fit_metrics", not(target_arch = "wasm32")))]
    report: FitTimingReport,
}

impl FitMetrics {
    /// Resets all counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "fit_metrics", not(target_arch = "wasm32")))]
        {
            self.report = FitTimingReport::default();
        }
    }

    /// Returns the accumulated report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<FitTimingReport> {
        #[cfg(all(feature = "fit_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "fit_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "fit_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "fit_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "fit_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Parameterization => &mut self.report.parameterization_ns,
            TimingBucket::Knots => &mut self.report.knots_ns,
            TimingBucket::Assembly => &mut self.report.assembly_ns,
            TimingBucket::Solve => &mut self.report.solve_ns,
            TimingBucket::Bezier => &mut self.report.bezier_ns,
            TimingBucket::Diagnostics => &mut self.report.diagnostics_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
