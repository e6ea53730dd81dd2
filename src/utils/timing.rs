//! Per-trial timings and their averages.

use std::fmt;
use std::time::Instant;

/// Elapsed seconds of one trial. An operation that was not selected stays `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrialTimings {
    pub trial: usize,
    pub symmetry: Option<f64>,
    pub transpose: Option<f64>,
    /// Verdict of the symmetry check, when it ran.
    pub symmetric: Option<bool>,
}

impl TrialTimings {
    pub fn new(trial: usize) -> Self {
        TrialTimings { trial, ..Default::default() }
    }

    /// Timings in output order: symmetry check first, then transpose.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.symmetry.into_iter().chain(self.transpose)
    }
}

/// Run `f` and return its result with the elapsed wall-clock seconds.
pub fn timed<R>(f: impl FnOnce() -> R) -> (R, f64) {
    let start = Instant::now();
    let r = f();
    (r, start.elapsed().as_secs_f64())
}

/// Mean timing of each operation over a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimingSummary {
    pub trials: usize,
    pub symmetry: Option<f64>,
    pub transpose: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl TimingSummary {
    pub fn from_trials(trials: &[TrialTimings]) -> Self {
        TimingSummary {
            trials: trials.len(),
            symmetry: mean(trials.iter().filter_map(|t| t.symmetry)),
            transpose: mean(trials.iter().filter_map(|t| t.transpose)),
        }
    }
}

impl fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trials: {}", self.trials)?;
        if let Some(s) = self.symmetry {
            write!(f, ", mean symmetry check: {s:.6e} s")?;
        }
        if let Some(t) = self.transpose {
            write!(f, ", mean transpose: {t:.6e} s")?;
        }
        Ok(())
    }
}
