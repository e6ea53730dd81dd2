pub mod timing;
pub use timing::{TimingSummary, TrialTimings};
