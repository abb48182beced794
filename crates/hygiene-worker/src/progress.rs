//! Progress reporting for analysis runs.

use std::sync::Mutex;

use hygiene_models::{AnalysisProgress, AnalysisStage};

/// Callback type for progress updates.
pub type ProgressCallback = dyn Fn(AnalysisProgress) + Send + Sync;

/// Share of the overall percentage given to each stage.
const SAMPLING_SPAN: (u8, u8) = (0, 40);
const DETECTING_SPAN: (u8, u8) = (40, 90);
const SCORING_SPAN: (u8, u8) = (90, 100);

fn span(stage: AnalysisStage) -> (u8, u8) {
    match stage {
        AnalysisStage::Sampling => SAMPLING_SPAN,
        AnalysisStage::Detecting => DETECTING_SPAN,
        AnalysisStage::Scoring => SCORING_SPAN,
    }
}

/// Maps stage-local progress onto one overall percentage and forwards it.
///
/// Reported percentages never decrease, even if stage callbacks arrive
/// out of order.
pub struct ProgressReporter<'a> {
    callback: Option<&'a ProgressCallback>,
    last: Mutex<u8>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            callback,
            last: Mutex::new(0),
        }
    }

    /// Report `done` of `total` steps within `stage`.
    pub fn step(&self, stage: AnalysisStage, done: usize, total: usize, message: impl Into<String>) {
        let (start, end) = span(stage);
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).clamp(0.0, 1.0)
        };
        let percent = start as f64 + fraction * (end - start) as f64;
        self.emit(stage, percent.floor() as u8, message.into());
    }

    /// Report the start of `stage`.
    pub fn enter(&self, stage: AnalysisStage, message: impl Into<String>) {
        self.emit(stage, span(stage).0, message.into());
    }

    /// Report the end of the run.
    pub fn finish(&self, message: impl Into<String>) {
        self.emit(AnalysisStage::Scoring, 100, message.into());
    }

    fn emit(&self, stage: AnalysisStage, percent: u8, message: String) {
        let Some(callback) = self.callback else {
            return;
        };

        // Held across the callback so concurrent reports stay ordered
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let percent = percent.max(*last).min(100);
        *last = percent;
        callback(AnalysisProgress::new(stage, percent, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<AnalysisProgress>>>, Box<ProgressCallback>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: Box<ProgressCallback> = Box::new(move |p| sink.lock().unwrap().push(p));
        (seen, callback)
    }

    #[test]
    fn test_stage_spans() {
        let (seen, callback) = recorder();
        let reporter = ProgressReporter::new(Some(callback.as_ref()));

        reporter.enter(AnalysisStage::Sampling, "start");
        reporter.step(AnalysisStage::Sampling, 5, 10, "half");
        reporter.step(AnalysisStage::Detecting, 10, 10, "detected");
        reporter.finish("done");

        let percents: Vec<u8> = seen.lock().unwrap().iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![0, 20, 90, 100]);
    }

    #[test]
    fn test_never_decreases() {
        let (seen, callback) = recorder();
        let reporter = ProgressReporter::new(Some(callback.as_ref()));

        reporter.step(AnalysisStage::Detecting, 8, 10, "late");
        reporter.step(AnalysisStage::Detecting, 2, 10, "early");
        reporter.enter(AnalysisStage::Sampling, "backwards");

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(seen.last().map(|p| p.stage), Some(AnalysisStage::Sampling));
    }

    #[test]
    fn test_zero_total_counts_as_complete() {
        let (seen, callback) = recorder();
        let reporter = ProgressReporter::new(Some(callback.as_ref()));
        reporter.step(AnalysisStage::Sampling, 0, 0, "nothing planned");
        assert_eq!(seen.lock().unwrap()[0].percent, 40);
    }

    #[test]
    fn test_without_callback_is_noop() {
        let reporter = ProgressReporter::new(None);
        reporter.finish("done");
    }
}
