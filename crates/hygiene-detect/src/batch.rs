//! Fan-out over sampled frames.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::future::join_all;
use hygiene_models::{Frame, FrameDetections};
use tracing::{debug, info, warn};

use crate::detector::FrameDetector;
use crate::error::{DetectError, DetectResult, FailureKind};
use crate::metrics;

/// A frame whose detection call failed and was excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFailure {
    pub frame_index: u32,
    pub timestamp_secs: u32,
    pub kind: FailureKind,
    pub message: String,
}

/// Settled results of one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successful detections, in frame order
    pub detections: Vec<FrameDetections>,
    /// Failed frames, in frame order
    pub failures: Vec<FrameFailure>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.detections.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Detect every frame concurrently and collect all settled results.
pub async fn detect_batch(
    detector: &dyn FrameDetector,
    frames: &[Frame],
) -> DetectResult<BatchOutcome> {
    detect_batch_with_progress(detector, frames, |_, _| {}).await
}

/// Like [`detect_batch`], calling `on_settled(done, total)` as each call
/// settles. `done` never decreases.
///
/// Every frame is dispatched at once and the batch waits for all of them;
/// one failure never cancels the others. Failed frames are left out of
/// the outcome. If every frame fails the batch fails with
/// [`DetectError::Unavailable`] classified by the first frame's error.
pub async fn detect_batch_with_progress<F>(
    detector: &dyn FrameDetector,
    frames: &[Frame],
    on_settled: F,
) -> DetectResult<BatchOutcome>
where
    F: Fn(usize, usize) + Send + Sync,
{
    let total = frames.len();
    let settled = AtomicUsize::new(0);
    let backend = detector.name();

    info!(backend, frames = total, "Dispatching frame detections");

    let calls = frames.iter().map(|frame| {
        let settled = &settled;
        let on_settled = &on_settled;
        async move {
            let started = Instant::now();
            let result = detector.detect(frame).await;
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            metrics::record_frame(
                backend,
                if result.is_ok() { "ok" } else { "error" },
                latency_ms,
            );

            let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
            on_settled(done, total);

            (frame, result)
        }
    });

    let results = join_all(calls).await;

    let mut outcome = BatchOutcome::default();
    let mut first_error: Option<DetectError> = None;

    for (frame, result) in results {
        match result {
            Ok(detections) => {
                debug!(
                    frame = frame.index,
                    flagged = detections.detected_count(),
                    "Frame detected"
                );
                outcome.detections.push(detections);
            }
            Err(e) => {
                warn!(
                    frame = frame.index,
                    timestamp = frame.timestamp_secs,
                    kind = %e.kind(),
                    "Frame detection failed, excluding: {}",
                    e
                );
                outcome.failures.push(FrameFailure {
                    frame_index: frame.index,
                    timestamp_secs: frame.timestamp_secs,
                    kind: e.kind(),
                    message: e.to_string(),
                });
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if total > 0 && outcome.detections.is_empty() {
        let (kind, message) = first_error
            .map(|e| (e.kind(), e.to_string()))
            .unwrap_or((FailureKind::Unknown, "no detections returned".to_string()));

        return Err(DetectError::Unavailable {
            kind,
            attempted: total,
            message,
        });
    }

    info!(
        backend,
        succeeded = outcome.succeeded(),
        failed = outcome.failed(),
        "Frame detections settled"
    );

    Ok(outcome)
}
