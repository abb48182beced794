//! The analysis pipeline.
//!
//! video → sampler → frames → detector fan-out → aggregator → scoring
//! engine → [`AnalysisResult`]. Only the detector stage does network I/O.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use hygiene_detect::{build_detector, detect_batch_with_progress, FrameDetector};
use hygiene_media::{probe_video, FfmpegFrameSource, FrameSampler, FrameSource};
use hygiene_models::{AnalysisResult, AnalysisStage};
use hygiene_scoring::{Aggregator, ScoringEngine};
use tracing::{debug, Instrument};

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, AnalyzeResult};
use crate::logging::AnalysisLogger;
use crate::metrics;
use crate::progress::{ProgressCallback, ProgressReporter};

/// Runs complete hygiene analyses.
///
/// Holds no per-run state; one analyzer can serve concurrent runs.
pub struct HygieneAnalyzer {
    sampler: FrameSampler,
    detector: Arc<dyn FrameDetector>,
    aggregator: Aggregator,
    engine: ScoringEngine,
}

impl HygieneAnalyzer {
    /// Build from configuration, creating the configured detector backend.
    pub fn from_config(config: &AnalyzerConfig) -> AnalyzeResult<Self> {
        config.validate()?;
        let detector = build_detector(&config.detector, config.keywords.clone())?;
        Self::with_detector(config, detector)
    }

    /// Build with an explicit detector.
    pub fn with_detector(
        config: &AnalyzerConfig,
        detector: Arc<dyn FrameDetector>,
    ) -> AnalyzeResult<Self> {
        Ok(Self {
            sampler: FrameSampler::new(config.sampling.clone()),
            detector,
            aggregator: Aggregator::new(&config.scoring),
            engine: ScoringEngine::new(config.scoring.clone())?,
        })
    }

    pub fn sampler(&self) -> &FrameSampler {
        &self.sampler
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Analyze a video given an estimate of its duration in seconds.
    ///
    /// Fails before any detector call on an out-of-range duration, an
    /// undecodable video or a too-dark midpoint frame. Individual frame
    /// failures are excluded; only a batch where every frame fails aborts.
    pub async fn analyze(
        &self,
        source: &dyn FrameSource,
        estimated_duration_secs: f64,
        on_progress: Option<&ProgressCallback>,
    ) -> AnalyzeResult<AnalysisResult> {
        let logger = AnalysisLogger::new("analyze");
        let span = logger.create_span();

        let started = Instant::now();
        let result = self
            .run(&logger, source, estimated_duration_secs, on_progress)
            .instrument(span)
            .await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(analysis) => {
                metrics::record_analysis("ok", elapsed_ms);
                metrics::record_score(analysis.overall_score);
                logger.log_completion(&format!(
                    "score {} with {} finding(s) in {:.0}ms",
                    analysis.overall_score,
                    analysis.findings.len(),
                    elapsed_ms
                ));
            }
            Err(e) => {
                metrics::record_analysis(e.as_label(), elapsed_ms);
                logger.log_error(&e.to_string());
            }
        }

        result
    }

    /// Analyze a video file, probing its duration when none is given.
    pub async fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        estimated_duration_secs: Option<f64>,
        on_progress: Option<&ProgressCallback>,
    ) -> AnalyzeResult<AnalysisResult> {
        let path = path.as_ref();
        let duration = match estimated_duration_secs {
            Some(duration) => duration,
            None => probe_video(path).await?.duration,
        };

        let config = self.sampler.config();
        let source = FfmpegFrameSource::from_path(path, config.frame_width)?
            .with_timeout(config.extract_timeout_secs);

        self.analyze(&source, duration, on_progress).await
    }

    /// Analyze in-memory video bytes.
    pub async fn analyze_bytes(
        &self,
        video: &[u8],
        estimated_duration_secs: f64,
        on_progress: Option<&ProgressCallback>,
    ) -> AnalyzeResult<AnalysisResult> {
        // Reject before spooling the upload to disk
        self.sampler.validate_duration(estimated_duration_secs)?;

        let config = self.sampler.config();
        let source = FfmpegFrameSource::from_bytes(video, config.frame_width)?
            .with_timeout(config.extract_timeout_secs);

        self.analyze(&source, estimated_duration_secs, on_progress).await
    }

    async fn run(
        &self,
        logger: &AnalysisLogger,
        source: &dyn FrameSource,
        estimated_duration_secs: f64,
        on_progress: Option<&ProgressCallback>,
    ) -> AnalyzeResult<AnalysisResult> {
        let progress = ProgressReporter::new(on_progress);
        logger.log_start(&format!(
            "{}s video from {} using {}",
            estimated_duration_secs,
            source.name(),
            self.detector.name()
        ));

        // Sampling
        progress.enter(AnalysisStage::Sampling, "Sampling frames");
        let sampled = self
            .sampler
            .sample_with_progress(source, estimated_duration_secs, |done, total| {
                progress.step(
                    AnalysisStage::Sampling,
                    done,
                    total,
                    format!("Extracted frame {} of {}", done, total),
                )
            })
            .await?;

        if sampled.skipped > 0 {
            logger.log_warning(&format!(
                "{} planned frame(s) could not be extracted",
                sampled.skipped
            ));
        }
        logger.log_progress(&format!(
            "sampled {} frame(s), midpoint luminance {:.1}",
            sampled.frames.len(),
            sampled.midpoint_luminance
        ));

        // Detection
        progress.enter(
            AnalysisStage::Detecting,
            format!("Analyzing {} frames", sampled.frames.len()),
        );
        let outcome = detect_batch_with_progress(
            self.detector.as_ref(),
            &sampled.frames,
            |done, total| {
                progress.step(
                    AnalysisStage::Detecting,
                    done,
                    total,
                    format!("Analyzed frame {} of {}", done, total),
                )
            },
        )
        .await
        .map_err(AnalysisError::from)?;

        if outcome.failed() > 0 {
            logger.log_warning(&format!(
                "{} of {} frame detection(s) failed and were excluded",
                outcome.failed(),
                sampled.frames.len()
            ));
        }

        // Scoring
        progress.enter(AnalysisStage::Scoring, "Scoring results");
        let aggregates = self.aggregator.aggregate(&outcome.detections);
        debug!(categories = aggregates.len(), "Aggregated detections");

        // Failed frames stay in the denominator
        let total_frames = sampled.frames.len() as u32;
        let mut result = self.engine.score(&aggregates, total_frames);
        result.frames_analyzed = outcome.succeeded() as u32;
        result.frames_failed = outcome.failed() as u32;

        progress.finish("Analysis complete");
        Ok(result)
    }
}
