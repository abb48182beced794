//! Analyzer configuration.

use hygiene_detect::{DetectorClientConfig, KeywordTable};
use hygiene_media::SamplingConfig;
use hygiene_scoring::ScoringConfig;

use crate::error::{AnalysisError, AnalyzeResult};

/// Everything needed to build a [`HygieneAnalyzer`](crate::HygieneAnalyzer).
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub sampling: SamplingConfig,
    pub detector: DetectorClientConfig,
    /// Used by label-list backends only
    pub keywords: KeywordTable,
    pub scoring: ScoringConfig,
}

impl AnalyzerConfig {
    /// Create config from environment variables.
    ///
    /// The scoring table is not environment-driven; it keeps its defaults.
    pub fn from_env() -> AnalyzeResult<Self> {
        let detector = DetectorClientConfig::from_env()?;

        let mut keywords = KeywordTable::default();
        if let Some(min_score) = std::env::var("DETECTOR_MIN_LABEL_SCORE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
        {
            if !(0.0..=1.0).contains(&min_score) {
                return Err(AnalysisError::config(format!(
                    "DETECTOR_MIN_LABEL_SCORE must be between 0 and 1, got {}",
                    min_score
                )));
            }
            keywords = keywords.with_min_score(min_score);
        }

        let config = Self {
            sampling: SamplingConfig::from_env(),
            detector,
            keywords,
            scoring: ScoringConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would make every run fail.
    pub fn validate(&self) -> AnalyzeResult<()> {
        let sampling = &self.sampling;
        if sampling.min_duration_secs > sampling.max_duration_secs {
            return Err(AnalysisError::config(format!(
                "minimum duration {}s exceeds maximum {}s",
                sampling.min_duration_secs, sampling.max_duration_secs
            )));
        }
        if sampling.max_frames == 0 {
            return Err(AnalysisError::config("max_frames must be at least 1"));
        }
        self.scoring.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        AnalyzerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_inverted_duration_range_rejected() {
        let mut config = AnalyzerConfig::default();
        config.sampling.min_duration_secs = 400;
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_invalid_scoring_table_rejected() {
        let mut config = AnalyzerConfig::default();
        config.scoring.low_score_threshold = 50.0;
        config.validate().unwrap();

        config.scoring.policies.clear();
        assert!(matches!(config.validate(), Err(AnalysisError::Scoring(_))));
    }
}
