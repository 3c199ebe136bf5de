//! Configuration for histogram construction

use colstats_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bucket count used when none is configured
pub const DEFAULT_NUM_BUCKETS: usize = 100;

/// Sampling rate below which per-bucket distinct counts are jackknife corrected
///
/// At or above this rate the raw sample count is closer to the truth than
/// the estimator.
pub const DEFAULT_DISTINCT_ESTIMATOR_THRESHOLD: f64 = 0.8;

/// Settings for building equi-height histograms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistogramConfig {
    /// Requested number of buckets
    pub num_buckets: usize,

    /// Sampling rate below which the distinct-value estimator is applied
    pub distinct_estimator_threshold: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            num_buckets: DEFAULT_NUM_BUCKETS,
            distinct_estimator_threshold: DEFAULT_DISTINCT_ESTIMATOR_THRESHOLD,
        }
    }
}

impl HistogramConfig {
    /// Config with the given bucket count and default everything else
    pub fn with_buckets(num_buckets: usize) -> Self {
        Self {
            num_buckets,
            ..Default::default()
        }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.num_buckets == 0 {
            return Err(Error::InvalidArgument(
                "num_buckets must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.distinct_estimator_threshold) {
            return Err(Error::InvalidArgument(format!(
                "distinct_estimator_threshold {} must be in [0, 1]",
                self.distinct_estimator_threshold
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
