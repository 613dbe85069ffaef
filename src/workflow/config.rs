use std::time::Duration;

use crate::external::tool::DEFAULT_TOOL_TIMEOUT;

/// Default minimal identity for a match to be reported as the best match
pub const DEFAULT_MIN_IDENTITY: f64 = 0.5;

/// Default number of underscore-separated file name fields forming the sample id
pub const DEFAULT_SAMPLE_FIELDS: usize = 3;

/// Configuration for batch classification
#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    /// Matches below this identity are not reported as best match
    pub min_identity: f64,
    /// Number of worker threads
    pub threads: usize,
    /// Time allowed for each external tool run
    pub tool_timeout: Duration,
    /// Leading file name fields that make up the sample id
    pub sample_fields: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            min_identity: DEFAULT_MIN_IDENTITY,
            threads: 1,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            sample_fields: DEFAULT_SAMPLE_FIELDS,
        }
    }
}
