use crate::classify::ClassificationConfig;
use serde::{Deserialize, Serialize};

/// Configuration shared by every request in a detection pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectParams {
    /// Anchor color thresholds.
    pub classification: ClassificationConfig,
    /// Largest gap, in pixels, across which anchor runs still merge into one
    /// box.
    pub max_spacing: u32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            classification: ClassificationConfig::default(),
            max_spacing: 2,
        }
    }
}
