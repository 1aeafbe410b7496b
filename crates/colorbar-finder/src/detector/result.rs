use serde::{Deserialize, Serialize};

/// Stage counts of one detection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub scan_lines: usize,
    pub boxes: usize,
    /// Boxes whose merge was cut short by the cluster index scratch.
    pub incomplete_boxes: usize,
    pub appearances: usize,
}
