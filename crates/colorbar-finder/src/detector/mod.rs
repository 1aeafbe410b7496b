//! Bar code detection pipeline.
//!
//! One pass per frame extracts anchor runs, clusters them into boxes and
//! samples every box pair. The resulting appearance set is then ranked
//! independently for each search request.

mod params;
mod pipeline;
mod result;

pub use params::DetectParams;
pub use pipeline::BarCodeFinder;
pub use result::FrameSummary;
