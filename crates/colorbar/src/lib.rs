//! High-level facade crate for the `colorbar` workspace.
//!
//! This crate provides:
//! - re-exports of the finder and the shared image/logging types,
//! - debug overlays that draw pipeline outputs back into an image,
//! - JSON configuration and detection reports,
//! - (feature `image`) helpers that decode files with the `image` crate and
//!   run detection end to end.
//!
//! ## Quickstart
//!
//! ```no_run
//! use colorbar::detect;
//! use colorbar::io::DetectConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_rgba("frame.png")?;
//! let patterns = ["RGBGR".parse()?];
//! let (summary, requests) = detect::detect_patterns(&img, &DetectConfig::default(), &patterns)?;
//! println!("{} boxes, best: {:?}", summary.boxes, requests[0].best().map(|m| m.score));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `colorbar::core`: RGBA views, channel reordering, logger setup.
//! - `colorbar::finder`: the detection pipeline and its stage functions.
//! - `colorbar::overlay`: debug drawing.
//! - `colorbar::io`: JSON config and report types.
//! - `colorbar::detect` (feature `image`): file loading and one-shot detection.

pub use colorbar_core as core;
pub use colorbar_finder as finder;

pub use colorbar_finder::{
    BarCodeFinder, BarCodePattern, BarColor, DetectParams, FrameSummary, ScratchArena,
    SearchRequest,
};

pub mod io;
pub mod overlay;

#[cfg(feature = "image")]
pub mod detect;
