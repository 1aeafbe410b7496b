//! Core types shared by the colorbar crates.
//!
//! This crate is intentionally small. It provides the RGBA pixel buffer
//! views the finder reads from, the stateless channel-order helpers used at
//! the boundary with BGRA producers, and logger setup.

mod channels;
mod image;
mod logger;

pub use channels::{bgra_to_rgba, rgba_to_bgra, swap_red_blue_in_place};
pub use image::{ImageError, RgbaImage, RgbaImageView, RgbaImageViewMut, CHANNELS};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
