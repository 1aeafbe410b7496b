//! Row-major RGBA8 pixel buffers.

/// Interleaved channels per pixel.
pub const CHANNELS: usize = 4;

/// Errors produced when wrapping a raw pixel buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid RGBA buffer length (expected {expected} bytes, got {got})")]
    BufferLength { expected: usize, got: usize },

    #[error("invalid RGBA image dimensions (width={width}, height={height})")]
    Dimensions { width: usize, height: usize },
}

fn expected_len(width: usize, height: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(ImageError::Dimensions { width, height })
}

fn check_len(width: usize, height: usize, got: usize) -> Result<(), ImageError> {
    let expected = expected_len(width, height)?;
    if got != expected {
        return Err(ImageError::BufferLength { expected, got });
    }
    Ok(())
}

/// Borrowed RGBA8 image. Channel order is a caller convention; the finder
/// reads byte 0 as red, 1 as green and 2 as blue.
#[derive(Clone, Copy, Debug)]
pub struct RgbaImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h*4
}

impl<'a> RgbaImageView<'a> {
    /// Wrap `data`, checking that it holds exactly `width * height` pixels.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Bytes of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let stride = self.width * CHANNELS;
        &self.data[y * stride..(y + 1) * stride]
    }

    /// `[r, g, b]` at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn rgb(&self, x: i32, y: i32) -> [u8; 3] {
        let idx = (y as usize * self.width + x as usize) * CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

/// Mutable RGBA8 image, used by debug drawing.
#[derive(Debug)]
pub struct RgbaImageViewMut<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a mut [u8],
}

impl<'a> RgbaImageViewMut<'a> {
    pub fn new(width: usize, height: usize, data: &'a mut [u8]) -> Result<Self, ImageError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn as_view(&self) -> RgbaImageView<'_> {
        RgbaImageView {
            width: self.width,
            height: self.height,
            data: &*self.data,
        }
    }

    /// Write one pixel; coordinates outside the image are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * CHANNELS;
        self.data[idx..idx + CHANNELS].copy_from_slice(&rgba);
    }
}

/// Owned RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbaImage {
    /// Image filled with a single color.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> RgbaImageView<'_> {
        RgbaImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    pub fn view_mut(&mut self) -> RgbaImageViewMut<'_> {
        RgbaImageViewMut {
            width: self.width,
            height: self.height,
            data: &mut self.data,
        }
    }

    /// Fill the inclusive rectangle `[x0, x1] x [y0, y1]`, clipped to the image.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, rgba: [u8; 4]) {
        let mut view = self.view_mut();
        for y in y0..=y1 {
            for x in x0..=x1 {
                view.put(x, y, rgba);
            }
        }
    }
}
