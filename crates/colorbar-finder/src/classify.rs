//! Anchor-color classification, one pixel at a time or eight at once.

use colorbar_core::CHANNELS;
use serde::{Deserialize, Serialize};

/// Pixels evaluated by one [`AnchorClassifier::classify_group`] call.
pub const GROUP_PIXELS: usize = 8;

/// Bytes covered by one pixel group.
pub const GROUP_BYTES: usize = GROUP_PIXELS * CHANNELS;

/// Thresholds that decide whether a pixel belongs to an anchor bar.
///
/// The defaults pick out saturated yellow under indoor lighting; they are
/// meant to be tuned per camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Maximum `|red - green|`.
    pub max_red_green_separation: u8,
    /// Minimum `red - blue`.
    pub min_red_blue_separation: u8,
    /// Minimum red channel value.
    pub min_red: u8,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            max_red_green_separation: 45,
            min_red_blue_separation: 50,
            min_red: 170,
        }
    }
}

/// Scalar anchor predicate.
#[inline]
pub fn is_anchor(r: u8, g: u8, b: u8, config: &ClassificationConfig) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    (r - g).abs() <= config.max_red_green_separation as i32
        && r - b >= config.min_red_blue_separation as i32
        && r >= config.min_red as i32
}

/// One bit per pixel of a group; bit `i` is pixel `i` from the left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupMask(u8);

impl GroupMask {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_set(self, pixel: usize) -> bool {
        (self.0 >> pixel) & 1 == 1
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Classifier with thresholds pre-shifted into strict comparisons so the
/// batch path needs only greater/less-than lane compares.
#[derive(Clone, Copy, Debug)]
pub struct AnchorClassifier {
    config: ClassificationConfig,
    red_green_lt: i32,
    red_blue_gt: i32,
    red_gt: i32,
}

impl AnchorClassifier {
    pub fn new(config: ClassificationConfig) -> Self {
        Self {
            config,
            red_green_lt: config.max_red_green_separation as i32 + 1,
            red_blue_gt: config.min_red_blue_separation as i32 - 1,
            red_gt: config.min_red as i32 - 1,
        }
    }

    #[inline]
    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    #[inline]
    pub fn is_anchor(&self, r: u8, g: u8, b: u8) -> bool {
        is_anchor(r, g, b, &self.config)
    }

    /// Classify `GROUP_PIXELS` consecutive RGBA pixels.
    ///
    /// Panics unless `group.len() == GROUP_BYTES`.
    #[inline]
    pub fn classify_group(&self, group: &[u8]) -> GroupMask {
        assert_eq!(group.len(), GROUP_BYTES, "pixel group must be {GROUP_BYTES} bytes");
        self.classify_group_native(group)
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    #[inline]
    fn classify_group_native(&self, group: &[u8]) -> GroupMask {
        // SAFETY: callers check the length; SSE2 is part of the x86_64 baseline.
        unsafe { self.classify_group_sse2(group) }
    }

    #[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
    #[inline]
    fn classify_group_native(&self, group: &[u8]) -> GroupMask {
        self.classify_group_scalar(group)
    }

    /// Portable lane loop; produces the same mask as the vector path.
    pub fn classify_group_scalar(&self, group: &[u8]) -> GroupMask {
        let mut bits = 0u8;
        for (i, px) in group.chunks_exact(CHANNELS).take(GROUP_PIXELS).enumerate() {
            let (r, g, b) = (px[0] as i32, px[1] as i32, px[2] as i32);
            let rg = r - g;
            let pass = rg < self.red_green_lt
                && rg > -self.red_green_lt
                && r - b > self.red_blue_gt
                && r > self.red_gt;
            bits |= (pass as u8) << i;
        }
        GroupMask(bits)
    }

    /// Four pixels per 128-bit register, channels widened to 32-bit lanes.
    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    #[inline]
    unsafe fn classify_group_sse2(&self, group: &[u8]) -> GroupMask {
        use std::arch::x86_64::{
            __m128i, _mm_and_si128, _mm_castsi128_ps, _mm_cmpgt_epi32, _mm_cmplt_epi32,
            _mm_loadu_si128, _mm_movemask_ps, _mm_set1_epi32, _mm_srli_epi32, _mm_sub_epi32,
        };

        let low_byte = _mm_set1_epi32(0xFF);
        let rg_lt = _mm_set1_epi32(self.red_green_lt);
        let rg_gt = _mm_set1_epi32(-self.red_green_lt);
        let rb_gt = _mm_set1_epi32(self.red_blue_gt);
        let red_gt = _mm_set1_epi32(self.red_gt);

        let mut bits = 0u8;
        for half in 0..2 {
            let v = _mm_loadu_si128(group.as_ptr().add(half * 16) as *const __m128i);
            let reds = _mm_and_si128(v, low_byte);
            let greens = _mm_and_si128(_mm_srli_epi32::<8>(v), low_byte);
            let blues = _mm_and_si128(_mm_srli_epi32::<16>(v), low_byte);

            let rg = _mm_sub_epi32(reds, greens);
            let rb = _mm_sub_epi32(reds, blues);

            let rg_ok = _mm_and_si128(_mm_cmplt_epi32(rg, rg_lt), _mm_cmpgt_epi32(rg, rg_gt));
            let rest_ok = _mm_and_si128(_mm_cmpgt_epi32(rb, rb_gt), _mm_cmpgt_epi32(reds, red_gt));
            let pass = _mm_and_si128(rg_ok, rest_ok);

            let lanes = _mm_movemask_ps(_mm_castsi128_ps(pass)) as u8;
            bits |= lanes << (half * 4);
        }
        GroupMask(bits)
    }
}
