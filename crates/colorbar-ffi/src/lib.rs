//! C ABI for the colorbar finder.
//!
//! The boundary mirrors the library's allocation model: the host allocates
//! one arena and one request array up front, initializes request slots, and
//! then calls [`cb_detect`] once per frame. No function unwinds into the
//! caller; failures are reported as `false`, `-1` or a null pointer.
//!
//! Pixel buffers are tightly packed, `width * height * 4` bytes.

use colorbar::core::{
    bgra_to_rgba, rgba_to_bgra, swap_red_blue_in_place, RgbaImageView, RgbaImageViewMut, CHANNELS,
};
use colorbar::finder::{
    AnchorClassifier, ArenaCapacities, BarCodeFinder, BarCodePattern, ClassificationConfig,
    DetectParams, ScratchArena, SearchRequest, GROUP_PIXELS,
};
use colorbar::overlay::paint_anchor_pixels;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

/// Anchor color thresholds, passed by value.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CbClassificationConfig {
    pub max_red_green_separation: u8,
    pub min_red_blue_separation: u8,
    pub min_red: u8,
}

impl From<CbClassificationConfig> for ClassificationConfig {
    fn from(c: CbClassificationConfig) -> Self {
        Self {
            max_red_green_separation: c.max_red_green_separation,
            min_red_blue_separation: c.min_red_blue_separation,
            min_red: c.min_red,
        }
    }
}

/// Opaque scratch arena.
pub struct CbArena {
    inner: ScratchArena,
}

/// Opaque array of request slots; each slot is empty until initialized.
pub struct CbRequestArray {
    slots: Vec<Option<SearchRequest>>,
}

fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(fallback)
}

fn buffer_len(width: i32, height: i32) -> Option<usize> {
    let w = usize::try_from(width).ok()?;
    let h = usize::try_from(height).ok()?;
    w.checked_mul(h)?.checked_mul(CHANNELS)
}

/// Allocate an arena with the given buffer capacities.
///
/// Returns null when any buffer cannot be allocated.
#[no_mangle]
pub extern "C" fn cb_arena_create(
    scan_lines: usize,
    boxes: usize,
    cluster_indices: usize,
    appearances: usize,
    ranking: usize,
) -> *mut CbArena {
    guard(std::ptr::null_mut(), || {
        let caps = ArenaCapacities {
            scan_lines,
            boxes,
            cluster_indices,
            appearances,
            ranking,
        };
        match ScratchArena::try_new(caps) {
            Ok(inner) => Box::into_raw(Box::new(CbArena { inner })),
            Err(e) => {
                log::debug!("cb_arena_create: {e}");
                std::ptr::null_mut()
            }
        }
    })
}

/// Free an arena from [`cb_arena_create`]. Null is ignored.
///
/// # Safety
/// `arena` must be null or a pointer returned by [`cb_arena_create`] that
/// has not been freed.
#[no_mangle]
pub unsafe extern "C" fn cb_arena_free(arena: *mut CbArena) {
    if !arena.is_null() {
        drop(Box::from_raw(arena));
    }
}

/// Allocate `count` empty request slots. Returns null on allocation failure.
#[no_mangle]
pub extern "C" fn cb_requests_create(count: usize) -> *mut CbRequestArray {
    guard(std::ptr::null_mut(), || {
        let mut slots = Vec::new();
        if slots.try_reserve_exact(count).is_err() {
            return std::ptr::null_mut();
        }
        slots.resize_with(count, || None);
        Box::into_raw(Box::new(CbRequestArray { slots }))
    })
}

/// Free a request array and every request it holds. Null is ignored.
///
/// # Safety
/// `array` must be null or a pointer returned by [`cb_requests_create`] that
/// has not been freed.
#[no_mangle]
pub unsafe extern "C" fn cb_requests_free(array: *mut CbRequestArray) {
    if !array.is_null() {
        drop(Box::from_raw(array));
    }
}

/// Initialize slot `index` with a pattern of `color_count` ASCII codes
/// (`'R'`, `'G'`, `'B'`) and a result buffer of `capacity` matches.
///
/// Replaces any request already in the slot. Returns `false` for an invalid
/// index, pattern or allocation failure.
///
/// # Safety
/// `array` must come from [`cb_requests_create`]; `colors` must point to
/// `color_count` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn cb_request_init(
    array: *mut CbRequestArray,
    index: usize,
    capacity: usize,
    color_count: i32,
    colors: *const u8,
    min_match_score: f32,
    min_line_distance: i32,
) -> bool {
    if array.is_null() || colors.is_null() || color_count <= 0 {
        return false;
    }
    let array = &mut *array;
    let codes = slice::from_raw_parts(colors, color_count as usize);
    guard(false, || {
        let Some(slot) = array.slots.get_mut(index) else {
            return false;
        };
        let pattern = match BarCodePattern::from_ascii(codes) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("cb_request_init: {e}");
                return false;
            }
        };
        let min_len = u32::try_from(min_line_distance).unwrap_or(0);
        match SearchRequest::try_new(pattern, min_len, min_match_score, capacity) {
            Ok(request) => {
                *slot = Some(request);
                true
            }
            Err(e) => {
                log::debug!("cb_request_init: {e}");
                false
            }
        }
    })
}

/// Drop the request in slot `index`, leaving the slot empty.
///
/// # Safety
/// `array` must be null or come from [`cb_requests_create`].
#[no_mangle]
pub unsafe extern "C" fn cb_request_release(array: *mut CbRequestArray, index: usize) {
    if let Some(array) = array.as_mut() {
        if let Some(slot) = array.slots.get_mut(index) {
            *slot = None;
        }
    }
}

/// Run one detection pass over an RGBA frame and fill every initialized
/// request.
///
/// Returns `false`, leaving requests untouched, for null pointers,
/// non-positive sizes, a width that is not a multiple of 8, or requests
/// whose patterns differ in length. With no initialized request this is a
/// successful no-op.
///
/// # Safety
/// `rgba` must point to `width * height * 4` readable bytes; `requests` and
/// `arena` must come from their create functions.
#[no_mangle]
pub unsafe extern "C" fn cb_detect(
    rgba: *const u8,
    width: i32,
    height: i32,
    config: CbClassificationConfig,
    max_spacing: i32,
    requests: *mut CbRequestArray,
    arena: *mut CbArena,
) -> bool {
    if rgba.is_null() || requests.is_null() || arena.is_null() || width <= 0 || height <= 0 {
        return false;
    }
    let Some(len) = buffer_len(width, height) else {
        return false;
    };
    if width as usize % GROUP_PIXELS != 0 {
        log::debug!("cb_detect: width {width} is not a multiple of {GROUP_PIXELS}");
        return false;
    }
    let data = slice::from_raw_parts(rgba, len);
    let requests = &mut *requests;
    let arena = &mut (*arena).inner;

    guard(false, || {
        let Some(section_count) = requests.slots.iter().flatten().next().map(|r| r.pattern().len())
        else {
            return true;
        };
        if !requests
            .slots
            .iter()
            .flatten()
            .all(|r| r.pattern().len() == section_count)
        {
            log::debug!("cb_detect: requests have different pattern lengths");
            return false;
        }

        let Ok(image) = RgbaImageView::new(width as usize, height as usize, data) else {
            return false;
        };
        let finder = BarCodeFinder::new(DetectParams {
            classification: config.into(),
            max_spacing: u32::try_from(max_spacing).unwrap_or(0),
        });
        finder.analyze_frame(&image, section_count, arena);
        for request in requests.slots.iter_mut().flatten() {
            arena.evaluate_request(request);
        }
        true
    })
}

/// Number of matches held by slot `index`, or `-1` for an invalid or empty
/// slot.
///
/// # Safety
/// `array` must be null or come from [`cb_requests_create`].
#[no_mangle]
pub unsafe extern "C" fn cb_request_match_count(array: *const CbRequestArray, index: usize) -> i32 {
    array
        .as_ref()
        .and_then(|a| a.slots.get(index))
        .and_then(Option::as_ref)
        .map_or(-1, |r| i32::try_from(r.len()).unwrap_or(i32::MAX))
}

/// Read match `match_index` of request `request_index`.
///
/// `points` receives 12 integers: segment start x/y, segment end x/y, then
/// left/top/right/bottom of the first and of the second anchor box.
/// Returns `false` when the indices are out of range.
///
/// # Safety
/// `array` must come from [`cb_requests_create`]; `points` must be writable
/// for 12 `i32`s and `score` for one `f32`.
#[no_mangle]
pub unsafe extern "C" fn cb_request_read_match(
    array: *const CbRequestArray,
    request_index: usize,
    match_index: usize,
    points: *mut i32,
    score: *mut f32,
) -> bool {
    if points.is_null() || score.is_null() {
        return false;
    }
    let Some(m) = array
        .as_ref()
        .and_then(|a| a.slots.get(request_index))
        .and_then(Option::as_ref)
        .and_then(|r| r.get(match_index))
    else {
        return false;
    };

    let a = m.appearance;
    let (s, f, b) = (a.segment, a.first_box, a.second_box);
    let values = [
        s.start.x, s.start.y, s.end.x, s.end.y, f.left, f.top, f.right, f.bottom, b.left, b.top,
        b.right, b.bottom,
    ];
    slice::from_raw_parts_mut(points, values.len()).copy_from_slice(&values);
    *score = m.score;
    true
}

/// Reorder one buffer of 4-channel pixels, in place when `src == dst`.
unsafe fn reorder(
    src: *const u8,
    dst: *mut u8,
    width: i32,
    height: i32,
    copy: fn(&[u8], &mut [u8]),
) -> bool {
    if src.is_null() || dst.is_null() {
        return false;
    }
    let Some(len) = buffer_len(width, height) else {
        return false;
    };
    if std::ptr::eq(src, dst) {
        swap_red_blue_in_place(slice::from_raw_parts_mut(dst, len));
    } else {
        copy(slice::from_raw_parts(src, len), slice::from_raw_parts_mut(dst, len));
    }
    true
}

/// Convert BGRA to RGBA. `src` and `dst` may be the same buffer but must not
/// otherwise overlap.
///
/// # Safety
/// Both pointers must cover `width * height * 4` bytes.
#[no_mangle]
pub unsafe extern "C" fn cb_bgra_to_rgba(src: *const u8, dst: *mut u8, width: i32, height: i32) -> bool {
    reorder(src, dst, width, height, bgra_to_rgba)
}

/// Convert RGBA to BGRA. `src` and `dst` may be the same buffer but must not
/// otherwise overlap.
///
/// # Safety
/// Both pointers must cover `width * height * 4` bytes.
#[no_mangle]
pub unsafe extern "C" fn cb_rgba_to_bgra(src: *const u8, dst: *mut u8, width: i32, height: i32) -> bool {
    reorder(src, dst, width, height, rgba_to_bgra)
}

/// Copy `src` into `dst`, replacing anchor-colored pixels with `(r, g, b, a)`.
/// `src` and `dst` may be the same buffer.
///
/// # Safety
/// Both pointers must cover `width * height * 4` bytes.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn cb_paint_anchor_pixels(
    src: *const u8,
    dst: *mut u8,
    width: i32,
    height: i32,
    config: CbClassificationConfig,
    r: u8,
    g: u8,
    b: u8,
    a: u8,
) -> bool {
    if src.is_null() || dst.is_null() {
        return false;
    }
    let Some(len) = buffer_len(width, height) else {
        return false;
    };
    if !std::ptr::eq(src, dst) {
        std::ptr::copy_nonoverlapping(src, dst, len);
    }
    let data = slice::from_raw_parts_mut(dst, len);
    guard(false, || {
        let Ok(mut image) = RgbaImageViewMut::new(width as usize, height as usize, data) else {
            return false;
        };
        let classifier = AnchorClassifier::new(config.into());
        paint_anchor_pixels(&mut image, &classifier, [r, g, b, a]);
        true
    })
}
