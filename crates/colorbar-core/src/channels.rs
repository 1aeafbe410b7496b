//! Channel-order conversion between BGRA and RGBA buffers.
//!
//! Windows bitmaps and most camera SDKs hand out BGRA on little-endian
//! hosts; the finder expects red in byte 0.

/// Copy `src` (BGRA) into `dst` (RGBA). `src` and `dst` must have the same
/// length, a multiple of 4.
pub fn bgra_to_rgba(src: &[u8], dst: &mut [u8]) {
    swap_copy(src, dst);
}

/// Copy `src` (RGBA) into `dst` (BGRA).
pub fn rgba_to_bgra(src: &[u8], dst: &mut [u8]) {
    swap_copy(src, dst);
}

/// Swap bytes 0 and 2 of every pixel in place. Converts in either direction.
pub fn swap_red_blue_in_place(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

fn swap_copy(src: &[u8], dst: &mut [u8]) {
    assert_eq!(src.len(), dst.len(), "channel conversion buffers differ");
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = s[3];
    }
}
