use colorbar_ffi::*;

const DEFAULT_CONFIG: CbClassificationConfig = CbClassificationConfig {
    max_red_green_separation: 45,
    min_red_blue_separation: 50,
    min_red: 170,
};

const W: usize = 96;
const H: usize = 40;

fn marker_frame() -> Vec<u8> {
    let mut data = [90u8, 90, 90, 255].repeat(W * H);
    let mut fill = |x0: usize, y0: usize, x1: usize, y1: usize, c: [u8; 4]| {
        for y in y0..=y1 {
            for x in x0..=x1 {
                let i = (y * W + x) * 4;
                data[i..i + 4].copy_from_slice(&c);
            }
        }
    };
    fill(8, 10, 15, 29, [235, 215, 25, 255]);
    fill(72, 10, 79, 29, [235, 215, 25, 255]);
    fill(16, 15, 33, 24, [215, 35, 30, 255]);
    fill(34, 15, 52, 24, [30, 190, 40, 255]);
    fill(53, 15, 71, 24, [25, 40, 210, 255]);
    data
}

struct Session {
    arena: *mut CbArena,
    requests: *mut CbRequestArray,
}

impl Session {
    fn new(slots: usize) -> Self {
        let arena = cb_arena_create(4096, 256, 1024, 1024, 256);
        let requests = cb_requests_create(slots);
        assert!(!arena.is_null() && !requests.is_null());
        Self { arena, requests }
    }

    fn init(&self, index: usize, pattern: &[u8], capacity: usize) -> bool {
        unsafe {
            cb_request_init(
                self.requests,
                index,
                capacity,
                pattern.len() as i32,
                pattern.as_ptr(),
                0.1,
                8,
            )
        }
    }

    fn detect(&self, frame: &[u8], width: usize) -> bool {
        unsafe {
            cb_detect(
                frame.as_ptr(),
                width as i32,
                (frame.len() / 4 / width) as i32,
                DEFAULT_CONFIG,
                2,
                self.requests,
                self.arena,
            )
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        unsafe {
            cb_requests_free(self.requests);
            cb_arena_free(self.arena);
        }
    }
}

#[test]
fn detects_and_reads_match() {
    let frame = marker_frame();
    let s = Session::new(2);
    assert!(s.init(0, b"RGB", 8));
    assert!(s.detect(&frame, W));

    unsafe {
        assert_eq!(cb_request_match_count(s.requests, 0), 1);
        assert_eq!(cb_request_match_count(s.requests, 1), -1);

        let mut points = [0i32; 12];
        let mut score = 0.0f32;
        assert!(cb_request_read_match(
            s.requests,
            0,
            0,
            points.as_mut_ptr(),
            &mut score
        ));
        assert_eq!(points, [16, 19, 71, 19, 8, 10, 15, 29, 72, 10, 79, 29]);
        assert!(score > 0.9);
        assert!(!cb_request_read_match(
            s.requests,
            0,
            1,
            points.as_mut_ptr(),
            &mut score
        ));
    }
}

#[test]
fn rejects_bad_requests_and_frames() {
    let frame = marker_frame();
    let s = Session::new(2);
    assert!(!s.init(0, b"RGQ", 8));
    assert!(!s.init(5, b"RGB", 8));
    assert!(s.init(0, b"RGB", 8));
    assert!(s.init(1, b"RG", 8));
    // Pattern lengths differ.
    assert!(!s.detect(&frame, W));

    unsafe { cb_request_release(s.requests, 1) };
    assert!(s.detect(&frame, W));
    // Width not a multiple of 8.
    assert!(!s.detect(&frame[..90 * 40 * 4], 90));
}

#[test]
fn detect_without_requests_is_a_no_op() {
    let frame = marker_frame();
    let s = Session::new(3);
    assert!(s.detect(&frame, W));
    unsafe { assert_eq!(cb_request_match_count(s.requests, 0), -1) };
}

#[test]
fn channel_conversion_in_place_and_copy() {
    let bgra = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let mut rgba = vec![0u8; 8];
    unsafe {
        assert!(cb_bgra_to_rgba(bgra.as_ptr(), rgba.as_mut_ptr(), 2, 1));
    }
    assert_eq!(rgba, vec![3, 2, 1, 4, 7, 6, 5, 8]);

    unsafe {
        let p = rgba.as_mut_ptr();
        assert!(cb_rgba_to_bgra(p, p, 2, 1));
    }
    assert_eq!(rgba, bgra);
    unsafe { assert!(!cb_rgba_to_bgra(std::ptr::null(), rgba.as_mut_ptr(), 2, 1)) };
}

#[test]
fn paints_anchor_pixels_into_copy() {
    let frame = marker_frame();
    let mut out = vec![0u8; frame.len()];
    unsafe {
        assert!(cb_paint_anchor_pixels(
            frame.as_ptr(),
            out.as_mut_ptr(),
            W as i32,
            H as i32,
            DEFAULT_CONFIG,
            0,
            255,
            0,
            255
        ));
    }
    let px = |x: usize, y: usize| &out[(y * W + x) * 4..(y * W + x) * 4 + 4];
    assert_eq!(px(10, 12), &[0, 255, 0, 255]);
    assert_eq!(px(20, 20), &frame[(20 * W + 20) * 4..(20 * W + 20) * 4 + 4]);
}

#[test]
fn null_handles_are_tolerated() {
    unsafe {
        cb_arena_free(std::ptr::null_mut());
        cb_requests_free(std::ptr::null_mut());
        cb_request_release(std::ptr::null_mut(), 0);
        assert_eq!(cb_request_match_count(std::ptr::null(), 0), -1);
    }
}
