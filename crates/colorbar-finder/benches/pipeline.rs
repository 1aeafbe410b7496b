use colorbar_finder::{
    ArenaCapacities, AnchorClassifier, BarCodeFinder, ClassificationConfig, DetectParams,
    RgbaImage, ScratchArena, SearchRequest, GROUP_BYTES,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const YELLOW: [u8; 4] = [235, 215, 25, 255];
const STRIPES: [[u8; 4]; 3] = [[215, 35, 30, 255], [30, 190, 40, 255], [25, 40, 210, 255]];

/// 640x480 frame with a grid of RGB markers on a noisy grey background.
fn synthetic_frame() -> RgbaImage {
    let (w, h) = (640usize, 480usize);
    let mut img = RgbaImage::filled(w, h, [0, 0, 0, 255]);
    let mut state = 0x2545_f491_4f6c_dd1du64;
    for px in img.data.chunks_exact_mut(4) {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let v = 60 + (state % 80) as u8;
        px[..3].copy_from_slice(&[v, v, v]);
    }

    for row in 0..4 {
        for col in 0..3 {
            let x = 24 + col * 200;
            let y = 24 + row * 110;
            img.fill_rect(x, y, x + 11, y + 39, YELLOW);
            img.fill_rect(x + 132, y, x + 143, y + 39, YELLOW);
            for (i, c) in STRIPES.iter().enumerate() {
                let x0 = x + 12 + i as i32 * 40;
                img.fill_rect(x0, y + 10, x0 + 39, y + 29, *c);
            }
        }
    }
    img
}

fn bench_classify(c: &mut Criterion) {
    let img = synthetic_frame();
    let classifier = AnchorClassifier::new(ClassificationConfig::default());
    c.bench_function("classify_groups_640x480", |b| {
        b.iter(|| {
            let mut hits = 0u32;
            for group in img.data.chunks_exact(GROUP_BYTES) {
                hits += classifier.classify_group(black_box(group)).count();
            }
            black_box(hits)
        })
    });
    c.bench_function("classify_scalar_640x480", |b| {
        b.iter(|| {
            let mut hits = 0u32;
            for group in img.data.chunks_exact(GROUP_BYTES) {
                hits += classifier.classify_group_scalar(black_box(group)).count();
            }
            black_box(hits)
        })
    });
}

fn bench_detect(c: &mut Criterion) {
    let img = synthetic_frame();
    let finder = BarCodeFinder::new(DetectParams::default());
    let mut arena = ScratchArena::try_new(ArenaCapacities::for_image(img.width, img.height))
        .expect("arena");
    let mut requests = [
        SearchRequest::try_new("RGB".parse().expect("pattern"), 8, 0.1, 16).expect("request"),
        SearchRequest::try_new("GGB".parse().expect("pattern"), 8, 0.1, 16).expect("request"),
    ];

    c.bench_function("detect_640x480_12_markers", |b| {
        b.iter(|| {
            let summary = finder.detect(black_box(&img.view()), &mut requests, &mut arena);
            black_box(summary)
        })
    });
}

criterion_group!(benches, bench_classify, bench_detect);
criterion_main!(benches);
