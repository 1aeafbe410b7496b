//! Detect a pattern in a PNG and print every match.
//!
//! ```text
//! cargo run -p colorbar --example find_in_png -- frame.png RGBGR
//! ```

use colorbar::detect::{detect_patterns, load_rgba};
use colorbar::io::DetectConfig;
use colorbar::BarCodePattern;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: find_in_png <image> <pattern>")?;
    let pattern: BarCodePattern = args.next().as_deref().unwrap_or("RGB").parse()?;

    let img = load_rgba(&path)?;
    let (summary, requests) = detect_patterns(&img, &DetectConfig::default(), &[pattern])?;
    println!(
        "{path}: {} scan lines, {} boxes, {} candidates",
        summary.scan_lines, summary.boxes, summary.appearances
    );
    for (i, m) in requests[0].matches().enumerate() {
        let s = m.appearance.segment;
        println!(
            "#{i}: score {:.3}, ({}, {}) -> ({}, {})",
            m.score, s.start.x, s.start.y, s.end.x, s.end.y
        );
    }
    Ok(())
}
