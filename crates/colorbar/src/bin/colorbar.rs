//! colorbar CLI: find color bar markers in still images.

use clap::{Parser, Subcommand};
use colorbar::detect::{rgba_padded, to_image_buffer};
use colorbar::finder::BarCodePattern;
use colorbar::io::{DetectConfig, DetectReport};
use colorbar::overlay;
use log::LevelFilter;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "colorbar")]
#[command(about = "Find color-coded bar markers between anchor bars")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect one pattern in an image.
    Detect {
        /// Path to the input image.
        image: PathBuf,

        /// Colors to look for, one letter per section (e.g. RGBGGRB).
        pattern: String,

        /// JSON detection config; defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to write the JSON report.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Path to write a labeled PNG overlay.
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Override the minimum match score.
        #[arg(long)]
        min_score: Option<f32>,

        /// Override the minimum colorful segment length, in pixels.
        #[arg(long)]
        min_length: Option<u32>,

        /// Override the number of matches kept.
        #[arg(long)]
        capacity: Option<usize>,
    },
    /// Print the default JSON config.
    PrintConfig,
}

#[cfg(feature = "tracing")]
fn init_logging(level: LevelFilter) {
    // Route `log` records into the subscriber before it installs its own bridge.
    let _ = tracing_log::LogTracer::init_with_filter(level);
    colorbar::core::init_tracing(false);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter) {
    let _ = colorbar::core::init_with_level(level);
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Detect {
            image,
            pattern,
            config,
            report,
            overlay,
            min_score,
            min_length,
            capacity,
        } => {
            let mut cfg = match config {
                Some(path) => DetectConfig::load_json(&path)?,
                None => DetectConfig::default(),
            };
            if let Some(v) = min_score {
                cfg.search.min_match_score = v;
            }
            if let Some(v) = min_length {
                cfg.search.min_segment_length = v;
            }
            if let Some(v) = capacity {
                cfg.search.result_capacity = v;
            }
            let pattern: BarCodePattern = pattern.parse()?;
            run_detect(&image, pattern, &cfg, report.as_deref(), overlay.as_deref())
        }
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&DetectConfig::default())?);
            Ok(())
        }
    }
}

fn run_detect(
    image_path: &Path,
    pattern: BarCodePattern,
    cfg: &DetectConfig,
    report_path: Option<&Path>,
    overlay_path: Option<&Path>,
) -> CliResult<()> {
    log::info!("loading image: {}", image_path.display());
    let decoded = image::open(image_path)
        .map_err(|e| -> CliError { format!("failed to open {}: {e}", image_path.display()).into() })?;
    let width = decoded.width() as usize;
    let mut img = rgba_padded(&decoded)?;
    log::info!("image size: {}x{} (padded to {})", width, img.height, img.width);

    let finder = cfg.build_finder();
    let mut arena = cfg.build_arena()?;
    let mut requests = [cfg.build_request(pattern)?];
    let summary = finder.detect(&img.view(), &mut requests, &mut arena);
    let request = &requests[0];

    let caps = arena.capacities();
    if summary.scan_lines == caps.scan_lines {
        log::warn!("scan line capacity ({}) reached, some anchors were dropped", caps.scan_lines);
    }
    if summary.appearances == caps.appearances {
        log::warn!("appearance capacity ({}) reached, some box pairs were skipped", caps.appearances);
    }

    let best = request.best().map(|m| m.score);
    println!(
        "[{pattern}] - {} appearances (highest match score: {})",
        request.len(),
        best.map_or_else(|| "none".to_string(), |s| format!("{s:.3}"))
    );

    if let Some(path) = report_path {
        let report = DetectReport::from_request(
            image_path.display().to_string(),
            width,
            img.height,
            summary,
            request,
        );
        report.write_json(path)?;
        log::info!("report written to {}", path.display());
    }

    if let Some(path) = overlay_path {
        let mut view = img.view_mut();
        overlay::paint_anchor_pixels(&mut view, finder.classifier(), overlay::GREEN);
        for m in request.matches() {
            overlay::draw_appearance(&mut view, m.appearance, overlay::YELLOW, overlay::RED);
        }
        if let Some(m) = request.best() {
            overlay::draw_appearance(&mut view, m.appearance, overlay::CYAN, overlay::BLUE);
        }
        to_image_buffer(&img, width)?.save(path)?;
        log::info!("overlay written to {}", path.display());
    }

    Ok(())
}
