mod display;
#[cfg(feature = "capture")]
mod source;

use clap::Parser;
use display::HeadlessDisplay;
use screenmatch::pipeline::{DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH};
use screenmatch::store::{resolve_template_dir, DEFAULT_MAX_TEMPLATES, DEFAULT_TEMPLATE_DIR};
use screenmatch::{
    Detector, DisplaySurface, FrameSource, LiveLoop, LoadLimit, LoopConfig, LoopSummary,
    MatchConfig, PostProcess, StillFrameSource, TemplateStore,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Live multi-scale template matching on screen frames",
    long_about = "Live multi-scale template matching on screen frames.\n\n\
        Screen capture and the preview window are optional features: build with \
        `--features capture,window` for live use. Without them, pass --frame-image \
        and --headless to replay a still image."
)]
struct Cli {
    /// Path to a JSON configuration file. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Template directory (overrides the config).
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,
    /// Detection threshold (overrides the config).
    #[arg(long)]
    threshold: Option<f32>,
    /// Replay a still image instead of capturing the screen.
    #[arg(long, value_name = "FILE")]
    frame_image: Option<PathBuf>,
    /// Stop after this many presented frames.
    #[arg(long)]
    max_frames: Option<u64>,
    /// Enable non-maximum suppression with this IoU threshold.
    #[arg(long, value_name = "IOU")]
    nms_iou: Option<f32>,
    /// Run without a window, logging each frame instead.
    #[arg(long)]
    headless: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TemplatesJson {
    dir: PathBuf,
    max_count: usize,
    count_successes_only: bool,
}

impl Default for TemplatesJson {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            max_count: DEFAULT_MAX_TEMPLATES,
            count_successes_only: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    threshold: f32,
    min_scale: f32,
    max_scale: f32,
    scale_step: f32,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            threshold: cfg.threshold,
            min_scale: cfg.min_scale,
            max_scale: cfg.max_scale,
            scale_step: cfg.scale_step,
            parallel: cfg.parallel,
        }
    }
}

impl From<&MatchConfigJson> for MatchConfig {
    fn from(value: &MatchConfigJson) -> Self {
        Self {
            threshold: value.threshold,
            min_scale: value.min_scale,
            max_scale: value.max_scale,
            scale_step: value.scale_step,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsJson {
    enabled: bool,
    iou_threshold: f32,
}

impl Default for NmsJson {
    fn default() -> Self {
        Self {
            enabled: false,
            iou_threshold: 0.3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CaptureJson {
    output_width: u32,
    output_height: u32,
    frame_image: Option<PathBuf>,
}

impl Default for CaptureJson {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            frame_image: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DisplayJson {
    window: bool,
    window_width: usize,
    window_height: usize,
    max_frames: Option<u64>,
}

impl Default for DisplayJson {
    fn default() -> Self {
        Self {
            window: true,
            window_width: 640,
            window_height: 480,
            max_frames: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    templates: TemplatesJson,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
    nms: NmsJson,
    capture: CaptureJson,
    display: DisplayJson,
    poll_wait_ms: u64,
    max_consecutive_failures: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates: TemplatesJson::default(),
            match_cfg: MatchConfigJson::default(),
            nms: NmsJson::default(),
            capture: CaptureJson::default(),
            display: DisplayJson::default(),
            poll_wait_ms: 2,
            max_consecutive_failures: None,
        }
    }
}

impl Config {
    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.templates {
            self.templates.dir = dir.clone();
        }
        if let Some(threshold) = cli.threshold {
            self.match_cfg.threshold = threshold;
        }
        if let Some(path) = &cli.frame_image {
            self.capture.frame_image = Some(path.clone());
        }
        if let Some(max_frames) = cli.max_frames {
            self.display.max_frames = Some(max_frames);
        }
        if let Some(iou) = cli.nms_iou {
            self.nms.enabled = true;
            self.nms.iou_threshold = iou;
        }
        if cli.headless {
            self.display.window = false;
        }
    }
}

#[derive(Debug, Serialize)]
struct RunReport {
    templates_loaded: usize,
    templates_failed: usize,
    iterations: u64,
    frames_processed: u64,
    failed_frames: u64,
    detections: u64,
}

impl RunReport {
    fn new(store: &TemplateStore, summary: &LoopSummary) -> Self {
        Self {
            templates_loaded: store.len(),
            templates_failed: store.report().failed.len(),
            iterations: summary.iterations,
            frames_processed: summary.frames_processed,
            failed_frames: summary.failed_frames,
            detections: summary.detections,
        }
    }
}

fn template_dir(dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(resolve_template_dir(dir)?)
    }
}

fn frame_source(capture: &CaptureJson) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    match &capture.frame_image {
        Some(path) => {
            let still = StillFrameSource::open(path, capture.output_width, capture.output_height)?;
            Ok(Box::new(still))
        }
        None => screen_source(capture),
    }
}

#[cfg(feature = "capture")]
fn screen_source(capture: &CaptureJson) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    let screen = source::ScreenCapture::primary(capture.output_width, capture.output_height)?;
    Ok(Box::new(screen))
}

#[cfg(not(feature = "capture"))]
fn screen_source(_: &CaptureJson) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    Err("screen capture is not compiled in; rebuild with --features capture or pass --frame-image".into())
}

#[cfg(feature = "window")]
fn display_surface(cfg: &DisplayJson) -> Result<Box<dyn DisplaySurface>, Box<dyn std::error::Error>> {
    if !cfg.window {
        return Ok(Box::new(HeadlessDisplay::new(cfg.max_frames)));
    }
    let window = display::WindowDisplay::open(cfg.window_width, cfg.window_height, cfg.max_frames)?;
    Ok(Box::new(window))
}

#[cfg(not(feature = "window"))]
fn display_surface(cfg: &DisplayJson) -> Result<Box<dyn DisplaySurface>, Box<dyn std::error::Error>> {
    if cfg.window {
        tracing::warn!("window display is not compiled in; running headless");
    }
    Ok(Box::new(HeadlessDisplay::new(cfg.max_frames)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive = if cli.trace {
        "screenmatch=info"
    } else {
        "screenmatch=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_target(false)
        .init();

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => serde_json::from_str::<Config>(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    config.apply_overrides(&cli);

    let match_cfg = MatchConfig::from(&config.match_cfg);
    match_cfg.validate()?;
    let post = if config.nms.enabled {
        PostProcess::Nms {
            iou_threshold: config.nms.iou_threshold,
        }
    } else {
        PostProcess::None
    };

    let dir = template_dir(&config.templates.dir)?;
    let limit = if config.templates.count_successes_only {
        LoadLimit::Successes
    } else {
        LoadLimit::Attempts
    };
    let store = TemplateStore::load_with_limit(&dir, config.templates.max_count, limit);
    tracing::info!(dir = %dir.display(), templates = store.len(), "template store ready");

    let detector = Detector::new(store.templates(), match_cfg)?.with_post_process(post)?;
    detector.prepare(
        config.capture.output_width as usize,
        config.capture.output_height as usize,
    );
    let source = frame_source(&config.capture)?;
    let display = display_surface(&config.display)?;
    let loop_cfg = LoopConfig {
        poll_wait: Duration::from_millis(config.poll_wait_ms),
        max_consecutive_failures: config.max_consecutive_failures,
        ..LoopConfig::default()
    };

    let mut live = LiveLoop::new(source, display, &detector, loop_cfg);
    let summary = live.run()?;
    let report = RunReport::new(&store, &summary);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
