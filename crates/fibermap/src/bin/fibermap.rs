use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Parser, ValueHint};
use fibermap::core::{
    AnalysisSummary, FieldSummary, VectorSample, DEFAULT_COHERENCE_BINS,
    DEFAULT_ORIENTATION_BIN_DEG, ORIENTATION_UPPER_DEG,
};
use fibermap::{
    density_heatmap, io, pad_to_square, ring_test_image, AnalyzeError, HeatmapParams,
    OrientationAnalyzer, OrientationParams, ScalarField,
};
use serde::{Deserialize, Serialize};

#[cfg(not(feature = "tracing"))]
use std::str::FromStr;

#[cfg(not(feature = "tracing"))]
use log::{info, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::info;

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Fiber orientation and coherence maps for grayscale micrographs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Input image (any format the `image` crate decodes)
    #[arg(value_hint = ValueHint::FilePath, required_unless_present = "test_image")]
    image: Option<PathBuf>,

    /// JSON config with optional `orientation` and `heatmap` sections
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Gaussian pre-smoothing sigma in pixels
    #[arg(long)]
    sigma: Option<f64>,

    /// Gaussian sigma of the tensor averaging window in pixels
    #[arg(long)]
    window: Option<f64>,

    /// Lower bound of the normalized coherence map, in (0, 1)
    #[arg(long)]
    min_coherence: Option<f64>,

    /// Lower bound of the normalized orientation map, in (0, 180) degrees
    #[arg(long)]
    min_orientation: Option<f64>,

    /// Shift normalized orientations above 90 degrees down by 90
    #[arg(long)]
    fold_orientation: bool,

    /// Number of density windows along the image height
    #[arg(long)]
    heatmap_windows: Option<usize>,

    /// Zero-pad the image to a square before analysis
    #[arg(long)]
    pad_square: bool,

    /// Analyze the built-in two-ring test image instead of a file
    #[arg(long, conflicts_with = "image")]
    test_image: bool,

    /// Directory for coherence.png, orientation.png and heatmap.png
    #[arg(long, value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(long, value_hint = ValueHint::FilePath)]
    report: Option<PathBuf>,

    /// Spacing in pixels of the fiber-direction samples in the report (0 disables)
    #[arg(long, default_value_t = 50)]
    vector_spacing: usize,

    /// Log level (off, error, warn, info, debug, trace); `RUST_LOG` takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    orientation: OrientationParams,
    heatmap: HeatmapParams,
}

#[derive(Debug, Serialize)]
struct Report {
    source: String,
    width: usize,
    height: usize,
    padded: bool,
    params: OrientationParams,
    heatmap: HeatmapParams,
    summary: AnalysisSummary,
    heatmap_summary: Option<FieldSummary>,
    vector_spacing: usize,
    fiber_vectors: Vec<VectorSample>,
    outputs: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` directives win over `level`; both go to stderr so the JSON
/// report on stdout stays clean.
#[cfg(not(feature = "tracing"))]
fn init_logging(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Warn);
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Span close events carry the stage timings.
#[cfg(feature = "tracing")]
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(cli)))]
fn run(cli: &Cli) -> Result<(), AnalyzeError> {
    let config = resolve_config(cli)?;
    let analyzer = OrientationAnalyzer::new(config.orientation.clone())?;

    let (source, mut image) = match (&cli.image, cli.test_image) {
        (Some(path), false) => (path.display().to_string(), io::load_image(path)?),
        _ => ("ring-test-image".to_string(), ring_test_image()),
    };
    if cli.pad_square {
        image = pad_to_square(&image);
    }
    info!(
        "analyzing {source}: {}x{}",
        image.width(),
        image.height()
    );

    let analysis = analyzer.analyze(&image)?;
    let summary = AnalysisSummary::new(
        &analysis.orientation,
        &analysis.coherence,
        DEFAULT_ORIENTATION_BIN_DEG,
        DEFAULT_COHERENCE_BINS,
    )?;
    info!(
        "mean coherence {:.4}, mean orientation {:.2} deg",
        summary.coherence.mean, summary.orientation.mean
    );

    let fiber_vectors = if cli.vector_spacing > 0 {
        analysis
            .vector_field
            .fiber_directions()
            .subsample(cli.vector_spacing)
    } else {
        Vec::new()
    };

    let mut outputs = Vec::new();
    let mut heatmap_summary = None;
    if let Some(dir) = &cli.out_dir {
        fs::create_dir_all(dir)?;
        let heatmap = density_heatmap(&image, config.heatmap.windows)?;
        heatmap_summary = FieldSummary::of(&heatmap);

        let maps: [(&str, &ScalarField, f64); 3] = [
            ("coherence.png", &analysis.coherence, 1.0),
            ("orientation.png", &analysis.orientation, ORIENTATION_UPPER_DEG),
            ("heatmap.png", &heatmap, 1.0),
        ];
        for (name, field, hi) in maps {
            outputs.push(write_map(dir, name, field, hi)?);
        }
    }

    let report = Report {
        source,
        width: image.width(),
        height: image.height(),
        padded: cli.pad_square,
        params: config.orientation,
        heatmap: config.heatmap,
        summary,
        heatmap_summary,
        vector_spacing: cli.vector_spacing,
        fiber_vectors,
        outputs,
    };
    write_report(cli.report.as_deref(), &report)
}

/// Config file first, then individual flags on top.
fn resolve_config(cli: &Cli) -> Result<RunConfig, AnalyzeError> {
    let mut config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RunConfig::default(),
    };
    let p = &mut config.orientation;
    if let Some(v) = cli.sigma {
        p.filter_sigma = v;
    }
    if let Some(v) = cli.window {
        p.local_window_size = v;
    }
    if let Some(v) = cli.min_coherence {
        p.min_coherence = v;
    }
    if let Some(v) = cli.min_orientation {
        p.min_orientation = v;
    }
    if cli.fold_orientation {
        p.fold_orientation = true;
    }
    if let Some(n) = cli.heatmap_windows {
        config.heatmap.windows = n;
    }
    Ok(config)
}

fn write_map(dir: &Path, name: &str, field: &ScalarField, hi: f64) -> Result<String, AnalyzeError> {
    let path = dir.join(name);
    io::save_map_png(field, 0.0, hi, &path)?;
    Ok(path.display().to_string())
}

fn write_report(path: Option<&Path>, report: &Report) -> Result<(), AnalyzeError> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            fs::write(path, json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
