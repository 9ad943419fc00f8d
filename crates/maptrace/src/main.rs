//! maptrace: extract same-colored regions from a raster map as
//! geo-referenced GeoJSON or KML contours.
//!
//! Calibrates the full image against the given geographic extent, then
//! segments by one of three modes:
//!
//! - `--pick X,Y`: sample the color under a pixel and trace it
//! - `--color R,G,B`: trace an explicit color
//! - `--clusters K`: cluster the palette and trace every cluster
//!
//! # Usage
//!
//! ```text
//! maptrace map.png --north -15 --south -17.5 --west -71 --east -66.8 \
//!     --pick 310,220 --label lake --format kml --out lake.kml
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, ValueEnum};
use log::{debug, info};

use maptrace_core::{GeoBox, PixelBox, Rgb, SegmentConfig, Session};

/// Extract geo-referenced contours from a raster map.
#[derive(Parser)]
#[command(name = "maptrace", version)]
#[command(group = ArgGroup::new("mode").required(true).args(["pick", "color", "clusters"]))]
struct Cli {
    /// Path to the input map image (PNG, JPEG, BMP, TIFF).
    image_path: PathBuf,

    /// Northern latitude bound of the image extent.
    #[arg(long, allow_hyphen_values = true)]
    north: f64,

    /// Southern latitude bound of the image extent.
    #[arg(long, allow_hyphen_values = true)]
    south: f64,

    /// Western longitude bound of the image extent.
    #[arg(long, allow_hyphen_values = true)]
    west: f64,

    /// Eastern longitude bound of the image extent.
    #[arg(long, allow_hyphen_values = true)]
    east: f64,

    /// Sample the color under this pixel as `X,Y` and trace it.
    #[arg(long, value_parser = parse_pixel)]
    pick: Option<(u32, u32)>,

    /// Trace this explicit color, as `R,G,B` (0-255 each).
    #[arg(long, value_parser = parse_rgb)]
    color: Option<Rgb>,

    /// Cluster the palette into this many colors and trace each cluster.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    clusters: Option<usize>,

    /// Maximum Euclidean RGB distance for a pixel to match.
    #[arg(long, default_value_t = SegmentConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Smooth traced boundaries with a Catmull-Rom spline.
    #[arg(long)]
    smooth: bool,

    /// Points per smoothed boundary (with --smooth).
    #[arg(long, default_value_t = SegmentConfig::DEFAULT_SMOOTH_SAMPLES, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..))]
    smooth_samples: usize,

    /// Label for the traced feature (--pick and --color modes).
    #[arg(long, default_value = "feature")]
    label: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Geojson)]
    format: Format,

    /// Annotate KML coordinates with synthetic elevation sampled from the
    /// image's grayscale intensity. Requires `--format kml`.
    #[arg(long)]
    elevation: bool,

    /// Meters of altitude per grayscale intensity step (with --elevation).
    #[arg(long, default_value_t = 10.0)]
    elevation_scale: f64,

    /// Write output to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Output format selection.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Pretty-printed GeoJSON FeatureCollection.
    Geojson,
    /// KML document with one Placemark per boundary.
    Kml,
}

/// Parse an `X,Y` pixel coordinate.
fn parse_pixel(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split(',').collect();
    let [x, y] = parts.as_slice() else {
        return Err(format!("expected X,Y but got {s:?}"));
    };
    let x = x.trim().parse().map_err(|e| format!("bad X: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y: {e}"))?;
    Ok((x, y))
}

/// Parse an `R,G,B` color with 0-255 channels.
fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = s.split(',').collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected R,G,B but got {s:?}"));
    };
    let r = r.trim().parse().map_err(|e| format!("bad red: {e}"))?;
    let g = g.trim().parse().map_err(|e| format!("bad green: {e}"))?;
    let b = b.trim().parse().map_err(|e| format!("bad blue: {e}"))?;
    Ok(Rgb::new(r, g, b))
}

fn run(cli: &Cli) -> Result<String, String> {
    if cli.elevation && !matches!(cli.format, Format::Kml) {
        return Err("--elevation requires --format kml".to_owned());
    }

    let bytes = std::fs::read(&cli.image_path)
        .map_err(|e| format!("reading {}: {e}", cli.image_path.display()))?;
    let mut session = Session::from_bytes(&bytes)
        .map_err(|e| format!("loading {}: {e}", cli.image_path.display()))?;

    let dims = session.dimensions();
    info!(
        "loaded {} ({}x{} px)",
        cli.image_path.display(),
        dims.width,
        dims.height,
    );

    let pixel = PixelBox::try_new(0, 0, dims.width, dims.height).map_err(|e| e.to_string())?;
    let geo =
        GeoBox::try_new(cli.west, cli.east, cli.north, cli.south).map_err(|e| e.to_string())?;
    session.calibrate(pixel, geo).map_err(|e| e.to_string())?;

    let config = SegmentConfig {
        tolerance: cli.tolerance,
        smooth: cli.smooth,
        smooth_samples: cli.smooth_samples,
    };
    debug!("segment config: {config:?}");

    if let Some((x, y)) = cli.pick {
        let feature = session
            .pick(x, y, cli.label.clone(), &config)
            .map_err(|e| e.to_string())?;
        info!(
            "picked {:?} at ({x}, {y}): {} boundaries",
            feature.color(),
            feature.contours().len(),
        );
    } else if let Some(color) = cli.color {
        let feature = session
            .segment_color(color, cli.label.clone(), &config)
            .map_err(|e| e.to_string())?;
        info!("traced {color:?}: {} boundaries", feature.contours().len());
    } else if let Some(k) = cli.clusters {
        let count = session
            .classify_by_colormap(k, &config)
            .map_err(|e| e.to_string())?;
        info!("classified into {count} clusters");
    }

    let calibration = session.calibration().map_err(|e| e.to_string())?;
    let output = match cli.format {
        Format::Geojson => maptrace_export::to_geojson(session.features(), calibration)
            .map_err(|e| e.to_string())?,
        Format::Kml if cli.elevation => maptrace_export::to_kml_with_elevation(
            session.features(),
            calibration,
            &session.grayscale(),
            cli.elevation_scale,
        ),
        Format::Kml => maptrace_export::to_kml(session.features(), calibration),
    };
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let output = match run(&cli) {
        Ok(output) => output,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::FAILURE;
        }
    };

    match cli.out {
        Some(ref path) => {
            if let Err(e) = std::fs::write(path, &output) {
                eprintln!("Error writing {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
            info!("wrote {} bytes to {}", output.len(), path.display());
        }
        None => print!("{output}"),
    }

    ExitCode::SUCCESS
}
