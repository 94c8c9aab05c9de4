//! Command-line argument definitions for the passport CLI.

use clap::{ArgAction, Parser};
use passport_photo::Point;
use std::path::PathBuf;

/// Frame a portrait as a passport photo and report on its compliance.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct PassportArgs {
    /// Path to the source portrait (JPEG, PNG or WebP).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Face detection JSON: `{"box": {...}, "landmarks": [{"x": .., "y": ..}, ...]}` or `null`.
    #[arg(short, long)]
    pub detection: Option<PathBuf>,

    /// Operator-placed crown point as `X,Y` in source pixels.
    #[arg(long, value_parser = parse_point, requires = "chin")]
    pub crown: Option<Point>,

    /// Operator-placed chin point as `X,Y` in source pixels.
    #[arg(long, value_parser = parse_point, requires = "crown")]
    pub chin: Option<Point>,

    /// Optional settings JSON (defaults to the built-in 35x45 mm frame).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the rendered photos are written to.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write a preview JPEG with crown and chin guide lines.
    #[arg(long, action = ArgAction::SetTrue)]
    pub preview: bool,

    /// Write the analysis and output paths to a JSON file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Override the resolution written into the final JPEG.
    #[arg(long)]
    pub dpi: Option<u16>,

    /// Override the final JPEG quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Enable debug logging.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl PassportArgs {
    /// Manual head points, when both were given.
    pub fn manual_points(&self) -> Option<(Point, Point)> {
        self.crown.zip(self.chin)
    }
}

/// Parse an `X,Y` pair of pixel coordinates.
pub fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}' in '{value}'", part.trim()))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}
