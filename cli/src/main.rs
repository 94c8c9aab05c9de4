mod args;
mod config;
mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use passport_photo::{
    FaceLandmarks, PassportOutput, PassportPhoto, PrecomputedDetector, QualityScores, RenderMode,
};

use crate::args::PassportArgs;
use crate::config::{apply_cli_overrides, load_settings};
use crate::report::Report;

fn init_logging(default_filter: LevelFilter) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
}

fn load_detection(path: &Path) -> Result<Option<FaceLandmarks>> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read detection from {}", path.display()))?;
    let detection: Option<FaceLandmarks> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse detection in {}", path.display()))?;
    if detection.is_none() {
        info!("{} records no face", path.display());
    }
    Ok(detection)
}

fn write_output(dir: &Path, file_name: &str, output: &PassportOutput) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, &output.data)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "Wrote {:?} photo {} ({}x{}, {} bytes)",
        output.mode,
        path.display(),
        output.width,
        output.height,
        output.data.len()
    );
    Ok(path)
}

fn format_score(value: Option<i32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn print_summary(scores: &QualityScores, verified: bool, advice: &[String]) {
    let ratio = match (scores.head_ratio, scores.head_ok) {
        (Some(r), Some(true)) => format!("{r:.3} (ok)"),
        (Some(r), _) => format!("{r:.3} (out of range)"),
        (None, _) => "n/a".to_string(),
    };
    println!("head ratio:    {ratio}");
    println!("bg whiteness:  {}", format_score(scores.bg_whiteness));
    println!("bg uniformity: {}", format_score(scores.bg_uniformity));
    println!("exposure:      {}", format_score(scores.exposure));
    println!("sharpness:     {}", format_score(scores.sharpness));
    if !verified {
        println!("face position was guessed; check the framing by hand");
    }
    for line in advice {
        println!("- {line}");
    }
}

fn main() -> Result<()> {
    let args = PassportArgs::parse();
    init_logging(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let mut settings = load_settings(args.config.as_deref())?;
    apply_cli_overrides(&mut settings, &args);
    settings.validate().context("invalid settings")?;
    debug!("Effective settings: {settings:?}");

    let input = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mut photo = PassportPhoto::new(input)
        .with_context(|| format!("failed to decode {}", args.input.display()))?
        .config(settings);

    if let Some(path) = args.detection.as_ref() {
        let detection = load_detection(path)?;
        photo = photo.face_detector(Box::new(PrecomputedDetector::new(detection)));
    }
    if let Some((crown, chin)) = args.manual_points() {
        debug!("Using manual points crown={crown:?} chin={chin:?}");
        photo = photo.manual_points(crown, chin);
    }

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.output_dir.display()
        )
    })?;

    let prepared = photo.prepare().context("failed to analyze portrait")?;
    let timestamp = Utc::now();
    let final_output = photo
        .render(&prepared, RenderMode::Final, timestamp)
        .context("failed to compose passport photo")?;
    let output_path = write_output(&args.output_dir, &final_output.file_name, &final_output)?;

    let preview_path = if args.preview {
        let preview = photo
            .render(&prepared, RenderMode::Preview, timestamp)
            .context("failed to compose preview")?;
        let name = format!("preview_{}", preview.file_name);
        Some(write_output(&args.output_dir, &name, &preview)?)
    } else {
        None
    };

    let analysis = &final_output.analysis;
    if !analysis.is_verified() {
        warn!("No face detection or manual points; framing is a centred guess");
    }
    let advice: Vec<String> = analysis.advisories.iter().map(|a| a.to_string()).collect();
    print_summary(&analysis.scores, analysis.is_verified(), &advice);

    if let Some(report_path) = args.report.as_ref() {
        let report = Report::new(
            &args.input,
            &output_path,
            preview_path.as_deref(),
            analysis,
        );
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(report_path, json)
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
        info!("Wrote report {}", report_path.display());
    }

    Ok(())
}
