use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgb, RgbImage};
use serde_json::{json, Value};
use tempfile::tempdir;

/// Skin-tone oval on a near-white wall, head roughly from y=0.17h to y=0.73h.
fn write_portrait(path: &Path, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
    let cx = width as f64 / 2.0;
    let cy = height as f64 * 0.45;
    let (rx, ry) = (width as f64 * 0.22, height as f64 * 0.28);
    let img = RgbImage::from_fn(width, height, |x, y| {
        let dx = (x as f64 - cx) / rx;
        let dy = (y as f64 - cy) / ry;
        if dx * dx + dy * dy <= 1.0 {
            Rgb([196, 150, 120])
        } else {
            Rgb([250, 250, 250])
        }
    });
    img.save(path)?;
    Ok(())
}

fn detection_json(width: u32, height: u32) -> Value {
    let (w, h) = (width as f64, height as f64);
    let cx = w / 2.0;
    let mut landmarks = vec![json!({ "x": cx, "y": h * 0.45 }); 68];
    landmarks[8] = json!({ "x": cx, "y": h * 0.71 });
    landmarks[19] = json!({ "x": cx - w * 0.08, "y": h * 0.38 });
    landmarks[24] = json!({ "x": cx + w * 0.08, "y": h * 0.38 });
    landmarks[30] = json!({ "x": cx, "y": h * 0.52 });
    json!({
        "box": { "x": cx - w * 0.22, "y": h * 0.17, "width": w * 0.44, "height": h * 0.56 },
        "landmarks": landmarks,
    })
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_passport"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run passport binary")
}

fn jpegs_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "jpg"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

#[test]
fn detection_file_produces_final_and_report() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("portrait.png");
    write_portrait(&input, 600, 800)?;
    let detection = work_dir.path().join("face.json");
    fs::write(&detection, detection_json(600, 800).to_string())?;
    let out_dir = work_dir.path().join("out");
    let report = work_dir.path().join("report.json");

    let output = run_cli(&[
        "--input",
        input.to_str().unwrap(),
        "--detection",
        detection.to_str().unwrap(),
        "--output-dir",
        out_dir.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let files = jpegs_in(&out_dir);
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("passport_413x531_"), "unexpected name {name}");

    let decoded = image::open(&files[0])?;
    assert_eq!((decoded.width(), decoded.height()), (413, 531));

    let report: Value = serde_json::from_str(&fs::read_to_string(&report)?)?;
    assert_eq!(report["verified"], json!(true));
    assert_eq!(report["analysis"]["geometry"]["source"], json!("detected"));
    assert!(report["scores"]["headRatio"].is_f64());
    assert!(report.get("preview").is_none());
    Ok(())
}

#[test]
fn preview_flag_writes_matching_preview() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("portrait.png");
    write_portrait(&input, 300, 400)?;
    let out_dir = work_dir.path().join("out");

    let output = run_cli(&[
        "-i",
        input.to_str().unwrap(),
        "--crown",
        "150,60",
        "--chin",
        "150,300",
        "-o",
        out_dir.to_str().unwrap(),
        "--preview",
    ]);
    assert!(output.status.success());

    let files = jpegs_in(&out_dir);
    assert_eq!(files.len(), 2);
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    let final_name = names.iter().find(|n| n.starts_with("passport_")).unwrap();
    assert!(names.contains(&format!("preview_{final_name}")));
    Ok(())
}

#[test]
fn dpi_and_config_overrides_apply() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("portrait.png");
    write_portrait(&input, 300, 400)?;
    let config = work_dir.path().join("settings.json");
    fs::write(
        &config,
        r#"{ "canvas": { "width": 600, "height": 600, "headHeightPx": 300, "crownTopPx": 100 } }"#,
    )?;
    let out_dir = work_dir.path().join("out");

    let output = run_cli(&[
        "-i",
        input.to_str().unwrap(),
        "--crown",
        "150,60",
        "--chin",
        "150,300",
        "--config",
        config.to_str().unwrap(),
        "--dpi",
        "600",
        "-o",
        out_dir.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let files = jpegs_in(&out_dir);
    assert_eq!(files.len(), 1);
    let data = fs::read(&files[0])?;
    assert_eq!(&data[6..11], b"JFIF\0");
    assert_eq!(data[13], 1);
    assert_eq!(u16::from_be_bytes([data[14], data[15]]), 600);
    assert_eq!(u16::from_be_bytes([data[16], data[17]]), 600);
    let decoded = image::load_from_memory(&data)?;
    assert_eq!((decoded.width(), decoded.height()), (600, 600));
    Ok(())
}

#[test]
fn inverted_points_exit_with_error() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("portrait.png");
    write_portrait(&input, 300, 400)?;
    let out_dir = work_dir.path().join("out");

    let output = run_cli(&[
        "-i",
        input.to_str().unwrap(),
        "--crown",
        "150,300",
        "--chin",
        "150,60",
        "-o",
        out_dir.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(jpegs_in(&out_dir).is_empty());
    Ok(())
}

#[test]
fn null_detection_still_renders() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("portrait.png");
    write_portrait(&input, 300, 400)?;
    let detection = work_dir.path().join("face.json");
    fs::write(&detection, "null")?;
    let out_dir = work_dir.path().join("out");
    let report = work_dir.path().join("report.json");

    let output = run_cli(&[
        "-i",
        input.to_str().unwrap(),
        "-d",
        detection.to_str().unwrap(),
        "-o",
        out_dir.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(jpegs_in(&out_dir).len(), 1);

    let report: Value = serde_json::from_str(&fs::read_to_string(&report)?)?;
    assert_eq!(report["verified"], json!(false));
    assert_eq!(report["scores"]["headRatio"], Value::Null);
    Ok(())
}

#[test]
fn undecodable_input_fails() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("broken.jpg");
    fs::write(&input, b"definitely not an image")?;

    let output = run_cli(&[
        "-i",
        input.to_str().unwrap(),
        "-o",
        work_dir.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to decode"));
    Ok(())
}
