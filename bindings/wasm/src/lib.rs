use chrono::DateTime;
use passport_photo::{
    Advisory, FaceLandmarks, HeadGeometry, PassportError, PassportOutput, PassportPhoto, Point,
    PrecomputedDetector, QualityScores, RenderMode,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Options for `analyze` and `compose`, passed as a JavaScript object.
///
/// All fields are optional. `crown` and `chin` must be given together.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PassportOptions {
    pub preview: bool,
    pub crown: Option<Point>,
    pub chin: Option<Point>,
    pub target_dpi: Option<u16>,
    pub final_quality: Option<u8>,
    pub preview_quality: Option<u8>,
}

#[derive(Serialize)]
struct AdviceRecord {
    code: &'static str,
    message: String,
}

impl From<&Advisory> for AdviceRecord {
    fn from(advisory: &Advisory) -> Self {
        Self {
            code: advisory.code(),
            message: advisory.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    scores: QualityScores,
    advisories: Vec<AdviceRecord>,
    geometry: HeadGeometry,
    verified: bool,
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

/// Convert a `PassportError` into a JS `Error` with a machine-readable `code` property.
fn to_js_error(e: PassportError) -> JsValue {
    let code = match &e {
        PassportError::DecodeError(_) => "DECODE_ERROR",
        PassportError::ZeroDimensions => "ZERO_DIMENSIONS",
        PassportError::EncodeError(_) => "ENCODE_ERROR",
        PassportError::InvalidLandmarkCount(_) => "INVALID_LANDMARK_COUNT",
        PassportError::DegenerateHeadLength(_) => "DEGENERATE_HEAD_LENGTH",
        PassportError::InvertedHeadPoints { .. } => "INVERTED_HEAD_POINTS",
        PassportError::BackgroundRemoval(_) => "BACKGROUND_REMOVAL",
        PassportError::InvalidConfig(_) => "INVALID_CONFIG",
        PassportError::InvalidQuality(_) => "INVALID_QUALITY",
    };
    make_error(code, &e.to_string())
}

fn parse_options(options: JsValue) -> Result<PassportOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(PassportOptions::default());
    }
    let opts: PassportOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid options: {e}")))?;
    if opts.crown.is_some() != opts.chin.is_some() {
        return Err(make_error(
            "INVALID_OPTIONS",
            "crown and chin must be given together",
        ));
    }
    Ok(opts)
}

fn parse_detection(detection: JsValue) -> Result<Option<FaceLandmarks>, JsValue> {
    if detection.is_undefined() || detection.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(detection)
        .map(Some)
        .map_err(|e| make_error("INVALID_DETECTION", &format!("invalid detection: {e}")))
}

/// Decode the input and configure a `PassportPhoto` from the detection and options.
fn build_photo(
    input: Vec<u8>,
    detection: JsValue,
    opts: &PassportOptions,
) -> Result<PassportPhoto, JsValue> {
    let detection = parse_detection(detection)?;
    let mut photo = PassportPhoto::new(input)
        .map_err(to_js_error)?
        .face_detector(Box::new(PrecomputedDetector::new(detection)));

    if let (Some(crown), Some(chin)) = (opts.crown, opts.chin) {
        photo = photo.manual_points(crown, chin);
    }

    let mut config = passport_photo::PassportConfig::default();
    if let Some(dpi) = opts.target_dpi {
        config.target_dpi = dpi;
    }
    if let Some(q) = opts.final_quality {
        config.final_quality = q;
    }
    if let Some(q) = opts.preview_quality {
        config.preview_quality = q;
    }
    Ok(photo.config(config))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| make_error("SERIALIZE_ERROR", &e.to_string()))
}

/// Build a plain JS object from a `PassportOutput`.
fn build_output_object(output: &PassportOutput) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    let data = js_sys::Uint8Array::from(&output.data[..]);
    js_sys::Reflect::set(&obj, &"data".into(), &data)?;
    js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(output.width))?;
    js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(output.height))?;
    js_sys::Reflect::set(
        &obj,
        &"fileName".into(),
        &JsValue::from_str(&output.file_name),
    )?;
    js_sys::Reflect::set(&obj, &"scores".into(), &to_js(&output.analysis.scores)?)?;
    Ok(JsValue::from(obj))
}

/// Score a portrait without rendering it.
///
/// @param input - Raw image bytes (JPEG, PNG, or WebP)
/// @param detection - `{ box, landmarks }` from the landmark model, or null
/// @param options - Optional object with fields: crown, chin
#[wasm_bindgen]
pub fn analyze(input: Vec<u8>, detection: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let opts = parse_options(options)?;
    let analysis = build_photo(input, detection, &opts)?
        .analyze()
        .map_err(to_js_error)?;

    to_js(&AnalyzeResult {
        scores: analysis.scores,
        advisories: analysis.advisories.iter().map(AdviceRecord::from).collect(),
        geometry: analysis.geometry,
        verified: analysis.is_verified(),
    })
}

/// Render a normalized passport photo.
///
/// @param input - Raw image bytes (JPEG, PNG, or WebP)
/// @param detection - `{ box, landmarks }` from the landmark model, or null
/// @param options - Optional object with fields: preview, crown, chin,
///   targetDpi, finalQuality, previewQuality
#[wasm_bindgen]
pub fn compose(input: Vec<u8>, detection: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let opts = parse_options(options)?;
    let mode = if opts.preview {
        RenderMode::Preview
    } else {
        RenderMode::Final
    };
    let timestamp = DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default();

    let output = build_photo(input, detection, &opts)?
        .compose_at(mode, timestamp)
        .map_err(to_js_error)?;

    build_output_object(&output)
}
