//! Calculator module.
//!
//! Turns a photographed or drawn expression into evaluated entries by way of
//! a generative vision model: decode, normalize, prompt, call, parse.

pub mod gemini;
pub mod model;
pub mod parser;
pub mod preprocess;
pub mod prompt;

use base64::Engine;
use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{CalcError, CalcResult};
use gemini::ExpressionModel;
use model::{AnalysisRequest, AnalysisResponse, ExpressionResult, Variables};

/// Longest prefix of prompts and model answers written to the log.
const LOG_PREVIEW_CHARS: usize = 500;

/// Decode a `<media-type-prefix>,<base64-payload>` string into an image.
pub fn decode_image(data_uri: &str) -> CalcResult<DynamicImage> {
    let (_, payload) = data_uri
        .split_once(',')
        .ok_or_else(|| CalcError::decode("expected '<media-type>,<base64-data>'"))?;

    // Anything outside the base64 alphabet (line breaks, stray punctuation) is skipped.
    let compact: String = payload
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CalcError::decode(format!("invalid base64: {}", e)))?;

    image::load_from_memory(&bytes)
        .map_err(|e| CalcError::decode(format!("unreadable image: {}", e)))
}

/// Run an already decoded image through the model and parse its answer.
pub async fn analyze_image(
    model: &dyn ExpressionModel,
    img: &DynamicImage,
    vars: &Variables,
) -> CalcResult<Vec<ExpressionResult>> {
    let normalized = preprocess::normalize(img);
    debug!(
        width = normalized.width(),
        height = normalized.height(),
        "Image preprocessed"
    );

    let prompt = prompt::build_prompt(vars);
    debug!(prompt = %truncate_for_log(&prompt), "Generated prompt");

    let answer = model.generate(&prompt, &normalized).await?;
    debug!(response = %truncate_for_log(&answer), "Model response");

    let entries = parser::parse_response(&answer).inspect_err(|e| {
        if let CalcError::Parse { reason } = e {
            warn!(reason = %reason, "Could not parse model response");
        }
    })?;

    info!(entries = entries.len(), "Expressions recognised");
    Ok(entries)
}

/// Handle one request end to end. Never fails: errors become the error envelope.
pub async fn process_request(
    model: &dyn ExpressionModel,
    request: &AnalysisRequest,
) -> AnalysisResponse {
    let result = match decode_image(&request.image) {
        Ok(img) => analyze_image(model, &img, &request.dict_of_vars).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        warn!(error = %e, "Image analysis failed");
    }
    result.into()
}

/// First `LOG_PREVIEW_CHARS` characters of `text`, marked when cut.
pub(crate) fn truncate_for_log(text: &str) -> String {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
