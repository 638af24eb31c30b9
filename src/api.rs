/*!
 * Request boundary of the aligner.
 *
 * Decodes and validates the JSON payload, runs the aligner and builds the
 * response payload. Nothing here knows about sockets, so the same path is
 * used by the HTTP endpoint and by the `align --request` command.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::Value;

use crate::aligner::{self, AlignedRecord, AlignmentStats};
use crate::errors::RequestError;

// @const: Accepted alternative names, used only when the wire name is absent
const FIELD_FALLBACKS: [(&str, &str); 2] = [("kor_text", "source_text"), ("eng_text", "target_text")];

/// Alignment request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignRequest {
    /// Script in the source language
    #[serde(rename = "kor_text")]
    pub source_text: String,

    /// Script in the target language
    #[serde(rename = "eng_text")]
    pub target_text: String,
}

impl AlignRequest {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        AlignRequest {
            source_text: source_text.into(),
            target_text: target_text.into(),
        }
    }
}

/// Alignment response payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignResponse {
    /// Aligned rows in display order
    pub data: Vec<AlignedRecord>,
}

/// Error payload carrying a human readable `detail`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        ErrorBody { detail: detail.into() }
    }
}

impl From<&RequestError> for ErrorBody {
    fn from(error: &RequestError) -> Self {
        Self::new(error.to_string())
    }
}

/// Decode and validate a request body
///
/// Both fields are required and must be strings; empty strings are valid.
/// `source_text` and `target_text` stand in for a missing `kor_text` or
/// `eng_text`. Extra fields are ignored.
pub fn parse_align_request(body: &[u8]) -> Result<AlignRequest, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::InvalidRequest("request body is empty".to_string()));
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        let detail = match e.classify() {
            Category::Syntax | Category::Eof => format!("malformed JSON: {}", e),
            Category::Data | Category::Io => format!("unreadable body: {}", e),
        };
        RequestError::InvalidRequest(detail)
    })?;

    // Struct deserialization would also accept a positional array
    let Value::Object(mut fields) = value else {
        return Err(RequestError::InvalidRequest("request body must be a JSON object".to_string()));
    };

    for (wire_name, fallback) in FIELD_FALLBACKS {
        if !fields.contains_key(wire_name) {
            if let Some(text) = fields.remove(fallback) {
                fields.insert(wire_name.to_string(), text);
            }
        }
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| RequestError::InvalidRequest(e.to_string()))
}

/// Align a validated request
pub fn handle_align(request: &AlignRequest) -> AlignResponse {
    let data = aligner::align(&request.source_text, &request.target_text);

    let stats = AlignmentStats::of(&data);
    debug!(
        "Aligned {} rows ({} paired, {} without source, {} without target)",
        stats.total, stats.paired, stats.missing_source, stats.missing_target
    );

    AlignResponse { data }
}

/// Decode, validate and align a raw request body
pub fn handle_align_body(body: &[u8]) -> Result<AlignResponse, RequestError> {
    let request = parse_align_request(body)?;
    Ok(handle_align(&request))
}
