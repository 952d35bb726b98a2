//! Request, response, and log record types shared by every AgriSakha surface.

use serde::{Deserialize, Serialize};

/// Placeholder text-to-speech link returned with every advisory.
pub const TTS_PLACEHOLDER: &str = "dummy_audio_link";

/// Constant confidence reported with every advisory. Not computed.
pub const ADVISORY_CONFIDENCE: f64 = 0.85;

/// Language name that enables translation.
pub const HINDI: &str = "Hindi";

fn default_location() -> String {
    "Delhi".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

/// A farmer's question as submitted to `POST /advisory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub query: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl AdvisoryRequest {
    /// Builds a request with the default location and language.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: default_location(),
            language: default_language(),
        }
    }
}

/// The answer returned for an [`AdvisoryRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub advice: String,
    /// Echoed from the request.
    pub language: String,
    pub tts: String,
    pub confidence: f64,
}

/// One record in the query log. Field values are stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    /// ISO-8601 / RFC 3339 timestamp of the request.
    pub timestamp: String,
    pub query: String,
    pub location: String,
    pub language: String,
    /// The advice actually returned (after translation).
    pub advice: String,
}
