//! Image analysis seam.
//!
//! No real vision model exists. [`PlaceholderAnalyzer`] returns the fixed
//! analysis served by the full service; [`LiteAnalyzer`] is the stub used by
//! the CI composition and routes a generic query through the classifier
//! instead. A real model would be another [`ImageAnalyzer`] implementation.

use serde::{Deserialize, Serialize};

use crate::classify::Classifier;

/// An upload that has already been written to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    /// Stored name, `{timestamp}_{original}`.
    pub filename: String,
    /// Path the bytes were written to, as displayed to clients.
    pub file_path: String,
    pub size: usize,
    pub content_type: String,
}

/// Response body for `POST /upload-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub filename: String,
    pub file_path: String,
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_disease: Option<String>,
    pub analysis: String,
    pub recommendations: String,
    pub confidence: f64,
}

pub trait ImageAnalyzer: Send + Sync {
    /// Short label shown in startup logs.
    fn name(&self) -> &str;

    fn analyze(&self, upload: &StoredUpload) -> ImageAnalysis;
}

/// Fixed analysis returned by the full service.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAnalyzer;

impl ImageAnalyzer for PlaceholderAnalyzer {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn analyze(&self, upload: &StoredUpload) -> ImageAnalysis {
        ImageAnalysis {
            filename: upload.filename.clone(),
            file_path: upload.file_path.clone(),
            size: upload.size,
            detected_disease: None,
            analysis: "Dummy analysis: Image uploaded successfully. Crop appears healthy."
                .to_string(),
            recommendations: "Continue current care routine, monitor for pest activity"
                .to_string(),
            confidence: 0.75,
        }
    }
}

/// Lightweight analyzer for the CI build.
#[derive(Debug, Clone)]
pub struct LiteAnalyzer {
    classifier: Classifier,
}

impl LiteAnalyzer {
    pub const QUERY: &'static str = "general plant advice";
    pub const LOCATION: &'static str = "General";

    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }
}

impl ImageAnalyzer for LiteAnalyzer {
    fn name(&self) -> &str {
        "lite"
    }

    fn analyze(&self, upload: &StoredUpload) -> ImageAnalysis {
        ImageAnalysis {
            filename: upload.filename.clone(),
            file_path: upload.file_path.clone(),
            size: upload.size,
            detected_disease: Some("Plant image uploaded successfully".to_string()),
            analysis: format!("Uploaded: {}", upload.filename),
            recommendations: self.classifier.classify(Self::QUERY, Self::LOCATION),
            confidence: 0.5,
        }
    }
}
