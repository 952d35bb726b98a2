//! The advisory pipeline: classify → translate → log.
//!
//! [`AdvisoryService`] is what every surface (HTTP handler, CLI) calls. It
//! owns the immutable classifier and translator and a shared handle to the
//! query log backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::classify::{Classifier, Match};
use crate::models::{
    AdvisoryRequest, AdvisoryResponse, QueryLogEntry, ADVISORY_CONFIDENCE, HINDI, TTS_PLACEHOLDER,
};
use crate::query_log::QueryLog;
use crate::translate::Translator;

#[derive(Clone)]
pub struct AdvisoryService {
    classifier: Arc<Classifier>,
    translator: Arc<Translator>,
    log: Arc<dyn QueryLog>,
}

impl AdvisoryService {
    pub fn new(classifier: Classifier, translator: Translator, log: Arc<dyn QueryLog>) -> Self {
        Self {
            classifier: Arc::new(classifier),
            translator: Arc::new(translator),
            log,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn log(&self) -> &Arc<dyn QueryLog> {
        &self.log
    }

    /// Answers `request` without touching the log.
    pub fn answer(&self, request: &AdvisoryRequest) -> AdvisoryResponse {
        self.answer_with_match(request).0
    }

    /// Like [`answer`](Self::answer) but also reports which rule fired.
    pub fn answer_with_match(&self, request: &AdvisoryRequest) -> (AdvisoryResponse, Match<'_>) {
        let (advice, matched) = self
            .classifier
            .classify_with_match(&request.query, &request.location);
        let advice = if request.language == HINDI {
            self.translator.translate(&advice, HINDI).to_string()
        } else {
            advice
        };

        let response = AdvisoryResponse {
            advice,
            language: request.language.clone(),
            tts: TTS_PLACEHOLDER.to_string(),
            confidence: ADVISORY_CONFIDENCE,
        };
        (response, matched)
    }

    /// Answers `request` and records it in the query log.
    ///
    /// The log write happens before the response is returned; a failed
    /// write fails the whole call.
    pub async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse> {
        self.advise_at(request, Utc::now()).await
    }

    pub async fn advise_at(
        &self,
        request: &AdvisoryRequest,
        now: DateTime<Utc>,
    ) -> Result<AdvisoryResponse> {
        let (response, _) = self.advise_with_match_at(request, now).await?;
        Ok(response)
    }

    /// Like [`advise`](Self::advise) but also reports which rule fired.
    pub async fn advise_with_match(
        &self,
        request: &AdvisoryRequest,
    ) -> Result<(AdvisoryResponse, Match<'_>)> {
        self.advise_with_match_at(request, Utc::now()).await
    }

    async fn advise_with_match_at(
        &self,
        request: &AdvisoryRequest,
        now: DateTime<Utc>,
    ) -> Result<(AdvisoryResponse, Match<'_>)> {
        let (response, matched) = self.answer_with_match(request);

        let entry = QueryLogEntry {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            query: request.query.clone(),
            location: request.location.clone(),
            language: request.language.clone(),
            advice: response.advice.clone(),
        };
        self.log
            .append(entry)
            .await
            .context("Failed to record query")?;

        tracing::debug!(
            location = %request.location,
            language = %request.language,
            matched = ?matched,
            "advisory answered"
        );

        Ok((response, matched))
    }
}
