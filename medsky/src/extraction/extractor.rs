//! Schema-constrained extraction of record sections.

use futures::future::join_all;
use tokio::time::Instant;

use super::decode::decode;
use super::error::ExtractionError;
use super::metrics::{estimate_tokens, CallMetrics};
use crate::completion::{CompletionBackend, StructuredRequest};
use crate::prompts::{get_prompt, is_invalid};
use crate::schema::{
    AcademicDevelopments, CreativeActivities, DetailedAbilities, ExtractedRecord, StructuredOutput,
};
use crate::section::{SectionKind, Sections};

/// Turns section text into typed records with one structured completion per
/// section. There is no retry at this layer.
pub struct Extractor<B> {
    backend: B,
}

impl<B: CompletionBackend> Extractor<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Extracts the records of `kind` from `section_text`.
    ///
    /// # Errors
    ///
    /// `UnsupportedSection` for kinds without a schema (no request is sent),
    /// `Completion` for transport failures and `Decode` for output that does
    /// not match the schema.
    pub async fn extract(
        &self,
        kind: SectionKind,
        section_text: &str,
    ) -> Result<ExtractedRecord, ExtractionError> {
        match kind {
            SectionKind::CreativeActivities => self
                .extract_creative(section_text)
                .await
                .map(ExtractedRecord::CreativeActivities),
            SectionKind::AcademicDevelopment => self
                .extract_academic(section_text)
                .await
                .map(ExtractedRecord::AcademicDevelopment),
            SectionKind::DetailedAbilities => self
                .extract_detailed(section_text)
                .await
                .map(ExtractedRecord::DetailedAbilities),
            SectionKind::ReadingActivities | SectionKind::BehavioralCharacteristics => {
                Err(ExtractionError::UnsupportedSection(kind))
            }
        }
    }

    /// # Errors
    /// See [`Extractor::extract`].
    pub async fn extract_creative(
        &self,
        section_text: &str,
    ) -> Result<CreativeActivities, ExtractionError> {
        self.extract_typed(SectionKind::CreativeActivities, section_text)
            .await
    }

    /// # Errors
    /// See [`Extractor::extract`].
    pub async fn extract_academic(
        &self,
        section_text: &str,
    ) -> Result<AcademicDevelopments, ExtractionError> {
        self.extract_typed(SectionKind::AcademicDevelopment, section_text)
            .await
    }

    /// # Errors
    /// See [`Extractor::extract`].
    pub async fn extract_detailed(
        &self,
        section_text: &str,
    ) -> Result<DetailedAbilities, ExtractionError> {
        self.extract_typed(SectionKind::DetailedAbilities, section_text)
            .await
    }

    /// Extracts every extractable section concurrently. Results come back in
    /// [`SectionKind::EXTRACTABLE`] order; one failure does not affect the
    /// others.
    pub async fn extract_all(
        &self,
        sections: &Sections,
    ) -> Vec<(SectionKind, Result<ExtractedRecord, ExtractionError>)> {
        let tasks = SectionKind::EXTRACTABLE.map(|kind| async move {
            (kind, self.extract(kind, sections.get(kind)).await)
        });
        join_all(tasks).await
    }

    async fn extract_typed<T: StructuredOutput>(
        &self,
        kind: SectionKind,
        section_text: &str,
    ) -> Result<T, ExtractionError> {
        let prompt = get_prompt(kind.prompt_key());
        if is_invalid(prompt) {
            return Err(ExtractionError::InvalidPrompt(kind.prompt_key().to_string()));
        }

        let start = Instant::now();
        let request = StructuredRequest::new(prompt, section_text, T::SCHEMA_NAME, T::response_schema());
        let value = self.backend.complete(request).await?;
        let output = value.to_string();
        let record = decode::<T>(value)?;

        let metrics = CallMetrics {
            attempts: 1,
            wall_time: start.elapsed(),
            estimated_input_tokens: estimate_tokens(prompt) + estimate_tokens(section_text),
            estimated_output_tokens: estimate_tokens(&output),
        };
        tracing::info!(
            section = %kind,
            model = %self.backend.model(),
            wall_time_ms = metrics.wall_time.as_millis(),
            input_tokens = metrics.estimated_input_tokens,
            output_tokens = metrics.estimated_output_tokens,
            "Extraction completed"
        );
        Ok(record)
    }
}
