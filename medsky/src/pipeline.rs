//! End-to-end pipeline: parse, segment, extract, validate, persist.
//!
//! Partial results are always written. Missing sections are logged, listed
//! in the [`PipelineReport`] and never sent to the model. Failed extractions
//! are logged and listed too; failed validations degrade to fallback
//! results. Only parse, I/O and configuration failures abort a run.

use async_trait::async_trait;
use futures::future::join_all;
use llamaparse_adapter::LlamaParseClient;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::completion::CompletionBackend;
use crate::error::MedskyError;
use crate::extraction::Extractor;
use crate::record::{extract_metadata, inspect_record, DocumentMetadata, RecordCheck};
use crate::schema::{ExtractedRecord, ValidationAnalysis, ValidationResult, ValidationType};
use crate::section::{segment_all, SectionKind, Sections};
use crate::stats::{calculate_analysis_statistics, AnalysisStatistics};
use crate::store::ArtifactStore;
use crate::validation::{processing_error_result, ValidatorConfig, Validator};

/// Default model on the completion service.
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3.1";

/// Default validation concurrency: every section/type pair at once.
pub const DEFAULT_MAX_CONCURRENCY: usize =
    SectionKind::EXTRACTABLE.len() * ValidationType::ALL.len();

pub const PARSED_DOCUMENT_FILE: &str = "parsed_document.txt";
pub const VALIDATION_DIR: &str = "validation_results";
pub const ANALYSIS_FILE: &str = "validation_analysis.json";
pub const STATISTICS_FILE: &str = "analysis_statistics.json";

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory receiving every artifact (default: `output`).
    pub output_dir: PathBuf,
    /// Model name, recorded in logs.
    pub model: String,
    /// Validation tasks allowed in flight at once (default: 15).
    pub max_concurrency: usize,
    pub validator: ValidatorConfig,
    /// Run [`Sections::cleaned`] before extraction and validation. Section
    /// text files are always written raw.
    pub clean_sections: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            model: DEFAULT_MODEL.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            validator: ValidatorConfig::default(),
            clean_sections: false,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub const fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    #[must_use]
    pub const fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub const fn with_clean_sections(mut self, clean: bool) -> Self {
        self.clean_sections = clean;
        self
    }
}

/// Produces the raw text of a document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn document_text(&self, path: &Path) -> Result<String, MedskyError>;
}

#[async_trait]
impl DocumentSource for LlamaParseClient {
    async fn document_text(&self, path: &Path) -> Result<String, MedskyError> {
        Ok(self.parse_text(path).await?)
    }
}

/// One of the validation results of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRecord {
    pub section: SectionKind,
    pub validation_type: ValidationType,
    pub result: ValidationResult,
    /// The result is a placeholder, not a model answer.
    pub fallback: bool,
    pub attempts: usize,
}

impl ValidationRecord {
    /// `{section_key}_{validation_type}.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.section.key(), self.validation_type)
    }
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub output_dir: PathBuf,
    pub record_check: RecordCheck,
    pub metadata: DocumentMetadata,
    pub missing_sections: Vec<SectionKind>,
    pub extracted: Vec<ExtractedRecord>,
    pub extraction_failures: Vec<(SectionKind, String)>,
    pub validations: Vec<ValidationRecord>,
    pub analysis: ValidationAnalysis,
    pub statistics: AnalysisStatistics,
    /// Every file written, in write order.
    pub artifacts: Vec<PathBuf>,
}

impl PipelineReport {
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.validations.iter().filter(|v| v.fallback).count()
    }
}

pub struct Pipeline<B> {
    backend: Arc<B>,
    source: Option<Arc<dyn DocumentSource>>,
    config: PipelineConfig,
}

impl<B: CompletionBackend + 'static> Pipeline<B> {
    #[must_use]
    pub fn new(backend: B, config: PipelineConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            source: None,
            config,
        }
    }

    /// Sets the source used by [`Pipeline::run`].
    #[must_use]
    pub fn with_source(mut self, source: impl DocumentSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parses the PDF at `path` and runs every later stage on its text.
    ///
    /// # Errors
    /// `MedskyError::Config` without a document source, `MedskyError::Parse`
    /// if parsing fails, and I/O errors while writing artifacts.
    pub async fn run(&self, path: &Path) -> Result<PipelineReport, MedskyError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MedskyError::Config("no document source configured".to_string()))?;

        tracing::info!(file = %path.display(), "Parsing document");
        let text = source.document_text(path).await?;
        let store = ArtifactStore::new(&self.config.output_dir);
        let parsed = store.write_text(PARSED_DOCUMENT_FILE, &text)?;

        let mut report = self.run_text(&text).await?;
        report.artifacts.insert(0, parsed);
        Ok(report)
    }

    /// Runs segmentation, extraction and validation on already-parsed text.
    ///
    /// # Errors
    /// Returns I/O or serialization errors while writing section and
    /// extraction artifacts. Failed result writes are collected into
    /// `MedskyError::Persist` after every result file was attempted.
    pub async fn run_text(&self, text: &str) -> Result<PipelineReport, MedskyError> {
        let store = ArtifactStore::new(&self.config.output_dir);
        let mut artifacts = Vec::new();

        let record_check = inspect_record(text);
        if !record_check.is_valid {
            tracing::warn!(
                confidence = record_check.confidence,
                missing = ?record_check.missing_elements,
                "Document does not look like a student record"
            );
        }
        let metadata = extract_metadata(text);
        tracing::info!(
            chars = metadata.text_length,
            school = metadata.school_name.as_deref().unwrap_or("-"),
            year = metadata.academic_year.as_deref().unwrap_or("-"),
            "Document loaded"
        );

        // Segmentation
        let sections = segment_all(text);
        for (kind, body) in sections.iter() {
            if body.is_empty() {
                tracing::warn!(section = %kind, header = kind.label(), "Section not found");
                continue;
            }
            artifacts.push(store.write_text(kind.text_file_name(), body)?);
        }
        let missing_sections = sections.missing_required();
        tracing::info!(
            total_chars = sections.stats().total_chars,
            missing = missing_sections.len(),
            "Segmentation finished"
        );

        let sections = if self.config.clean_sections {
            sections.cleaned()
        } else {
            sections
        };

        // Extraction
        let extractor = Extractor::new(Arc::clone(&self.backend));
        let present = sections.present_required();
        let extractions = present.iter().map(|&kind| {
            let extractor = &extractor;
            let text = sections.get(kind);
            async move { (kind, extractor.extract(kind, text).await) }
        });
        let mut extracted = Vec::new();
        let mut extraction_failures = Vec::new();
        for (kind, result) in join_all(extractions).await {
            match result {
                Ok(record) => {
                    tracing::info!(section = %kind, rows = record.len(), "Section extracted");
                    artifacts.push(store.write_json(kind.parsed_file_name(), &record)?);
                    extracted.push(record);
                }
                Err(e) => {
                    tracing::error!(section = %kind, error = %e, "Extraction failed");
                    extraction_failures.push((kind, e.to_string()));
                }
            }
        }

        // Validation
        let validations = self.validate_sections(&sections).await;
        let analysis: ValidationAnalysis = validations.iter().map(|v| &v.result).collect();
        let statistics = calculate_analysis_statistics(&extracted, &analysis);
        tracing::info!(
            score = statistics.validation_score,
            strengths = ?statistics.strength_areas,
            improvements = ?statistics.improvement_areas,
            "Analysis statistics"
        );

        // Persistence: one failed write never blocks the others.
        let mut failed = Vec::new();
        let mut first_error = None;
        let mut writes: Vec<(PathBuf, Result<PathBuf, MedskyError>)> = validations
            .iter()
            .map(|record| {
                let path = Path::new(VALIDATION_DIR).join(record.file_name());
                let result = store.write_json(&path, &record.result);
                (path, result)
            })
            .collect();
        writes.push((ANALYSIS_FILE.into(), store.write_json(ANALYSIS_FILE, &analysis)));
        writes.push((STATISTICS_FILE.into(), store.write_json(STATISTICS_FILE, &statistics)));
        for (path, result) in writes {
            match result {
                Ok(written) => artifacts.push(written),
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "Failed to write result");
                    first_error.get_or_insert_with(|| e.to_string());
                    failed.push(store.root().join(path));
                }
            }
        }
        if let Some(first) = first_error {
            return Err(MedskyError::Persist { failed, first });
        }

        let report = PipelineReport {
            output_dir: self.config.output_dir.clone(),
            record_check,
            metadata,
            missing_sections,
            extracted,
            extraction_failures,
            validations,
            analysis,
            statistics,
            artifacts,
        };
        tracing::info!(
            model = %self.config.model,
            extracted = report.extracted.len(),
            validations = report.validations.len(),
            fallbacks = report.fallback_count(),
            output = %report.output_dir.display(),
            "Pipeline finished"
        );
        Ok(report)
    }

    /// Validates every non-empty extractable section with every validation
    /// type. Empty sections get no tasks.
    ///
    /// Tasks run on the runtime bounded by `max_concurrency`. Results are
    /// returned in (section, type) order regardless of completion order. A
    /// task that panics yields a processing-error placeholder.
    pub async fn validate_sections(&self, sections: &Sections) -> Vec<ValidationRecord> {
        let validator = Arc::new(Validator::with_config(
            Arc::clone(&self.backend),
            self.config.validator.clone(),
        ));
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        let jobs: Vec<(SectionKind, ValidationType)> = sections
            .present_required()
            .into_iter()
            .flat_map(|kind| ValidationType::ALL.map(|t| (kind, t)))
            .collect();
        tracing::info!(
            tasks = jobs.len(),
            max_concurrency = self.config.max_concurrency,
            "Starting validation"
        );

        let handles = jobs.iter().map(|&(kind, validation_type)| {
            let validator = Arc::clone(&validator);
            let semaphore = Arc::clone(&semaphore);
            let text = sections.get(kind).to_string();
            tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                validator.validate_detailed(&text, validation_type).await
            })
        });
        let joined = join_all(handles).await;

        jobs.into_iter()
            .zip(joined)
            .map(|((section, validation_type), joined)| match joined {
                Ok((outcome, metrics)) => ValidationRecord {
                    section,
                    validation_type,
                    fallback: outcome.is_fallback(),
                    attempts: metrics.attempts,
                    result: outcome.into_result(),
                },
                Err(e) => {
                    tracing::error!(
                        section = %section,
                        %validation_type,
                        error = %e,
                        "Validation task failed"
                    );
                    ValidationRecord {
                        section,
                        validation_type,
                        result: processing_error_result(validation_type, &e.to_string()),
                        fallback: true,
                        attempts: 0,
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_concurrency_covers_every_pair() {
        assert_eq!(DEFAULT_MAX_CONCURRENCY, 15);
        assert_eq!(PipelineConfig::default().max_concurrency, 15);
    }

    #[test]
    fn validation_file_names() {
        let record = ValidationRecord {
            section: SectionKind::AcademicDevelopment,
            validation_type: ValidationType::BlackLine,
            result: ValidationResult::single(ValidationType::BlackLine, "a", "b"),
            fallback: false,
            attempts: 1,
        };
        assert_eq!(record.file_name(), "academic_development_black_line.json");
    }
}
