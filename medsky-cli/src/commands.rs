use anyhow::Context;
use medsky::completion::CompletionBackend;
use medsky::extraction::Extractor;
use medsky::pipeline::{Pipeline, PipelineConfig, PipelineReport};
use medsky::schema::ValidationType;
use medsky::section::{segment_all, SectionKind};
use medsky::store::ArtifactStore;
use medsky::validation::{Validator, ValidatorConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{BackendKind, EnvConfig};

/// Options shared by `run` invocations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub from_text: bool,
    pub out: PathBuf,
    pub model: Option<String>,
    pub max_concurrency: usize,
    pub backend: BackendKind,
    /// Normalize section text before sending it to the model.
    pub clean: bool,
}

/// Runs the full pipeline on a PDF, or on already-parsed text.
///
/// # Errors
/// Returns configuration, parse and I/O failures.
pub async fn run(env: &EnvConfig, options: RunOptions) -> anyhow::Result<PipelineReport> {
    let missing = env.missing(!options.from_text);
    if !missing.is_empty() {
        anyhow::bail!("missing environment variables: {}", missing.join(", "));
    }

    let backend = env.backend(options.backend, options.model.as_deref())?;
    let config = PipelineConfig::default()
        .with_output_dir(&options.out)
        .with_model(backend.model())
        .with_max_concurrency(options.max_concurrency)
        .with_clean_sections(options.clean);
    let pipeline = Pipeline::new(backend, config);

    let report = if options.from_text {
        let text = read_text(&options.input)?;
        pipeline.run_text(&text).await?
    } else {
        pipeline
            .with_source(env.parser()?)
            .run(&options.input)
            .await?
    };

    print_summary(&report);
    Ok(report)
}

/// Segments a parsed text file and writes the section files.
///
/// # Errors
/// Returns I/O failures.
pub fn segment(input: &Path, out: &Path) -> anyhow::Result<()> {
    let text = read_text(input)?;
    let sections = segment_all(&text);
    let store = ArtifactStore::new(out);

    for (kind, body) in sections.iter() {
        if body.is_empty() {
            println!("[MISSING] {} ({})", kind.label(), kind.key());
            continue;
        }
        let path = store.write_text(kind.text_file_name(), body)?;
        println!("[OK] {} chars -> {}", body.chars().count(), path.display());
    }

    let stats = sections.stats();
    println!("\nTotal: {} chars, {} empty sections", stats.total_chars, stats.empty.len());
    Ok(())
}

/// Extracts one section from a text file and prints the records as JSON.
///
/// # Errors
/// Returns configuration, completion and decode failures.
pub async fn extract(
    backend: Arc<dyn CompletionBackend>,
    kind: SectionKind,
    input: &Path,
) -> anyhow::Result<()> {
    let text = read_text(input)?;
    let record = Extractor::new(backend).extract(kind, &text).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Validates a text file with one validation type and prints the result.
///
/// # Errors
/// Returns I/O failures only; validation failures become a fallback result.
pub async fn validate(
    backend: Arc<dyn CompletionBackend>,
    validation_type: ValidationType,
    input: &Path,
    max_retries: usize,
) -> anyhow::Result<()> {
    let text = read_text(input)?;
    let validator = Validator::with_config(
        backend,
        ValidatorConfig::default().with_max_retries(max_retries),
    );
    let (outcome, metrics) = validator.validate_detailed(&text, validation_type).await;
    if outcome.is_fallback() {
        tracing::warn!(attempts = metrics.attempts, "All attempts failed, printing fallback");
    }
    println!("{}", serde_json::to_string_pretty(outcome.result())?);
    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_summary(report: &PipelineReport) {
    println!("\nOutput directory: {}", report.output_dir.display());
    println!(
        "Record check: valid={} confidence={:.2}",
        report.record_check.is_valid, report.record_check.confidence
    );
    for kind in &report.missing_sections {
        println!("[MISSING] {}", kind.label());
    }
    for (kind, error) in &report.extraction_failures {
        println!("[FAILED] extraction of {kind}: {error}");
    }
    println!(
        "Extracted {} sections, {} validations ({} fallbacks), {} files written",
        report.extracted.len(),
        report.validations.len(),
        report.fallback_count(),
        report.artifacts.len()
    );
    println!("Validation score: {}", report.statistics.validation_score);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_writes_found_sections_only() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("parsed.txt");
        std::fs::write(
            &input,
            "6. 창의적 체험활동상황\n자율활동 74\n7. 교과학습발달상황\n국어 4\n세부능력 및 특기사항\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        segment(&input, &out).unwrap();

        assert!(out.join("1_creative_activities.txt").exists());
        assert!(out.join("2_academic_development.txt").exists());
        assert!(!out.join("3_detailed_abilities.txt").exists());
    }

    #[test]
    fn missing_input_names_the_file() {
        let err = read_text(Path::new("/nonexistent/parsed.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/parsed.txt"));
    }
}
