//! Plausibility checks and metadata for a parsed student record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const REQUIRED_MARKERS: [&str; 3] = ["창의적 체험활동상황", "교과학습발달상황", "세부능력 및 특기사항"];
const OPTIONAL_MARKERS: [&str; 2] = ["독서활동상황", "행동특성 및 종합의견"];

const REQUIRED_WEIGHT: f64 = 0.8;
const OPTIONAL_WEIGHT: f64 = 0.2;

/// Characters per page used for the page estimate.
const CHARS_PER_PAGE: usize = 2000;

/// Whether a document looks like a student record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCheck {
    /// At least two required markers are present.
    pub is_valid: bool,
    /// 0.0 to 1.0, rounded to two decimals.
    pub confidence: f64,
    /// Required markers that were not found.
    pub missing_elements: Vec<String>,
}

/// Looks for the section markers every student record carries.
#[must_use]
pub fn inspect_record(text: &str) -> RecordCheck {
    let missing_elements: Vec<String> = REQUIRED_MARKERS
        .iter()
        .filter(|marker| !text.contains(*marker))
        .map(|marker| (*marker).to_string())
        .collect();
    let found_required = REQUIRED_MARKERS.len() - missing_elements.len();
    let found_optional = OPTIONAL_MARKERS
        .iter()
        .filter(|marker| text.contains(*marker))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let confidence = (found_required as f64 / REQUIRED_MARKERS.len() as f64).mul_add(
        REQUIRED_WEIGHT,
        found_optional as f64 / OPTIONAL_MARKERS.len() as f64 * OPTIONAL_WEIGHT,
    );

    RecordCheck {
        is_valid: found_required >= 2,
        confidence: (confidence * 100.0).round() / 100.0,
        missing_elements,
    }
}

/// Descriptive fields found in the record header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub student_name: Option<String>,
    pub school_name: Option<String>,
    pub academic_year: Option<String>,
    pub document_type: Option<String>,
    /// Length in characters.
    pub text_length: usize,
    pub estimated_pages: usize,
}

#[allow(clippy::expect_used)]
static STUDENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"성\s*명\s*[:：]\s*([가-힣]{2,4})").expect("valid regex"));
#[allow(clippy::expect_used)]
static SCHOOL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([가-힣]+(?:초등학교|중학교|고등학교))").expect("valid regex")
});
#[allow(clippy::expect_used)]
static ACADEMIC_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})\s*학년도").expect("valid regex"));

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Pulls student name, school, academic year and document type out of the
/// record text. Fields that cannot be found are `None`.
#[must_use]
pub fn extract_metadata(text: &str) -> DocumentMetadata {
    let document_type = if text.contains("학교생활기록부") {
        Some("학교생활기록부".to_string())
    } else if text.contains("생활기록부") {
        Some("생활기록부".to_string())
    } else {
        None
    };
    let text_length = text.chars().count();

    DocumentMetadata {
        student_name: first_capture(&STUDENT_NAME, text),
        school_name: first_capture(&SCHOOL_NAME, text),
        academic_year: first_capture(&ACADEMIC_YEAR, text),
        document_type,
        text_length,
        estimated_pages: text_length.div_ceil(CHARS_PER_PAGE),
    }
}
