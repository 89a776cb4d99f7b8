//! Record schemas for structured extraction and validation.
//!
//! Field names follow the Korean keys of the record tables. The JSON schemas
//! sent to the completion service are derived from these types, and every
//! response is checked against the same schema before deserialization.

use crate::section::SectionKind;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A type that can be requested as a structured completion.
pub trait StructuredOutput: JsonSchema + DeserializeOwned + Serialize + Send + 'static {
    /// Name attached to the schema in the completion request.
    const SCHEMA_NAME: &'static str;

    /// JSON schema for this type.
    #[must_use]
    fn response_schema() -> Value {
        schemars::schema_for!(Self).to_value()
    }
}

// ---------------------------------------------------------------------------
// 창의적 체험활동상황
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreativeActivity {
    #[serde(rename = "영역")]
    #[schemars(
        description = "해당 창의적 체험활동상황의 영역. 영역 column of table e.g - 자율활동, 동아리활동, ..."
    )]
    pub area: String,

    #[serde(rename = "시간")]
    #[schemars(description = "해당 창의적 체험활동상황의 시간. 시간 column of table")]
    pub hours: u32,

    #[serde(rename = "특기사항")]
    #[schemars(description = "해당 창의적 체험활동상황의 특기사항. 특기사항 column of table")]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreativeActivities {
    #[serde(rename = "창의적체험활동상황")]
    #[schemars(description = "The list of creative activities")]
    pub activities: Vec<CreativeActivity>,
}

impl StructuredOutput for CreativeActivities {
    const SCHEMA_NAME: &'static str = "creative_activities";
}

// ---------------------------------------------------------------------------
// 교과학습발달상황
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AcademicDevelopment {
    #[serde(rename = "과목")]
    #[schemars(description = "해당 교과학습발달상황의 과목. 과목 column of table e.g - 수학, 과학, ...")]
    pub subject: String,

    #[serde(rename = "학점수")]
    #[schemars(description = "해당 교과학습발달상황의 학점수. 학점수 column of table")]
    pub credits: u32,

    #[schemars(description = "해당 교과학습발달상황의 원점수/과목평균. 원점수/과목평균 column of table")]
    pub score_over_average: String,

    #[serde(rename = "성취도")]
    #[schemars(description = "해당 교과학습발달상황의 성취도. 성취도 column of table")]
    pub achievement: String,

    #[serde(rename = "석차등급")]
    #[schemars(description = "해당 교과학습발달상황의 석차등급. 석차등급 column of table")]
    pub rank_grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AcademicDevelopments {
    #[serde(rename = "교과학습발달상황")]
    #[schemars(description = "The list of academic developments")]
    pub developments: Vec<AcademicDevelopment>,
}

impl StructuredOutput for AcademicDevelopments {
    const SCHEMA_NAME: &'static str = "academic_developments";
}

// ---------------------------------------------------------------------------
// 세부능력 및 특기사항
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedAbility {
    #[serde(rename = "과목")]
    #[schemars(description = "해당 세부특기사항의 과목.")]
    pub subject: String,

    #[serde(rename = "특기사항")]
    #[schemars(description = "해당 과목의 특기사항.")]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedAbilities {
    #[serde(rename = "세부특기사항")]
    #[schemars(description = "The list of detailed abilities")]
    pub abilities: Vec<DetailedAbility>,
}

impl StructuredOutput for DetailedAbilities {
    const SCHEMA_NAME: &'static str = "detailed_abilities";
}

/// The decoded result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractedRecord {
    CreativeActivities(CreativeActivities),
    AcademicDevelopment(AcademicDevelopments),
    DetailedAbilities(DetailedAbilities),
}

impl ExtractedRecord {
    #[must_use]
    pub const fn kind(&self) -> SectionKind {
        match self {
            Self::CreativeActivities(_) => SectionKind::CreativeActivities,
            Self::AcademicDevelopment(_) => SectionKind::AcademicDevelopment,
            Self::DetailedAbilities(_) => SectionKind::DetailedAbilities,
        }
    }

    /// Number of rows extracted.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::CreativeActivities(r) => r.activities.len(),
            Self::AcademicDevelopment(r) => r.developments.len(),
            Self::DetailedAbilities(r) => r.abilities.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Kind of qualitative feedback requested from the model.
///
/// Variants carry no doc comments so the derived schema stays a plain string
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    // 진로 역량 강조
    BlueHighlight,
    // 구체적 노력·깊이 강조
    RedLine,
    // 연계·후속 탐구 강조
    BlueLine,
    // 구체성 부족
    BlackLine,
    // 평가 불가 수준
    RedCheck,
}

impl ValidationType {
    /// All types in canonical order.
    pub const ALL: [Self; 5] = [
        Self::BlueHighlight,
        Self::RedLine,
        Self::BlueLine,
        Self::BlackLine,
        Self::RedCheck,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlueHighlight => "blue_highlight",
            Self::RedLine => "red_line",
            Self::BlueLine => "blue_line",
            Self::BlackLine => "black_line",
            Self::RedCheck => "red_check",
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown validation type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationFeedback {
    #[schemars(
        description = "평가된 컨텐츠에서 피드백 대상이 되는 문장. 원본 텍스트와 반드시 동일하게 작성해야 함."
    )]
    pub sentence: String,

    #[schemars(description = "컨텐츠에 대한 피드백. 해당 피드백을 왜 제시하게 됐는지에 대한 설명")]
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    #[serde(rename = "type")]
    #[schemars(description = "The type of validation")]
    pub validation_type: ValidationType,

    #[serde(rename = "Feedbacks")]
    #[schemars(description = "The list of Feedbacks for the validation")]
    pub feedbacks: Vec<ValidationFeedback>,
}

impl StructuredOutput for ValidationResult {
    const SCHEMA_NAME: &'static str = "validation_output";
}

impl ValidationResult {
    /// A result holding a single feedback entry.
    #[must_use]
    pub fn single(
        validation_type: ValidationType,
        sentence: impl Into<String>,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            validation_type,
            feedbacks: vec![ValidationFeedback {
                sentence: sentence.into(),
                feedback: feedback.into(),
            }],
        }
    }
}

/// Feedback merged across sections, one result per validation type.
///
/// Serializes as `{ "blue_highlight": { "type": .., "Feedbacks": [..] }, .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationAnalysis {
    pub blue_highlight: ValidationResult,
    pub red_line: ValidationResult,
    pub blue_line: ValidationResult,
    pub black_line: ValidationResult,
    pub red_check: ValidationResult,
}

impl Default for ValidationAnalysis {
    fn default() -> Self {
        let empty = |validation_type| ValidationResult {
            validation_type,
            feedbacks: Vec::new(),
        };
        Self {
            blue_highlight: empty(ValidationType::BlueHighlight),
            red_line: empty(ValidationType::RedLine),
            blue_line: empty(ValidationType::BlueLine),
            black_line: empty(ValidationType::BlackLine),
            red_check: empty(ValidationType::RedCheck),
        }
    }
}

impl ValidationAnalysis {
    /// Appends the feedback of `result` under its validation type.
    pub fn merge(&mut self, result: &ValidationResult) {
        self.entry(result.validation_type)
            .feedbacks
            .extend(result.feedbacks.iter().cloned());
    }

    #[must_use]
    pub const fn get(&self, validation_type: ValidationType) -> &ValidationResult {
        match validation_type {
            ValidationType::BlueHighlight => &self.blue_highlight,
            ValidationType::RedLine => &self.red_line,
            ValidationType::BlueLine => &self.blue_line,
            ValidationType::BlackLine => &self.black_line,
            ValidationType::RedCheck => &self.red_check,
        }
    }

    /// Number of feedback entries for `validation_type`.
    #[must_use]
    pub fn count(&self, validation_type: ValidationType) -> usize {
        self.get(validation_type).feedbacks.len()
    }

    /// Total feedback entries across all types.
    #[must_use]
    pub fn total(&self) -> usize {
        ValidationType::ALL.iter().map(|t| self.count(*t)).sum()
    }

    fn entry(&mut self, validation_type: ValidationType) -> &mut ValidationResult {
        match validation_type {
            ValidationType::BlueHighlight => &mut self.blue_highlight,
            ValidationType::RedLine => &mut self.red_line,
            ValidationType::BlueLine => &mut self.blue_line,
            ValidationType::BlackLine => &mut self.black_line,
            ValidationType::RedCheck => &mut self.red_check,
        }
    }
}

impl<'a> FromIterator<&'a ValidationResult> for ValidationAnalysis {
    fn from_iter<I: IntoIterator<Item = &'a ValidationResult>>(iter: I) -> Self {
        let mut analysis = Self::default();
        for result in iter {
            analysis.merge(result);
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creative_schema_uses_korean_keys() {
        let schema = CreativeActivities::response_schema();
        let text = schema.to_string();
        assert!(text.contains("창의적체험활동상황"));
        assert!(text.contains("영역"));
        assert!(text.contains("The list of creative activities"));
    }

    #[test]
    fn validation_result_wire_shape() {
        let result = ValidationResult::single(ValidationType::RedLine, "문장", "피드백");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "type": "red_line",
                "Feedbacks": [{ "sentence": "문장", "feedback": "피드백" }]
            })
        );
    }

    #[test]
    fn validation_type_round_trips_through_str() {
        for t in ValidationType::ALL {
            assert_eq!(t.as_str().parse::<ValidationType>(), Ok(t));
        }
        assert!("green".parse::<ValidationType>().is_err());
    }

    #[test]
    fn analysis_merges_by_type() {
        let results = [
            ValidationResult::single(ValidationType::BlueLine, "a", "1"),
            ValidationResult::single(ValidationType::BlueLine, "b", "2"),
            ValidationResult::single(ValidationType::RedCheck, "c", "3"),
        ];
        let analysis: ValidationAnalysis = results.iter().collect();

        assert_eq!(analysis.count(ValidationType::BlueLine), 2);
        assert_eq!(analysis.get(ValidationType::RedCheck).feedbacks[0].sentence, "c");
        assert!(analysis.blue_highlight.feedbacks.is_empty());
        assert_eq!(analysis.total(), 3);
    }

    #[test]
    fn analysis_keeps_result_shape_per_type() {
        let results = [ValidationResult::single(ValidationType::RedLine, "문장", "피드백")];
        let analysis: ValidationAnalysis = results.iter().collect();
        let value = serde_json::to_value(&analysis).unwrap();

        assert_eq!(
            value["red_line"],
            json!({ "type": "red_line", "Feedbacks": [{ "sentence": "문장", "feedback": "피드백" }] })
        );
        assert_eq!(value["black_line"], json!({ "type": "black_line", "Feedbacks": [] }));
    }

    #[test]
    fn validation_type_schema_is_a_single_enum() {
        let text = ValidationResult::response_schema().to_string();
        assert!(!text.contains("oneOf"));
        for t in ValidationType::ALL {
            assert!(text.contains(&format!("\"{}\"", t.as_str())));
        }
    }

    #[test]
    fn extracted_record_serializes_without_tag() {
        let record = ExtractedRecord::DetailedAbilities(DetailedAbilities {
            abilities: vec![DetailedAbility {
                subject: "국어".into(),
                remarks: "토론에 적극 참여함".into(),
            }],
        });
        assert_eq!(record.kind(), SectionKind::DetailedAbilities);
        assert_eq!(record.len(), 1);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "세부특기사항": [{ "과목": "국어", "특기사항": "토론에 적극 참여함" }] })
        );
    }
}
