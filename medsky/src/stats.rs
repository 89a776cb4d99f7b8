//! Summary statistics over the extracted records and the merged validation
//! analysis of one run.

use serde::Serialize;

use crate::schema::{CreativeActivity, ExtractedRecord, ValidationAnalysis, ValidationType};

/// Score per validation type, 0 to 100.
///
/// The three positive types score their share of all feedback. The two
/// negative types score `100 - 2 * share`, floored at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryScores {
    pub blue_highlight: u32,
    pub red_line: u32,
    pub blue_line: u32,
    pub black_line: u32,
    pub red_check: u32,
}

impl CategoryScores {
    #[allow(clippy::cast_precision_loss)]
    fn from_analysis(analysis: &ValidationAnalysis) -> Self {
        let total = analysis.total();
        if total == 0 {
            return Self::default();
        }
        let share = |t: ValidationType| analysis.count(t) as f64 / total as f64 * 100.0;
        let negative = |t: ValidationType| (100.0 - share(t) * 2.0).max(0.0);
        Self {
            blue_highlight: round(share(ValidationType::BlueHighlight)),
            red_line: round(share(ValidationType::RedLine)),
            blue_line: round(share(ValidationType::BlueLine)),
            black_line: round(negative(ValidationType::BlackLine)),
            red_check: round(negative(ValidationType::RedCheck)),
        }
    }

    #[must_use]
    pub const fn get(&self, validation_type: ValidationType) -> u32 {
        match validation_type {
            ValidationType::BlueHighlight => self.blue_highlight,
            ValidationType::RedLine => self.red_line,
            ValidationType::BlueLine => self.blue_line,
            ValidationType::BlackLine => self.black_line,
            ValidationType::RedCheck => self.red_check,
        }
    }

    /// Weighted overall score: positive types count for 70%, negative for 30%.
    #[must_use]
    pub fn overall(&self) -> u32 {
        let positive = f64::from(self.blue_highlight) * 0.4
            + f64::from(self.red_line) * 0.35
            + f64::from(self.blue_line) * 0.25;
        let negative = f64::from(self.black_line) * 0.6 + f64::from(self.red_check) * 0.4;
        round(positive * 0.7 + negative * 0.3)
    }
}

// Inputs are percentages in [0, 100].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round(value: f64) -> u32 {
    value.round() as u32
}

/// Totals, scores and highlighted areas of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatistics {
    pub total_activities: usize,
    pub total_activity_hours: u32,
    /// Academic development rows.
    pub total_subjects: usize,
    /// Distinct non-empty activity areas, in first-seen order.
    pub activity_domains: Vec<String>,
    /// Detailed ability rows.
    pub subject_count: usize,
    pub validation_score: u32,
    pub category_scores: CategoryScores,
    pub strength_areas: Vec<String>,
    pub improvement_areas: Vec<String>,
}

/// Computes [`AnalysisStatistics`]. Sections that failed extraction count as
/// empty.
#[must_use]
pub fn calculate_analysis_statistics(
    extracted: &[ExtractedRecord],
    analysis: &ValidationAnalysis,
) -> AnalysisStatistics {
    let mut activities: &[CreativeActivity] = &[];
    let mut total_subjects = 0;
    let mut subject_count = 0;
    for record in extracted {
        match record {
            ExtractedRecord::CreativeActivities(r) => activities = &r.activities,
            ExtractedRecord::AcademicDevelopment(r) => total_subjects = r.developments.len(),
            ExtractedRecord::DetailedAbilities(r) => subject_count = r.abilities.len(),
        }
    }

    let mut areas: Vec<&str> = Vec::new();
    for activity in activities {
        if !areas.contains(&activity.area.as_str()) {
            areas.push(&activity.area);
        }
    }

    let category_scores = CategoryScores::from_analysis(analysis);
    let count = |t| analysis.count(t);

    let mut strength_areas = Vec::new();
    // An empty area still counts toward diversity.
    if areas.len() >= 3 {
        strength_areas.push("활동 영역 다양성");
    }
    if subject_count >= 5 {
        strength_areas.push("교과 영역 폭넓음");
    }
    if count(ValidationType::BlueHighlight) > 2 {
        strength_areas.push("진로 역량");
    }
    if count(ValidationType::RedLine) > 2 {
        strength_areas.push("구체적 노력");
    }
    if count(ValidationType::BlueLine) > 1 {
        strength_areas.push("연계성");
    }

    let mut improvement_areas = Vec::new();
    if count(ValidationType::BlackLine) > 3 {
        improvement_areas.push("구체성 부족");
    }
    if count(ValidationType::RedCheck) > 2 {
        improvement_areas.push("정보 부족");
    }

    AnalysisStatistics {
        total_activities: activities.len(),
        total_activity_hours: activities.iter().map(|a| a.hours).sum(),
        total_subjects,
        activity_domains: areas
            .into_iter()
            .filter(|area| !area.is_empty())
            .map(str::to_string)
            .collect(),
        subject_count,
        validation_score: category_scores.overall(),
        category_scores,
        strength_areas: strength_areas.into_iter().map(str::to_string).collect(),
        improvement_areas: improvement_areas.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        AcademicDevelopments, CreativeActivities, DetailedAbilities, DetailedAbility,
        ValidationResult,
    };

    fn activity(area: &str, hours: u32) -> CreativeActivity {
        CreativeActivity {
            area: area.to_string(),
            hours,
            remarks: String::new(),
        }
    }

    fn analysis(counts: [(ValidationType, usize); 5]) -> ValidationAnalysis {
        let mut analysis = ValidationAnalysis::default();
        for (validation_type, n) in counts {
            for i in 0..n {
                analysis.merge(&ValidationResult::single(
                    validation_type,
                    format!("문장 {i}"),
                    "피드백",
                ));
            }
        }
        analysis
    }

    #[test]
    fn empty_run_scores_zero() {
        let stats = calculate_analysis_statistics(&[], &ValidationAnalysis::default());

        assert_eq!(stats, AnalysisStatistics::default());
        assert_eq!(stats.validation_score, 0);
    }

    #[test]
    fn scores_and_strengths_follow_feedback_counts() {
        let extracted = vec![
            ExtractedRecord::CreativeActivities(CreativeActivities {
                activities: vec![
                    activity("자율활동", 74),
                    activity("동아리활동", 34),
                    activity("자율활동", 6),
                    activity("진로활동", 20),
                    activity("", 0),
                ],
            }),
            ExtractedRecord::AcademicDevelopment(AcademicDevelopments {
                developments: Vec::new(),
            }),
        ];
        let analysis = analysis([
            (ValidationType::BlueHighlight, 3),
            (ValidationType::RedLine, 3),
            (ValidationType::BlueLine, 2),
            (ValidationType::BlackLine, 1),
            (ValidationType::RedCheck, 1),
        ]);

        let stats = calculate_analysis_statistics(&extracted, &analysis);

        assert_eq!(stats.total_activities, 5);
        assert_eq!(stats.total_activity_hours, 134);
        assert_eq!(stats.activity_domains, vec!["자율활동", "동아리활동", "진로활동"]);
        assert_eq!(
            stats.category_scores,
            CategoryScores {
                blue_highlight: 30,
                red_line: 30,
                blue_line: 20,
                black_line: 80,
                red_check: 80,
            }
        );
        assert_eq!(stats.validation_score, 43);
        assert_eq!(
            stats.strength_areas,
            vec!["활동 영역 다양성", "진로 역량", "구체적 노력", "연계성"]
        );
        assert!(stats.improvement_areas.is_empty());
    }

    #[test]
    fn negative_feedback_becomes_improvement_areas() {
        let abilities = (0..5)
            .map(|i| DetailedAbility {
                subject: format!("과목{i}"),
                remarks: String::new(),
            })
            .collect();
        let extracted = vec![ExtractedRecord::DetailedAbilities(DetailedAbilities { abilities })];
        let analysis = analysis([
            (ValidationType::BlueHighlight, 0),
            (ValidationType::RedLine, 0),
            (ValidationType::BlueLine, 0),
            (ValidationType::BlackLine, 4),
            (ValidationType::RedCheck, 3),
        ]);

        let stats = calculate_analysis_statistics(&extracted, &analysis);

        assert_eq!(stats.subject_count, 5);
        assert_eq!(stats.category_scores.get(ValidationType::BlackLine), 0);
        assert_eq!(stats.category_scores.get(ValidationType::RedCheck), 14);
        assert_eq!(stats.category_scores.get(ValidationType::BlueHighlight), 0);
        assert_eq!(stats.strength_areas, vec!["교과 영역 폭넓음"]);
        assert_eq!(stats.improvement_areas, vec!["구체성 부족", "정보 부족"]);
    }

    #[test]
    fn statistics_serialize_with_camel_case_keys() {
        let value = serde_json::to_value(AnalysisStatistics::default()).unwrap();
        assert!(value.get("totalActivityHours").is_some());
        assert!(value["categoryScores"].get("blue_highlight").is_some());
    }
}
