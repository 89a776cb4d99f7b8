//! Anchor-based section segmentation of a parsed student record.
//!
//! A record carries numbered headers (`6. 창의적 체험활동상황`,
//! `7. 교과학습발달상황`, ...). Each section runs from its start anchor up to,
//! but not including, the first end anchor that follows it. Sections that
//! cannot be located come back empty; segmentation never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five sections cut out of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    CreativeActivities,
    AcademicDevelopment,
    DetailedAbilities,
    ReadingActivities,
    BehavioralCharacteristics,
}

impl SectionKind {
    /// All kinds in document order.
    pub const ALL: [Self; 5] = [
        Self::CreativeActivities,
        Self::AcademicDevelopment,
        Self::DetailedAbilities,
        Self::ReadingActivities,
        Self::BehavioralCharacteristics,
    ];

    /// Kinds that have an extraction schema and are validated.
    pub const EXTRACTABLE: [Self; 3] = [
        Self::CreativeActivities,
        Self::AcademicDevelopment,
        Self::DetailedAbilities,
    ];

    /// Stable key used in artifact file names.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CreativeActivities => "creative_activities",
            Self::AcademicDevelopment => "academic_development",
            Self::DetailedAbilities => "detailed_abilities",
            Self::ReadingActivities => "reading_activities",
            Self::BehavioralCharacteristics => "behavioral_characteristics",
        }
    }

    /// 1-based position in the record, used as a file name prefix.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Self::CreativeActivities => 1,
            Self::AcademicDevelopment => 2,
            Self::DetailedAbilities => 3,
            Self::ReadingActivities => 4,
            Self::BehavioralCharacteristics => 5,
        }
    }

    /// Short key understood by [`crate::prompts::get_prompt`].
    #[must_use]
    pub const fn prompt_key(self) -> &'static str {
        match self {
            Self::CreativeActivities => "creative",
            Self::AcademicDevelopment => "academic",
            Self::DetailedAbilities => "detailed",
            Self::ReadingActivities => "reading",
            Self::BehavioralCharacteristics => "behavioral",
        }
    }

    /// Header text as printed on the record.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreativeActivities => "창의적 체험활동상황",
            Self::AcademicDevelopment => "교과학습발달상황",
            Self::DetailedAbilities => "세부능력 및 특기사항",
            Self::ReadingActivities => "독서활동상황",
            Self::BehavioralCharacteristics => "행동특성 및 종합의견",
        }
    }

    #[must_use]
    pub const fn is_extractable(self) -> bool {
        matches!(
            self,
            Self::CreativeActivities | Self::AcademicDevelopment | Self::DetailedAbilities
        )
    }

    /// `1_creative_activities.txt`
    #[must_use]
    pub fn text_file_name(self) -> String {
        format!("{}_{}.txt", self.ordinal(), self.key())
    }

    /// `1_creative_activities_parsed.json`
    #[must_use]
    pub fn parsed_file_name(self) -> String {
        format!("{}_{}_parsed.json", self.ordinal(), self.key())
    }

    fn anchors(self) -> &'static Anchors {
        match self {
            Self::CreativeActivities => &CREATIVE,
            Self::AcademicDevelopment => &ACADEMIC,
            Self::DetailedAbilities => &DETAILED,
            Self::ReadingActivities => &READING,
            Self::BehavioralCharacteristics => &BEHAVIORAL,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    /// Accepts both the short prompt key and the full section key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.prompt_key() == s || kind.key() == s)
            .ok_or_else(|| format!("unknown section: {s}"))
    }
}

struct Anchors {
    start: Lazy<Regex>,
    /// `None` means the section runs to the end of the text.
    end: Option<Lazy<Regex>>,
}

const CREATIVE_HEADER: &str = r"6\.\s*창의적\s*체험활동상황";
const ACADEMIC_HEADER: &str = r"7\.\s*교과학습발달상황";
const DETAILED_HEADER: &str = r"세부능력\s*및\s*특기사항";
const READING_HEADER: &str = r"8\.\s*독서활동상황";
const BEHAVIORAL_HEADER: &str = r"9\.\s*행동특성\s*및\s*종합의견";

// Patterns are compile-time constants covered by tests.
#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("section pattern must be a valid regex")
}

static CREATIVE: Anchors = Anchors {
    start: Lazy::new(|| compile(CREATIVE_HEADER)),
    end: Some(Lazy::new(|| compile(ACADEMIC_HEADER))),
};
static ACADEMIC: Anchors = Anchors {
    start: Lazy::new(|| compile(ACADEMIC_HEADER)),
    end: Some(Lazy::new(|| compile(DETAILED_HEADER))),
};
static DETAILED: Anchors = Anchors {
    start: Lazy::new(|| compile(DETAILED_HEADER)),
    end: Some(Lazy::new(|| compile(READING_HEADER))),
};
static READING: Anchors = Anchors {
    start: Lazy::new(|| compile(READING_HEADER)),
    end: Some(Lazy::new(|| compile(BEHAVIORAL_HEADER))),
};
static BEHAVIORAL: Anchors = Anchors {
    start: Lazy::new(|| compile(BEHAVIORAL_HEADER)),
    end: None,
};

/// Locates the section of `kind` in `text`, borrowing from it.
///
/// Returns `None` when the start anchor is missing, or when a bounded section
/// has no end anchor after its start.
#[must_use]
pub fn find_section(kind: SectionKind, text: &str) -> Option<&str> {
    let anchors = kind.anchors();
    let start = anchors.start.find(text)?;
    let body = match &anchors.end {
        Some(end) => {
            let end = end.find_at(text, start.end())?;
            &text[start.start()..end.start()]
        }
        None => &text[start.start()..],
    };
    Some(body.trim())
}

/// Extracts the section of `kind` from `text`, trimmed. Empty when absent.
#[must_use]
pub fn segment(kind: SectionKind, text: &str) -> String {
    find_section(kind, text).map(str::to_string).unwrap_or_default()
}

/// Segments every section independently.
#[must_use]
pub fn segment_all(text: &str) -> Sections {
    Sections {
        creative_activities: segment(SectionKind::CreativeActivities, text),
        academic_development: segment(SectionKind::AcademicDevelopment, text),
        detailed_abilities: segment(SectionKind::DetailedAbilities, text),
        reading_activities: segment(SectionKind::ReadingActivities, text),
        behavioral_characteristics: segment(SectionKind::BehavioralCharacteristics, text),
    }
}

static LINE_NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^[ \t]*\d+→"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| compile(r"\s*([,.;:!?])\s*"));
static OPEN_PAREN: Lazy<Regex> = Lazy::new(|| compile(r"\s*\(\s*"));
static CLOSE_PAREN: Lazy<Regex> = Lazy::new(|| compile(r"\s*\)\s*"));

/// Normalizes parser artifacts in a section before extraction.
///
/// Drops `12→` line-number prefixes, collapses every whitespace run (page
/// breaks included) into one space, puts exactly one space after
/// punctuation and tightens the spacing around parentheses.
#[must_use]
pub fn clean_section(text: &str) -> String {
    let text = LINE_NUMBER.replace_all(text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = PUNCTUATION.replace_all(&text, "$1 ");
    let text = OPEN_PAREN.replace_all(&text, "(");
    let text = CLOSE_PAREN.replace_all(&text, ") ");
    text.trim().to_string()
}

/// The five segmented sections of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    pub creative_activities: String,
    pub academic_development: String,
    pub detailed_abilities: String,
    pub reading_activities: String,
    pub behavioral_characteristics: String,
}

impl Sections {
    #[must_use]
    pub fn get(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::CreativeActivities => &self.creative_activities,
            SectionKind::AcademicDevelopment => &self.academic_development,
            SectionKind::DetailedAbilities => &self.detailed_abilities,
            SectionKind::ReadingActivities => &self.reading_activities,
            SectionKind::BehavioralCharacteristics => &self.behavioral_characteristics,
        }
    }

    /// Sections in document order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> {
        SectionKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Every section passed through [`clean_section`].
    #[must_use]
    pub fn cleaned(&self) -> Self {
        Self {
            creative_activities: clean_section(&self.creative_activities),
            academic_development: clean_section(&self.academic_development),
            detailed_abilities: clean_section(&self.detailed_abilities),
            reading_activities: clean_section(&self.reading_activities),
            behavioral_characteristics: clean_section(&self.behavioral_characteristics),
        }
    }

    /// Extractable sections with text, in document order.
    #[must_use]
    pub fn present_required(&self) -> Vec<SectionKind> {
        SectionKind::EXTRACTABLE
            .into_iter()
            .filter(|kind| !self.get(*kind).is_empty())
            .collect()
    }

    /// Extractable sections that came back empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<SectionKind> {
        SectionKind::EXTRACTABLE
            .into_iter()
            .filter(|kind| self.get(*kind).is_empty())
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> SectionStats {
        let lengths: Vec<_> = self
            .iter()
            .map(|(kind, text)| (kind, text.chars().count()))
            .collect();
        SectionStats {
            total_chars: lengths.iter().map(|(_, len)| len).sum(),
            empty: lengths
                .iter()
                .filter(|(_, len)| *len == 0)
                .map(|(kind, _)| *kind)
                .collect(),
            lengths,
        }
    }
}

/// Character counts per section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub lengths: Vec<(SectionKind, usize)>,
    pub total_chars: usize,
    pub empty: Vec<SectionKind>,
}
