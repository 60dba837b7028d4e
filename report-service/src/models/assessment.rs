use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

/// Title used when the request does not carry one.
pub const DEFAULT_TITLE: &str = "Leadership Skills Report";

/// Proficiency band of a single skill or of the overall result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    /// Derives the band from a score in `0..=100`.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            ProficiencyLevel::Advanced
        } else if score >= 50.0 {
            ProficiencyLevel::Intermediate
        } else {
            ProficiencyLevel::Beginner
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "Beginner",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SkillScore {
    #[validate(length(min = 1, max = 80, message = "skill name must be 1-80 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, max = 100.0, message = "score must be between 0 and 100"))]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ProficiencyLevel>,
}

impl SkillScore {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
            level: None,
        }
    }

    /// The explicit level if one was supplied, otherwise the band of the score.
    pub fn level(&self) -> ProficiencyLevel {
        self.level
            .unwrap_or_else(|| ProficiencyLevel::from_score(self.score))
    }
}

/// Ordered list of scored skills for one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_skill_names"))]
pub struct SkillAssessment {
    // More than 24 axes stop being legible on the radar chart
    #[validate(
        length(min = 1, max = 24, message = "between 1 and 24 skills are required"),
        nested
    )]
    pub skills: Vec<SkillScore>,
}

impl SkillAssessment {
    pub fn new(skills: Vec<SkillScore>) -> Self {
        Self { skills }
    }

    /// Arithmetic mean of all scores, `0.0` for an empty assessment.
    pub fn mean_score(&self) -> f64 {
        if self.skills.is_empty() {
            return 0.0;
        }
        self.skills.iter().map(|s| s.score).sum::<f64>() / self.skills.len() as f64
    }
}

fn validate_skill_names(assessment: &SkillAssessment) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for skill in &assessment.skills {
        let key = skill.name.trim().to_lowercase();
        if key.is_empty() {
            let mut err = ValidationError::new("blank_skill_name");
            err.message = Some("skill names must not be blank".into());
            return Err(err);
        }
        if !seen.insert(key) {
            let mut err = ValidationError::new("duplicate_skill_name");
            err.message = Some(format!("duplicate skill name '{}'", skill.name.trim()).into());
            return Err(err);
        }
    }
    Ok(())
}

/// The person the report is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Recipient {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 120))]
    pub position: Option<String>,
    /// Assessment date; today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Shortest narrative section, counted after trimming.
const MIN_NARRATIVE_CHARS: usize = 10;

/// Free-text sections written for the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_narrative_text"))]
pub struct Narrative {
    #[validate(length(max = 4000))]
    pub summary: String,
    #[validate(length(max = 4000))]
    pub learning_path: String,
}

fn validate_narrative_text(narrative: &Narrative) -> Result<(), ValidationError> {
    for (field, text) in [
        ("summary", &narrative.summary),
        ("learning_path", &narrative.learning_path),
    ] {
        if text.trim().chars().count() < MIN_NARRATIVE_CHARS {
            let mut err = ValidationError::new("narrative_too_short");
            err.message = Some(
                format!("{} must have at least {} non-blank characters", field, MIN_NARRATIVE_CHARS)
                    .into(),
            );
            return Err(err);
        }
    }
    Ok(())
}

/// One report to produce: an assessment plus optional presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReportRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub assessment: SkillAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "title must be 1-120 characters"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub recipient: Option<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0, message = "overall score must be between 0 and 100"))]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_level: Option<ProficiencyLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub narrative: Option<Narrative>,
}

impl ReportRequest {
    pub fn new(assessment: SkillAssessment) -> Self {
        Self {
            assessment,
            title: None,
            recipient: None,
            overall_score: None,
            overall_level: None,
            narrative: None,
        }
    }

    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
            .unwrap_or_else(|| self.assessment.mean_score())
    }

    pub fn overall_level(&self) -> ProficiencyLevel {
        self.overall_level
            .unwrap_or_else(|| ProficiencyLevel::from_score(self.overall_score()))
    }

    pub fn report_date(&self, today: NaiveDate) -> NaiveDate {
        self.recipient
            .as_ref()
            .and_then(|r| r.date)
            .unwrap_or(today)
    }

    /// Download name, e.g. `report_Maria_Garcia_2025-06-15.pdf`.
    pub fn filename(&self, date: NaiveDate) -> String {
        let name = self
            .recipient
            .as_ref()
            .map(|r| {
                r.name
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("_")
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                    .collect::<String>()
            })
            .unwrap_or_default();

        if name.is_empty() {
            format!("report_{}.pdf", date.format("%Y-%m-%d"))
        } else {
            format!("report_{}_{}.pdf", name, date.format("%Y-%m-%d"))
        }
    }
}
