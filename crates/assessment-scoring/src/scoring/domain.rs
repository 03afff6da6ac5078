use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PARTICIPANT_NAME_MIN_CHARS: usize = 2;
const PARTICIPANT_NAME_MAX_CHARS: usize = 100;

/// Identifier minted once per scoring request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One free-text answer plus the question it responds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenAnswer {
    pub question_id: String,
    pub question: String,
    pub answer: String,
}

/// A validated, immutable assessment submission.
///
/// The only way to obtain one is [`Submission::new`], so every instance the
/// engine sees already satisfies the range and name rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    time_elapsed: u64,
    main_question_score: f64,
    written_answers: Vec<WrittenAnswer>,
    participant_name: String,
}

impl Submission {
    pub fn new(
        time_elapsed: u64,
        main_question_score: f64,
        written_answers: Vec<WrittenAnswer>,
        participant_name: &str,
    ) -> Result<Self, ValidationError> {
        if !main_question_score.is_finite() || !(0.0..=1.0).contains(&main_question_score) {
            return Err(ValidationError::MainQuestionScoreOutOfRange(
                main_question_score,
            ));
        }

        let participant_name = validate_participant_name(participant_name)?;

        Ok(Self {
            time_elapsed,
            main_question_score,
            written_answers,
            participant_name,
        })
    }

    pub fn time_elapsed(&self) -> u64 {
        self.time_elapsed
    }

    pub fn main_question_score(&self) -> f64 {
        self.main_question_score
    }

    pub fn written_answers(&self) -> &[WrittenAnswer] {
        &self.written_answers
    }

    pub fn participant_name(&self) -> &str {
        &self.participant_name
    }
}

fn validate_participant_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankParticipantName);
    }

    let length = trimmed.chars().count();
    if length < PARTICIPANT_NAME_MIN_CHARS {
        return Err(ValidationError::ParticipantNameTooShort {
            min: PARTICIPANT_NAME_MIN_CHARS,
        });
    }
    if length > PARTICIPANT_NAME_MAX_CHARS {
        return Err(ValidationError::ParticipantNameTooLong {
            max: PARTICIPANT_NAME_MAX_CHARS,
        });
    }

    Ok(trimmed.to_string())
}

/// Rejections raised before any judge call is made.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("written_answers[{index}] is missing required field: {field}")]
    MissingAnswerField { index: usize, field: &'static str },
    #[error("time_elapsed must be a non-negative integer number of seconds, got {0}")]
    NegativeTimeElapsed(i64),
    #[error("main_question_score must be a number between 0 and 1, got {0}")]
    MainQuestionScoreOutOfRange(f64),
    #[error("participant_name cannot be empty or only whitespace")]
    BlankParticipantName,
    #[error("participant_name must be at least {min} characters long")]
    ParticipantNameTooShort { min: usize },
    #[error("participant_name cannot exceed {max} characters")]
    ParticipantNameTooLong { max: usize },
}

/// Rubric dimensions the judge scores per written answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    TechnicalAccuracy,
    ProblemSolvingMethodology,
    LogicalThinking,
    Clarity,
    Presentation,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::TechnicalAccuracy,
        Criterion::ProblemSolvingMethodology,
        Criterion::LogicalThinking,
        Criterion::Clarity,
        Criterion::Presentation,
    ];

    /// Configuration key, e.g. `problem_solving_methodology`.
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::TechnicalAccuracy => "technical_accuracy",
            Criterion::ProblemSolvingMethodology => "problem_solving_methodology",
            Criterion::LogicalThinking => "logical_thinking",
            Criterion::Clarity => "clarity",
            Criterion::Presentation => "presentation",
        }
    }

    /// Human label the judge is asked to echo, e.g. `Problem Solving Methodology`.
    pub fn label(&self) -> &'static str {
        match self {
            Criterion::TechnicalAccuracy => "Technical Accuracy",
            Criterion::ProblemSolvingMethodology => "Problem Solving Methodology",
            Criterion::LogicalThinking => "Logical Thinking",
            Criterion::Clarity => "Clarity",
            Criterion::Presentation => "Presentation",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|criterion| criterion.key() == key)
    }

    /// Case-insensitive match on either the label or the key spelling.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|criterion| criterion.label().to_ascii_lowercase() == normalized)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Criterion scores for a single written answer.
///
/// Every criterion of the rubric that produced the judgment is present;
/// criteria the judge omitted are recorded as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionJudgment(BTreeMap<Criterion, f64>);

impl CriterionJudgment {
    pub fn from_scores(
        expected: &[Criterion],
        scores: impl IntoIterator<Item = (Criterion, f64)>,
    ) -> Self {
        let mut values: BTreeMap<Criterion, f64> =
            expected.iter().map(|criterion| (*criterion, 0.0)).collect();
        values.extend(scores);
        Self(values)
    }

    pub fn score(&self, criterion: Criterion) -> f64 {
        self.0.get(&criterion).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        self.0.iter().map(|(criterion, score)| (*criterion, *score))
    }
}

/// Inputs a skill can draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    MainQuestionScore,
    TimePerformance,
    WrittenAnswers,
}

impl ComponentKind {
    pub fn key(&self) -> &'static str {
        match self {
            ComponentKind::MainQuestionScore => "main_question_score",
            ComponentKind::TimePerformance => "time_performance",
            ComponentKind::WrittenAnswers => "written_answers",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "main_question_score" => Some(Self::MainQuestionScore),
            "time_performance" => Some(Self::TimePerformance),
            "written_answers" => Some(Self::WrittenAnswers),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw component scores in definition order.
pub type ComponentBreakdown = IndexMap<ComponentKind, f64>;

/// Score for one skill plus the unweighted component scores behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub score: f64,
    pub components: ComponentBreakdown,
}

/// Two-criterion breakdown kept for clients that predate skill scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyBreakdown {
    pub time_score: f64,
    pub main_question_score: f64,
    pub written_answers_score: f64,
}

/// Final output of a scoring request.
///
/// `total_score` comes from the legacy weighting and is not derived from
/// `skill_scores`; the two are reported side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentScore {
    pub assessment_id: AssessmentId,
    pub total_score: f64,
    pub breakdown: LegacyBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_scores: Option<IndexMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_breakdown: Option<IndexMap<String, ComponentBreakdown>>,
}

impl AssessmentScore {
    pub fn skill_score(&self, skill: &str) -> Option<f64> {
        self.skill_scores.as_ref()?.get(skill).copied()
    }

    pub fn component_breakdown_for(&self, skill: &str) -> Option<&ComponentBreakdown> {
        self.component_breakdown.as_ref()?.get(skill)
    }
}
