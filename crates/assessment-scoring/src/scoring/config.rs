use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::domain::{ComponentKind, Criterion};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Fatal problems with the static scoring configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read scoring configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scoring configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("max_allowed_time must be greater than zero")]
    InvalidMaxAllowedTime,
    #[error("scoring configuration defines no skills")]
    NoSkills,
    #[error("Missing required key '{key}' in skill '{skill}'")]
    MissingKey { skill: String, key: &'static str },
    #[error("Components and weights must have same length for skill '{skill}' ({components} components, {weights} weights)")]
    LengthMismatch {
        skill: String,
        components: usize,
        weights: usize,
    },
    #[error("Weights for {scope} must sum to 1.0, got {sum}")]
    WeightSum { scope: String, sum: f64 },
    #[error("weight for {scope} must be a finite non-negative number, got {weight}")]
    InvalidWeight { scope: String, weight: f64 },
    #[error("Unknown component '{component}' in skill '{skill}'")]
    UnknownComponent { skill: String, component: String },
    #[error("Unknown written answer criterion '{criterion}' in {scope}")]
    UnknownCriterion { scope: String, criterion: String },
    #[error("skill '{skill}' scores written answers but its criteria carry no weight")]
    EmptyCriteria { skill: String },
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),
}

/// Weights of the three legacy breakdown entries in `total_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyComponentWeights {
    pub time: f64,
    pub main_question: f64,
    pub written_answers: f64,
}

/// Two-criterion rubric used by the legacy written-answer score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyCriteriaWeights {
    pub technical_accuracy: f64,
    pub clarity: f64,
}

/// Skill entry as written in the configuration file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSkillDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written_answer_criteria: Option<Vec<String>>,
}

/// Unvalidated configuration document. Turn it into a [`ScoringConfig`]
/// with [`RawScoringConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScoringConfig {
    pub max_allowed_time: u64,
    pub legacy_component_weights: LegacyComponentWeights,
    pub legacy_criteria_weights: LegacyCriteriaWeights,
    pub criterion_weights: IndexMap<String, f64>,
    pub skills: IndexMap<String, RawSkillDefinition>,
}

impl RawScoringConfig {
    /// The production rubric: three skills over five judged criteria.
    pub fn standard() -> Self {
        let criterion_weights = [
            ("technical_accuracy", 0.25),
            ("problem_solving_methodology", 0.25),
            ("logical_thinking", 0.25),
            ("clarity", 0.15),
            ("presentation", 0.10),
        ]
        .into_iter()
        .map(|(key, weight)| (key.to_string(), weight))
        .collect();

        let mut skills = IndexMap::new();
        skills.insert(
            "technical_expertise".to_string(),
            raw_skill(
                &["main_question_score", "time_performance", "written_answers"],
                &[0.4, 0.2, 0.4],
                &["technical_accuracy"],
            ),
        );
        skills.insert(
            "problem_solving".to_string(),
            raw_skill(
                &["written_answers"],
                &[1.0],
                &["problem_solving_methodology", "logical_thinking"],
            ),
        );
        skills.insert(
            "communication".to_string(),
            raw_skill(&["written_answers"], &[1.0], &["clarity", "presentation"]),
        );

        Self {
            max_allowed_time: 3600,
            legacy_component_weights: LegacyComponentWeights {
                time: 0.2,
                main_question: 0.3,
                written_answers: 0.5,
            },
            legacy_criteria_weights: LegacyCriteriaWeights {
                technical_accuracy: 0.6,
                clarity: 0.4,
            },
            criterion_weights,
            skills,
        }
    }

    pub fn validate(&self) -> Result<ScoringConfig, ConfigurationError> {
        if self.max_allowed_time == 0 {
            return Err(ConfigurationError::InvalidMaxAllowedTime);
        }

        let legacy = self.legacy_component_weights;
        check_weight_sum(
            "legacy_component_weights",
            &[legacy.time, legacy.main_question, legacy.written_answers],
        )?;
        let legacy_criteria = self.legacy_criteria_weights;
        check_weight_sum(
            "legacy_criteria_weights",
            &[legacy_criteria.technical_accuracy, legacy_criteria.clarity],
        )?;

        let mut criterion_weights = BTreeMap::new();
        for (key, weight) in &self.criterion_weights {
            let criterion =
                Criterion::from_key(key).ok_or_else(|| ConfigurationError::UnknownCriterion {
                    scope: "criterion_weights".to_string(),
                    criterion: key.clone(),
                })?;
            check_weight(&format!("criterion '{key}'"), *weight)?;
            criterion_weights.insert(criterion, *weight);
        }

        if self.skills.is_empty() {
            return Err(ConfigurationError::NoSkills);
        }

        let mut skills = IndexMap::new();
        for (name, raw) in &self.skills {
            let definition = validate_skill(name, raw, &criterion_weights)?;
            skills.insert(name.clone(), definition);
        }

        Ok(ScoringConfig {
            max_allowed_time: self.max_allowed_time,
            legacy_component_weights: legacy,
            legacy_criteria_weights: legacy_criteria,
            criterion_weights,
            skills,
        })
    }
}

fn raw_skill(components: &[&str], weights: &[f64], criteria: &[&str]) -> RawSkillDefinition {
    RawSkillDefinition {
        components: Some(components.iter().map(|c| c.to_string()).collect()),
        weights: Some(weights.to_vec()),
        written_answer_criteria: Some(criteria.iter().map(|c| c.to_string()).collect()),
    }
}

fn validate_skill(
    name: &str,
    raw: &RawSkillDefinition,
    criterion_weights: &BTreeMap<Criterion, f64>,
) -> Result<SkillDefinition, ConfigurationError> {
    let missing = |key| ConfigurationError::MissingKey {
        skill: name.to_string(),
        key,
    };
    let components = raw.components.as_ref().ok_or_else(|| missing("components"))?;
    let weights = raw.weights.as_ref().ok_or_else(|| missing("weights"))?;
    let criteria = raw
        .written_answer_criteria
        .as_ref()
        .ok_or_else(|| missing("written_answer_criteria"))?;

    for weight in weights {
        check_weight(&format!("skill '{name}'"), *weight)?;
    }
    check_weight_sum(&format!("skill '{name}'"), weights)?;

    if components.len() != weights.len() {
        return Err(ConfigurationError::LengthMismatch {
            skill: name.to_string(),
            components: components.len(),
            weights: weights.len(),
        });
    }

    let components = components
        .iter()
        .map(|component| {
            ComponentKind::from_key(component).ok_or_else(|| {
                ConfigurationError::UnknownComponent {
                    skill: name.to_string(),
                    component: component.clone(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut written_answer_criteria = Vec::with_capacity(criteria.len());
    for key in criteria {
        let criterion = Criterion::from_key(key)
            .filter(|criterion| criterion_weights.contains_key(criterion))
            .ok_or_else(|| ConfigurationError::UnknownCriterion {
                scope: format!("skill '{name}'"),
                criterion: key.clone(),
            })?;
        if !written_answer_criteria.contains(&criterion) {
            written_answer_criteria.push(criterion);
        }
    }

    if components.contains(&ComponentKind::WrittenAnswers) {
        let criteria_weight: f64 = written_answer_criteria
            .iter()
            .map(|criterion| criterion_weights[criterion])
            .sum();
        if criteria_weight <= 0.0 {
            return Err(ConfigurationError::EmptyCriteria {
                skill: name.to_string(),
            });
        }
    }

    Ok(SkillDefinition {
        name: name.to_string(),
        components: components.into_iter().zip(weights.iter().copied()).collect(),
        written_answer_criteria,
    })
}

fn check_weight(scope: &str, weight: f64) -> Result<(), ConfigurationError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidWeight {
            scope: scope.to_string(),
            weight,
        })
    }
}

fn check_weight_sum(scope: &str, weights: &[f64]) -> Result<(), ConfigurationError> {
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigurationError::WeightSum {
            scope: scope.to_string(),
            sum,
        });
    }
    Ok(())
}

/// A validated skill: weighted components plus the criteria its
/// written-answer component reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillDefinition {
    pub name: String,
    pub components: Vec<(ComponentKind, f64)>,
    pub written_answer_criteria: Vec<Criterion>,
}

/// Validated, read-only scoring configuration shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringConfig {
    max_allowed_time: u64,
    legacy_component_weights: LegacyComponentWeights,
    legacy_criteria_weights: LegacyCriteriaWeights,
    criterion_weights: BTreeMap<Criterion, f64>,
    skills: IndexMap<String, SkillDefinition>,
}

impl ScoringConfig {
    pub fn standard() -> Result<Self, ConfigurationError> {
        RawScoringConfig::standard().validate()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let raw: RawScoringConfig = serde_json::from_str(raw)?;
        raw.validate()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load the file when one is configured, otherwise the standard rubric.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::standard(),
        }
    }

    pub fn max_allowed_time(&self) -> u64 {
        self.max_allowed_time
    }

    pub fn legacy_component_weights(&self) -> LegacyComponentWeights {
        self.legacy_component_weights
    }

    pub fn legacy_criteria_weights(&self) -> LegacyCriteriaWeights {
        self.legacy_criteria_weights
    }

    /// Global weight of a criterion; criteria absent from the table weigh nothing.
    pub fn criterion_weight(&self, criterion: Criterion) -> f64 {
        self.criterion_weights
            .get(&criterion)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn skill(&self, name: &str) -> Result<&SkillDefinition, ConfigurationError> {
        self.skills
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownSkill(name.to_string()))
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.keys().map(String::as_str).collect()
    }
}
