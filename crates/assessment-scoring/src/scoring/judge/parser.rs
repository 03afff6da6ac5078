use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::scoring::domain::{Criterion, CriterionJudgment};

fn embedded_number() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("Invalid score regex pattern"))
}

/// Parse a judge reply of `Criterion: score` lines.
///
/// Keys match case-insensitively against criterion labels (underscores and
/// markdown emphasis tolerated). A value that is not a bare number falls
/// back to the first number embedded in it; lines without one are skipped.
/// Values above 1 are read as a 0–10 scale and divided by 10, anything
/// still outside `[0, 1]` is dropped. A repeated criterion keeps its last
/// valid value, and every criterion in `expected` that never parsed is
/// reported as `0.0`.
pub fn parse_judgment(reply: &str, expected: &[Criterion]) -> CriterionJudgment {
    let mut scores = Vec::new();

    for line in reply.lines() {
        let Some((raw_key, raw_value)) = line.split_once(':') else {
            continue;
        };
        let Some(criterion) = Criterion::from_label(strip_key_decoration(raw_key)) else {
            continue;
        };
        if !expected.contains(&criterion) {
            continue;
        }
        let Some(value) = parse_score(raw_value) else {
            continue;
        };

        if (0.0..=1.0).contains(&value) {
            scores.push((criterion, value));
        } else {
            warn!(%criterion, value, "discarding judge score outside [0, 1]");
        }
    }

    CriterionJudgment::from_scores(expected, scores)
}

fn strip_key_decoration(raw: &str) -> &str {
    let trimmed = raw
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#' | '`' | '-' | '_'));
    let without_enumerator = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(index)
            if index > 0 && trimmed[index..].starts_with(|c: char| c == '.' || c == ')') =>
        {
            &trimmed[index + 1..]
        }
        _ => trimmed,
    };
    without_enumerator.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '`'))
}

fn parse_score(raw: &str) -> Option<f64> {
    let value = raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '`'));
    let score = match value.parse::<f64>() {
        Ok(score) => score,
        Err(_) => embedded_number().find(value)?.as_str().parse::<f64>().ok()?,
    };

    if score > 1.0 {
        Some(score / 10.0)
    } else {
        Some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: [Criterion; 2] = [Criterion::TechnicalAccuracy, Criterion::Clarity];

    #[test]
    fn parses_well_formed_reply() {
        let reply = "Technical Accuracy: 0.8\n\
                     Problem Solving Methodology: 0.6\n\
                     Logical Thinking: 0.7\n\
                     Clarity: 0.5\n\
                     Presentation: 0.4";

        let judgment = parse_judgment(reply, &Criterion::ALL);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.8);
        assert_eq!(judgment.score(Criterion::ProblemSolvingMethodology), 0.6);
        assert_eq!(judgment.score(Criterion::LogicalThinking), 0.7);
        assert_eq!(judgment.score(Criterion::Clarity), 0.5);
        assert_eq!(judgment.score(Criterion::Presentation), 0.4);
    }

    #[test]
    fn matches_keys_case_insensitively_and_trims() {
        let reply = "  TECHNICAL ACCURACY :   0.9  \n  clarity:0.3";

        let judgment = parse_judgment(reply, &LEGACY);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.9);
        assert_eq!(judgment.score(Criterion::Clarity), 0.3);
    }

    #[test]
    fn skips_unparsable_lines_and_defaults_missing_to_zero() {
        let reply = "Here is my evaluation.\n\
                     Technical Accuracy: excellent\n\
                     Clarity: 0.6\n\
                     Overall: 0.9";

        let judgment = parse_judgment(reply, &Criterion::ALL);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.0);
        assert_eq!(judgment.score(Criterion::Clarity), 0.6);
        assert_eq!(judgment.score(Criterion::Presentation), 0.0);
        assert_eq!(judgment.iter().count(), 5);
    }

    #[test]
    fn repairs_ten_point_scale_values() {
        let reply = "Technical Accuracy: 8\nClarity: 7/10";

        let judgment = parse_judgment(reply, &LEGACY);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.8);
        assert_eq!(judgment.score(Criterion::Clarity), 0.7);
    }

    #[test]
    fn discards_values_outside_range_after_repair() {
        let reply = "Technical Accuracy: 15\nClarity: -0.2";

        let judgment = parse_judgment(reply, &LEGACY);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.0);
        assert_eq!(judgment.score(Criterion::Clarity), 0.0);
    }

    #[test]
    fn keeps_sign_of_numbers_embedded_in_prose() {
        let reply = "Technical Accuracy: -0.4 (poor)\nClarity: about -3 overall";

        let judgment = parse_judgment(reply, &LEGACY);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.0);
        assert_eq!(judgment.score(Criterion::Clarity), 0.0);
    }

    #[test]
    fn tolerates_markdown_and_enumeration() {
        let reply = "1. **Technical Accuracy**: **0.75**\n\
                     - Clarity: 0.65 (clear but terse)\n\
                     5) Presentation: `0.5`";

        let judgment = parse_judgment(reply, &Criterion::ALL);

        assert_eq!(judgment.score(Criterion::TechnicalAccuracy), 0.75);
        assert_eq!(judgment.score(Criterion::Clarity), 0.65);
        assert_eq!(judgment.score(Criterion::Presentation), 0.5);
    }

    #[test]
    fn last_valid_value_wins_for_repeated_criterion() {
        let reply = "Clarity: 0.2\nClarity: 0.9\nClarity: 42";

        let judgment = parse_judgment(reply, &LEGACY);

        assert_eq!(judgment.score(Criterion::Clarity), 0.9);
    }

    #[test]
    fn ignores_criteria_outside_the_expected_rubric() {
        let reply = "Technical Accuracy: 0.8\nPresentation: 0.9\nClarity: 0.6";

        let judgment = parse_judgment(reply, &LEGACY);

        assert_eq!(judgment.iter().count(), 2);
        assert_eq!(judgment.score(Criterion::Presentation), 0.0);
    }
}
