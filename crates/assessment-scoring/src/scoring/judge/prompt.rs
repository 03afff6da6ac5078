use super::Rubric;
use crate::scoring::domain::Criterion;

pub(crate) const SYSTEM_PROMPT: &str = "You are an expert evaluator for technical assessments. \
Provide precise numerical scores from 0 to 1 for each criterion.";

pub(crate) fn build_prompt(rubric: Rubric, answer_text: &str, question_context: &str) -> String {
    let (intro, calibration) = match rubric {
        Rubric::Full => (
            "Evaluate the following answer based on multiple criteria for a comprehensive assessment.",
            "- Only give a score above 0.8 for answers that are truly excellent in that specific criterion\n\
             - Give a score below 0.5 for answers that are poor, incomplete, vague, or have significant errors in that criterion\n\
             - Most average answers should score between 0.5 and 0.7 for each criterion\n\
             - Use the full range from 0 to 1 as appropriate for each criterion\n\
             - Evaluate each criterion independently",
        ),
        Rubric::Legacy => (
            "Evaluate the following answer based on technical accuracy and clarity.",
            "- Only give a score above 0.8 for answers that are truly excellent, comprehensive, and correct.\n\
             - Give a score below 0.5 for answers that are incomplete, vague, or have any significant errors.\n\
             - Most average answers should score between 0.5 and 0.7.\n\
             - Do not be generous with high scores, but if the answer is truly outstanding, it is okay to give a high score.\n\
             - Use the full range from 0 to 1 as appropriate.",
        ),
    };

    let guidance = rubric
        .criteria()
        .iter()
        .enumerate()
        .map(|(index, criterion)| {
            format!(
                "{}. {}: {}",
                index + 1,
                criterion.label(),
                guidance(*criterion, rubric)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let format = rubric
        .criteria()
        .iter()
        .map(|criterion| format!("{}: [score]", criterion.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\n\
         Question Context: {question_context}\n\n\
         Answer: {answer_text}\n\n\
         Please provide scores from 0 to 1 for each of the following criteria:\n\
         {guidance}\n\n\
         Be strict and fair in your evaluation:\n\
         {calibration}\n\n\
         Format your response exactly as:\n\
         {format}\n"
    )
}

fn guidance(criterion: Criterion, rubric: Rubric) -> &'static str {
    match (criterion, rubric) {
        (Criterion::TechnicalAccuracy, Rubric::Legacy) => "How technically correct is the answer?",
        (Criterion::Clarity, Rubric::Legacy) => "How clear and well-explained is the answer?",
        (Criterion::TechnicalAccuracy, _) => {
            "How technically correct and accurate is the answer? Does it demonstrate proper knowledge and understanding?"
        }
        (Criterion::ProblemSolvingMethodology, _) => {
            "How well does the candidate approach and solve the problem? Do they use logical steps, consider alternatives, and show systematic thinking?"
        }
        (Criterion::LogicalThinking, _) => {
            "How clear and logical is the reasoning? Is the argument well-structured and does it follow a coherent thought process?"
        }
        (Criterion::Clarity, _) => {
            "How clear and understandable is the explanation? Can someone easily follow their reasoning and conclusions?"
        }
        (Criterion::Presentation, _) => {
            "How well is the answer organized and presented? Is it well-structured, professional, and easy to read?"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_prompt_lists_every_criterion_and_calibration() {
        let prompt = build_prompt(Rubric::Full, "Use a hash map.", "How do you dedupe?");

        for criterion in Criterion::ALL {
            assert!(prompt.contains(&format!("{}: [score]", criterion.label())));
        }
        assert!(prompt.contains("Question Context: How do you dedupe?"));
        assert!(prompt.contains("Answer: Use a hash map."));
        assert!(prompt.contains("above 0.8"));
        assert!(prompt.contains("below 0.5"));
        assert!(prompt.contains("between 0.5 and 0.7"));
    }

    #[test]
    fn legacy_prompt_only_requests_two_criteria() {
        let prompt = build_prompt(Rubric::Legacy, "answer", "question");

        assert!(prompt.contains("Technical Accuracy: [score]"));
        assert!(prompt.contains("Clarity: [score]"));
        assert!(!prompt.contains("Presentation"));
        assert!(prompt.contains("Do not be generous"));
    }
}
