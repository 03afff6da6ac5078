use super::common::*;
use crate::scoring::{CriterionJudge, LegacyScoreCalculator};

#[tokio::test]
async fn combines_time_main_question_and_legacy_rubric() {
    let config = scoring_config();
    let client = RecordingClient::new("Technical Accuracy: 0.8\nClarity: 0.6");
    let judge = CriterionJudge::new(client.clone());

    let legacy = LegacyScoreCalculator::new(&config)
        .legacy_score(&submission(1), &judge)
        .await
        .expect("legacy score");

    assert_close(legacy.breakdown.written_answers_score, 0.72);
    assert_close(legacy.breakdown.time_score, 0.75);
    assert_close(legacy.breakdown.main_question_score, 0.75);
    assert_close(legacy.total_score, 0.75 * 0.2 + 0.75 * 0.3 + 0.72 * 0.5);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn legacy_prompt_asks_only_for_two_criteria() {
    let config = scoring_config();
    let client = RecordingClient::new(FULL_REPLY);
    let judge = CriterionJudge::new(client.clone());

    LegacyScoreCalculator::new(&config)
        .legacy_score(&submission(1), &judge)
        .await
        .expect("legacy score");

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Technical Accuracy: [score]"));
    assert!(!prompts[0].contains("Presentation: [score]"));
}

#[tokio::test]
async fn no_answers_means_zero_written_score_without_judge_calls() {
    let config = scoring_config();
    let client = RecordingClient::new(FULL_REPLY);
    let judge = CriterionJudge::new(client.clone());

    let legacy = LegacyScoreCalculator::new(&config)
        .legacy_score(&submission(0), &judge)
        .await
        .expect("legacy score");

    assert_eq!(legacy.breakdown.written_answers_score, 0.0);
    assert_close(legacy.total_score, 0.75 * 0.2 + 0.75 * 0.3);
    assert_eq!(client.calls(), 0);
}
