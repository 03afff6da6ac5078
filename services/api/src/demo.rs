use crate::infra::{InMemoryScoreRepository, RecruitmentNotifier};
use assessment_scoring::error::AppError;
use assessment_scoring::scoring::judge::FixedCompletionClient;
use assessment_scoring::scoring::{
    AssessmentService, CriterionJudge, ScoreResponse, ScoringConfig, ScoringEngine,
    SubmissionPayload, WrittenAnswerPayload,
};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

const DEMO_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Participant name used for the sample submission
    #[arg(long, default_value = "Demo Candidate")]
    pub(crate) participant: String,
    /// Seconds the sample candidate took (out of 3600)
    #[arg(long, default_value_t = 1500)]
    pub(crate) time_elapsed: i64,
    /// Only compute the legacy total
    #[arg(long)]
    pub(crate) legacy_only: bool,
    /// Print the raw JSON response instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::new(Arc::new(ScoringConfig::standard()?), DEMO_TIMEOUT);
    let service = AssessmentService::new(
        Arc::new(engine),
        CriterionJudge::new(Arc::new(FixedCompletionClient::standard())),
        Arc::new(InMemoryScoreRepository::default()),
        Arc::new(RecruitmentNotifier::Disabled),
    )
    .with_skill_based_scoring(!args.legacy_only);

    let response = service
        .score(demo_payload(&args.participant, args.time_elapsed))
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        render_score(&response);
    }
    Ok(())
}

fn demo_payload(participant: &str, time_elapsed: i64) -> SubmissionPayload {
    let answers = [
        (
            "q1",
            "How would you make a rate limiter safe across several API instances?",
            "Keep the counters in Redis and use a sliding window with an atomic Lua script \
             so that every instance sees the same budget.",
        ),
        (
            "q2",
            "A nightly job started taking four hours instead of one. How do you investigate?",
            "Compare recent deploys and data volume, profile the slowest stage, then check \
             query plans for missing indexes before changing the job itself.",
        ),
        (
            "q3",
            "Explain eventual consistency to a product manager.",
            "Different copies of the data agree after a short delay, so a user may briefly \
             see an older value right after an update.",
        ),
    ];

    SubmissionPayload {
        time_elapsed: Some(time_elapsed),
        main_question_score: Some(0.8),
        written_answers: Some(
            answers
                .iter()
                .map(|(id, question, answer)| WrittenAnswerPayload {
                    question_id: Some(id.to_string()),
                    question: Some(question.to_string()),
                    answer: Some(answer.to_string()),
                })
                .collect(),
        ),
        participant_name: Some(participant.to_string()),
        instance_id: None,
        email: None,
        session_id: None,
    }
}

fn render_score(response: &ScoreResponse) {
    println!("Assessment scoring demo (canned judge)");
    println!(
        "- Assessment {} for {}",
        response.assessment_id, response.participant_name
    );
    println!("- Total score {:.3}", response.total_score);
    println!(
        "  time {:.3} | main question {:.3} | written answers {:.3}",
        response.breakdown.time_score,
        response.breakdown.main_question_score,
        response.breakdown.written_answers_score
    );

    let Some(skills) = &response.skill_scores else {
        println!("Skill-based scoring disabled");
        return;
    };

    println!("Skill scores:");
    for (skill, score) in skills {
        println!("  - {skill}: {score:.3}");
        let components = response
            .component_breakdown
            .as_ref()
            .and_then(|breakdown| breakdown.get(skill));
        if let Some(components) = components {
            for (component, value) in components {
                println!("      {component}: {value:.3}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_payload_is_a_valid_submission() {
        let (submission, metadata) = demo_payload("Demo Candidate", 1500)
            .into_submission()
            .expect("valid demo payload");

        assert_eq!(submission.written_answers().len(), 3);
        assert!(metadata.instance_id.is_none());
    }

    #[tokio::test]
    async fn demo_runs_end_to_end() {
        let args = DemoArgs {
            participant: "Demo Candidate".to_string(),
            time_elapsed: 1500,
            legacy_only: false,
            json: true,
        };

        run_demo(args).await.expect("demo completes");
    }
}
