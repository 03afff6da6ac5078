use serde::{Deserialize, Serialize};

use super::domain::{Submission, ValidationError, WrittenAnswer};

/// Request body as received over the wire. Every field is optional here so
/// that a missing one is reported by name instead of as a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(default)]
    pub time_elapsed: Option<i64>,
    #[serde(default)]
    pub main_question_score: Option<f64>,
    #[serde(default)]
    pub written_answers: Option<Vec<WrittenAnswerPayload>>,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenAnswerPayload {
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Optional routing fields echoed into the stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionMetadata {
    pub instance_id: Option<String>,
    pub email: Option<String>,
    pub session_id: Option<String>,
}

impl SubmissionPayload {
    /// Validate the payload into an immutable [`Submission`].
    pub fn into_submission(self) -> Result<(Submission, SubmissionMetadata), ValidationError> {
        let time_elapsed = self
            .time_elapsed
            .ok_or(ValidationError::MissingField("time_elapsed"))?;
        let main_question_score = self
            .main_question_score
            .ok_or(ValidationError::MissingField("main_question_score"))?;
        let written_answers = self
            .written_answers
            .ok_or(ValidationError::MissingField("written_answers"))?;
        let participant_name = self
            .participant_name
            .ok_or(ValidationError::MissingField("participant_name"))?;

        let time_elapsed = u64::try_from(time_elapsed)
            .map_err(|_| ValidationError::NegativeTimeElapsed(time_elapsed))?;

        let written_answers = written_answers
            .into_iter()
            .enumerate()
            .map(|(index, answer)| answer.into_written_answer(index))
            .collect::<Result<Vec<_>, _>>()?;

        let submission = Submission::new(
            time_elapsed,
            main_question_score,
            written_answers,
            &participant_name,
        )?;

        let metadata = SubmissionMetadata {
            instance_id: non_blank(self.instance_id),
            email: non_blank(self.email),
            session_id: non_blank(self.session_id),
        };

        Ok((submission, metadata))
    }
}

impl WrittenAnswerPayload {
    fn into_written_answer(self, index: usize) -> Result<WrittenAnswer, ValidationError> {
        let missing = |field| ValidationError::MissingAnswerField { index, field };
        Ok(WrittenAnswer {
            question_id: self.question_id.ok_or_else(|| missing("question_id"))?,
            question: self.question.ok_or_else(|| missing("question"))?,
            answer: self.answer.ok_or_else(|| missing("answer"))?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
