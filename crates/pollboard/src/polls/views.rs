use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ChoiceId, PublicationStatus, QuestionId};
use super::repository::QuestionRecord;
use super::visibility;

/// Shown by the index surface when no question is displayable.
pub const NO_POLLS_MESSAGE: &str = "No polls are available.";

/// Listing entry for the index surface.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub status: PublicationStatus,
    pub status_label: &'static str,
    pub choice_count: usize,
}

/// Detail projection: the prompt and its choices, tallies withheld.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub status: PublicationStatus,
    pub status_label: &'static str,
    pub choices: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOption {
    pub id: ChoiceId,
    pub choice_text: String,
}

/// Results projection: per-choice tallies plus the total.
#[derive(Debug, Clone, Serialize)]
pub struct PollResults {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub total_votes: u64,
    pub results: Vec<ChoiceTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceTally {
    pub id: ChoiceId,
    pub choice_text: String,
    pub votes: u64,
}

/// Index payload. `message` is present exactly when the listing is empty.
#[derive(Debug, Clone, Serialize)]
pub struct LatestQuestions {
    pub as_of: DateTime<Utc>,
    pub latest_questions: Vec<QuestionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl LatestQuestions {
    pub fn new(as_of: DateTime<Utc>, latest_questions: Vec<QuestionSummary>) -> Self {
        let message = latest_questions.is_empty().then_some(NO_POLLS_MESSAGE);
        Self {
            as_of,
            latest_questions,
            message,
        }
    }
}

impl QuestionRecord {
    pub fn summary(&self, now: DateTime<Utc>) -> QuestionSummary {
        let status = visibility::publication_status(&self.question, now);
        QuestionSummary {
            id: self.question.id,
            question_text: self.question.question_text.clone(),
            pub_date: self.question.pub_date,
            status,
            status_label: status.label(),
            choice_count: self.choices.len(),
        }
    }

    pub fn detail(&self, now: DateTime<Utc>) -> QuestionDetail {
        let status = visibility::publication_status(&self.question, now);
        QuestionDetail {
            id: self.question.id,
            question_text: self.question.question_text.clone(),
            pub_date: self.question.pub_date,
            status,
            status_label: status.label(),
            choices: self
                .choices
                .iter()
                .map(|choice| ChoiceOption {
                    id: choice.id,
                    choice_text: choice.choice_text.clone(),
                })
                .collect(),
        }
    }

    pub fn results_view(&self) -> PollResults {
        PollResults {
            id: self.question.id,
            question_text: self.question.question_text.clone(),
            pub_date: self.question.pub_date,
            total_votes: self.total_votes(),
            results: self
                .choices
                .iter()
                .map(|choice| ChoiceTally {
                    id: choice.id,
                    choice_text: choice.choice_text.clone(),
                    votes: choice.votes,
                })
                .collect(),
        }
    }
}
