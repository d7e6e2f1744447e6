use serde::{Deserialize, Serialize};

use super::domain::{Choice, ChoiceId, Question, QuestionDraft, QuestionId};

/// Aggregate handed to the visibility rules and the views: a question
/// together with the choices it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionRecord {
    /// The choice with the given id, provided it belongs to this question.
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }

    pub fn total_votes(&self) -> u64 {
        self.choices.iter().map(|choice| choice.votes).sum()
    }
}

/// Storage abstraction so the rules and the service can be exercised against
/// any engine. Implementations assign ids from their own sequences and keep
/// id order equal to creation order.
pub trait PollRepository: Send + Sync {
    /// Store a draft, assigning a question id and one choice id per entry.
    fn insert_question(&self, draft: QuestionDraft) -> Result<QuestionRecord, RepositoryError>;

    /// Point lookup with no publication gate applied.
    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError>;

    /// Every stored question, published or not, in no guaranteed order.
    fn questions(&self) -> Result<Vec<Question>, RepositoryError>;

    /// Choices owned by a question. Empty both for a choiceless question and
    /// for an id that was never stored.
    fn choices_for(&self, id: QuestionId) -> Result<Vec<Choice>, RepositoryError>;

    /// Increment a tally by one and return the updated choice. Fails with
    /// [`RepositoryError::NotFound`] when the choice does not exist or does
    /// not belong to the question.
    fn record_vote(
        &self,
        question: QuestionId,
        choice: ChoiceId,
    ) -> Result<Choice, RepositoryError>;

    /// Remove a question and every choice it owns.
    fn delete_question(&self, id: QuestionId) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
