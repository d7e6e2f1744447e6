use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::ListingConfig;

use super::domain::{ChoiceId, QuestionDraft, QuestionId};
use super::repository::{PollRepository, QuestionRecord, RepositoryError};
use super::visibility::{self, QuestionNotFound};

/// Facade composing the repository with the visibility rules into the
/// operations the HTTP layer and the CLI consume. Read operations take the
/// evaluation instant from the caller so a request can be replayed against
/// any point in time.
pub struct PollService<R> {
    repository: Arc<R>,
    listing: ListingConfig,
}

impl<R> PollService<R>
where
    R: PollRepository + 'static,
{
    pub fn new(repository: Arc<R>, listing: ListingConfig) -> Self {
        Self { repository, listing }
    }

    /// The displayable questions, most recently published first, truncated
    /// to `limit` when given and to the configured listing size otherwise.
    pub fn latest(
        &self,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Vec<QuestionRecord>, PollServiceError> {
        let records = self.load_records()?;
        let limit = limit.unwrap_or(self.listing.latest_limit);
        Ok(visibility::select_displayable(&records, now)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    /// Resolve a question for its detail surface. Ids that are missing and
    /// ids whose question is still scheduled report the same failure.
    pub fn question(
        &self,
        id: QuestionId,
        now: DateTime<Utc>,
    ) -> Result<QuestionRecord, PollServiceError> {
        let question = self
            .repository
            .question(id)?
            .filter(|question| visibility::is_published(question, now))
            .ok_or(QuestionNotFound)?;
        let choices = self.repository.choices_for(id)?;
        Ok(QuestionRecord { question, choices })
    }

    /// Resolve a question for its results surface. Unlike [`Self::question`],
    /// a published question without choices is not eligible here and reports
    /// the same not-found failure as a scheduled one.
    pub fn results(
        &self,
        id: QuestionId,
        now: DateTime<Utc>,
    ) -> Result<QuestionRecord, PollServiceError> {
        let record = self.question(id, now)?;
        if !visibility::is_displayable(&record, now) {
            return Err(QuestionNotFound.into());
        }
        Ok(record)
    }

    /// Record one vote for a choice of a resolvable question and return the
    /// refreshed record, updated tally included.
    pub fn vote(
        &self,
        id: QuestionId,
        choice: ChoiceId,
        now: DateTime<Utc>,
    ) -> Result<QuestionRecord, PollServiceError> {
        self.question(id, now)?;
        match self.repository.record_vote(id, choice) {
            Ok(_) => self.question(id, now),
            Err(RepositoryError::NotFound) => Err(PollServiceError::ChoiceNotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Store a new question with its choices. No publication gate applies to
    /// writes: future-dated drafts are legal and stay hidden until due.
    pub fn create(&self, draft: QuestionDraft) -> Result<QuestionRecord, PollServiceError> {
        Ok(self.repository.insert_question(draft)?)
    }

    /// Delete a question together with every choice it owns. The publication
    /// gate does not apply here; scheduled questions delete the same as
    /// published ones.
    pub fn delete(&self, id: QuestionId) -> Result<(), PollServiceError> {
        match self.repository.delete_question(id) {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(QuestionNotFound.into()),
            Err(other) => Err(other.into()),
        }
    }

    fn load_records(&self) -> Result<Vec<QuestionRecord>, PollServiceError> {
        self.repository
            .questions()?
            .into_iter()
            .map(|question| {
                let choices = self.repository.choices_for(question.id)?;
                Ok(QuestionRecord { question, choices })
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollServiceError {
    #[error(transparent)]
    QuestionNotFound(#[from] QuestionNotFound),
    #[error("choice not found")]
    ChoiceNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
