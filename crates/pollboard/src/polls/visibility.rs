//! Publication and display rules.
//!
//! Every rule takes the evaluation instant as an argument instead of reading
//! the clock, so the same stored data can answer "what was visible at T" for
//! any T and the tests can pin the instant exactly.

use chrono::{DateTime, Duration, Utc};

use super::domain::{PublicationStatus, Question, QuestionId};
use super::repository::QuestionRecord;

/// Failure raised when a question cannot be resolved for display. Questions
/// scheduled in the future report this exact error, indistinguishable from
/// an id that was never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("question not found")]
pub struct QuestionNotFound;

/// A question is published once `pub_date` has been reached, inclusive.
pub fn is_published(question: &Question, now: DateTime<Utc>) -> bool {
    question.pub_date <= now
}

/// True only inside the recency window `(now - 1 day, now]`: a question
/// published at exactly `now` is recent, one published exactly one day ago
/// is not, and a future `pub_date` is never recent.
pub fn was_published_recently(question: &Question, now: DateTime<Utc>) -> bool {
    let window_start = now - Duration::days(1);
    question.pub_date > window_start && question.pub_date <= now
}

/// Display eligibility for listings and results: published, and votable in
/// the sense of owning at least one choice.
pub fn is_displayable(record: &QuestionRecord, now: DateTime<Utc>) -> bool {
    is_published(&record.question, now) && !record.choices.is_empty()
}

/// Filter down to the displayable records and order them most recently
/// published first. Records sharing a `pub_date` fall back to id descending
/// so the ordering stays total.
pub fn select_displayable(
    records: &[QuestionRecord],
    now: DateTime<Utc>,
) -> Vec<&QuestionRecord> {
    let mut selected: Vec<&QuestionRecord> = records
        .iter()
        .filter(|record| is_displayable(record, now))
        .collect();
    selected.sort_by(|a, b| {
        b.question
            .pub_date
            .cmp(&a.question.pub_date)
            .then(b.question.id.cmp(&a.question.id))
    });
    selected
}

/// Resolve a question for its detail surface. Only the publication gate
/// applies here; a published question without choices still resolves, it
/// just never appears in listings or results.
pub fn get_or_not_found(
    records: &[QuestionRecord],
    id: QuestionId,
    now: DateTime<Utc>,
) -> Result<&QuestionRecord, QuestionNotFound> {
    records
        .iter()
        .find(|record| record.question.id == id)
        .filter(|record| is_published(&record.question, now))
        .ok_or(QuestionNotFound)
}

/// Classify a question for presentation. Agrees with the predicates above
/// for every input.
pub fn publication_status(question: &Question, now: DateTime<Utc>) -> PublicationStatus {
    if !is_published(question, now) {
        PublicationStatus::Scheduled
    } else if was_published_recently(question, now) {
        PublicationStatus::Recent
    } else {
        PublicationStatus::Published
    }
}
