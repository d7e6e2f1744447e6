use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use pollboard::polls::{
    Choice, ChoiceId, PollRepository, PollService, PollServiceError, Question, QuestionDraft,
    QuestionId, QuestionRecord, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Clone)]
struct StoredQuestion {
    question: Question,
    choices: Vec<Choice>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPollRepository {
    questions: Arc<Mutex<HashMap<QuestionId, StoredQuestion>>>,
    question_seq: Arc<AtomicU64>,
    choice_seq: Arc<AtomicU64>,
}

impl PollRepository for InMemoryPollRepository {
    fn insert_question(&self, draft: QuestionDraft) -> Result<QuestionRecord, RepositoryError> {
        let mut guard = self.questions.lock().expect("repository mutex poisoned");
        let id = QuestionId(self.question_seq.fetch_add(1, Ordering::Relaxed) + 1);
        let question = Question {
            id,
            question_text: draft.question_text,
            pub_date: draft.pub_date,
        };
        let choices: Vec<Choice> = draft
            .choices
            .into_iter()
            .map(|choice_text| Choice {
                id: ChoiceId(self.choice_seq.fetch_add(1, Ordering::Relaxed) + 1),
                question_id: id,
                choice_text,
                votes: 0,
            })
            .collect();
        guard.insert(
            id,
            StoredQuestion {
                question: question.clone(),
                choices: choices.clone(),
            },
        );
        Ok(QuestionRecord { question, choices })
    }

    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        let guard = self.questions.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).map(|stored| stored.question.clone()))
    }

    fn questions(&self) -> Result<Vec<Question>, RepositoryError> {
        let guard = self.questions.lock().expect("repository mutex poisoned");
        Ok(guard.values().map(|stored| stored.question.clone()).collect())
    }

    fn choices_for(&self, id: QuestionId) -> Result<Vec<Choice>, RepositoryError> {
        let guard = self.questions.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(&id)
            .map(|stored| stored.choices.clone())
            .unwrap_or_default())
    }

    fn record_vote(
        &self,
        question: QuestionId,
        choice: ChoiceId,
    ) -> Result<Choice, RepositoryError> {
        let mut guard = self.questions.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(&question).ok_or(RepositoryError::NotFound)?;
        let entry = stored
            .choices
            .iter_mut()
            .find(|entry| entry.id == choice)
            .ok_or(RepositoryError::NotFound)?;
        entry.votes += 1;
        Ok(entry.clone())
    }

    fn delete_question(&self, id: QuestionId) -> Result<(), RepositoryError> {
        let mut guard = self.questions.lock().expect("repository mutex poisoned");
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Insert every draft through the service, returning the stored records in
/// arrival order.
pub(crate) fn seed_service<R>(
    service: &PollService<R>,
    drafts: Vec<QuestionDraft>,
) -> Result<Vec<QuestionRecord>, PollServiceError>
where
    R: PollRepository + 'static,
{
    drafts
        .into_iter()
        .map(|draft| service.create(draft))
        .collect()
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates for CLI flags;
/// bare dates read as midnight UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}
