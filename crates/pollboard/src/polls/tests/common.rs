use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::ListingConfig;
use crate::polls::domain::{Choice, ChoiceId, Question, QuestionDraft, QuestionId};
use crate::polls::repository::{PollRepository, QuestionRecord, RepositoryError};
use crate::polls::service::PollService;

/// Fixed evaluation instant every scenario pins itself to.
pub(super) fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 12, 0, 0)
        .single()
        .expect("valid anchor instant")
}

pub(super) fn question(id: u64, text: &str, pub_date: DateTime<Utc>) -> Question {
    Question {
        id: QuestionId(id),
        question_text: text.to_string(),
        pub_date,
    }
}

pub(super) fn choice(id: u64, question_id: u64, text: &str, votes: u64) -> Choice {
    Choice {
        id: ChoiceId(id),
        question_id: QuestionId(question_id),
        choice_text: text.to_string(),
        votes,
    }
}

pub(super) fn record(question: Question, choices: Vec<Choice>) -> QuestionRecord {
    QuestionRecord { question, choices }
}

/// A record published `days_ago` days before the anchor, carrying one choice.
pub(super) fn published_record(id: u64, text: &str, days_ago: i64) -> QuestionRecord {
    let pub_date = anchor() - Duration::days(days_ago);
    record(
        question(id, text, pub_date),
        vec![choice(id * 10, id, "Sample choice", 0)],
    )
}

pub(super) fn draft(text: &str, pub_date: DateTime<Utc>, choices: &[&str]) -> QuestionDraft {
    QuestionDraft::new(text, pub_date).with_choices(choices.iter().copied())
}

pub(super) fn build_service() -> (PollService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = PollService::new(repository.clone(), ListingConfig::default());
    (service, repository)
}

struct StoredQuestion {
    question: Question,
    choices: Vec<Choice>,
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    questions: Mutex<BTreeMap<QuestionId, StoredQuestion>>,
    question_seq: AtomicU64,
    choice_seq: AtomicU64,
}

impl PollRepository for MemoryRepository {
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
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl PollRepository for UnavailableRepository {
    fn insert_question(&self, _draft: QuestionDraft) -> Result<QuestionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn question(&self, _id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn questions(&self) -> Result<Vec<Question>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn choices_for(&self, _id: QuestionId) -> Result<Vec<Choice>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_vote(
        &self,
        _question: QuestionId,
        _choice: ChoiceId,
    ) -> Result<Choice, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_question(&self, _id: QuestionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
