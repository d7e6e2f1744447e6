mod common {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::response::Response;
    use axum::Router;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;

    use pollboard::config::ListingConfig;
    use pollboard::polls::{
        poll_router, Choice, ChoiceId, PollRepository, PollService, Question, QuestionDraft,
        QuestionId, QuestionRecord, RepositoryError,
    };

    pub(super) fn evaluation_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 24, 12, 0, 0)
            .single()
            .expect("valid evaluation instant")
    }

    pub(super) const AS_OF: &str = "2025-09-24T12:00:00Z";

    pub(super) fn build_router() -> (Router, Arc<PollService<MemoryRepository>>) {
        let repository = Arc::new(MemoryRepository::default());
        let service = Arc::new(PollService::new(repository, ListingConfig::default()));
        (poll_router(service.clone()), service)
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
        fn insert_question(
            &self,
            draft: QuestionDraft,
        ) -> Result<QuestionRecord, RepositoryError> {
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

    pub(super) async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 8192)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

mod scenarios {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use pollboard::polls::{QuestionDraft, NO_POLLS_MESSAGE};

    use super::common::*;

    fn json_post(uri: String, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).expect("serializable")))
            .expect("request builds")
    }

    fn get(uri: String) -> Request<Body> {
        Request::get(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn poll_lifecycle_runs_end_to_end() {
        let (router, service) = build_router();
        let now = evaluation_instant();

        service
            .create(
                QuestionDraft::new("What's new?", now - Duration::hours(2))
                    .with_choices(["Not much", "The sky"]),
            )
            .expect("create succeeds");
        service
            .create(
                QuestionDraft::new("Next week's poll", now + Duration::days(7))
                    .with_choices(["Too early"]),
            )
            .expect("create succeeds");

        let response = router
            .clone()
            .oneshot(get(format!("/api/v1/polls?as_of={AS_OF}")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let listing = read_json_body(response).await;
        let entries = listing
            .get("latest_questions")
            .and_then(Value::as_array)
            .expect("listing present");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("question_text"), Some(&json!("What's new?")));
        assert!(listing.get("message").is_none());

        let question_id = entries[0]
            .get("id")
            .and_then(Value::as_u64)
            .expect("id present");

        let detail_response = router
            .clone()
            .oneshot(get(format!("/api/v1/polls/{question_id}?as_of={AS_OF}")))
            .await
            .expect("route executes");
        assert_eq!(detail_response.status(), StatusCode::OK);
        let detail = read_json_body(detail_response).await;
        let choices = detail
            .get("choices")
            .and_then(Value::as_array)
            .expect("choices present");
        assert_eq!(choices.len(), 2);
        let choice_id = choices[1]
            .get("id")
            .and_then(Value::as_u64)
            .expect("choice id present");

        for _ in 0..2 {
            let vote_response = router
                .clone()
                .oneshot(json_post(
                    format!("/api/v1/polls/{question_id}/vote?as_of={AS_OF}"),
                    &json!({ "choice_id": choice_id }),
                ))
                .await
                .expect("route executes");
            assert_eq!(vote_response.status(), StatusCode::OK);
        }

        let results_response = router
            .clone()
            .oneshot(get(format!(
                "/api/v1/polls/{question_id}/results?as_of={AS_OF}"
            )))
            .await
            .expect("route executes");
        assert_eq!(results_response.status(), StatusCode::OK);
        let results = read_json_body(results_response).await;
        assert_eq!(results.get("total_votes"), Some(&json!(2)));
        let tallies = results
            .get("results")
            .and_then(Value::as_array)
            .expect("tallies present");
        assert_eq!(tallies[1].get("votes"), Some(&json!(2)));
        assert_eq!(tallies[0].get("votes"), Some(&json!(0)));
    }

    #[tokio::test]
    async fn scheduled_questions_stay_invisible_until_their_instant() {
        let (router, service) = build_router();
        let now = evaluation_instant();

        service
            .create(
                QuestionDraft::new("Tomorrow's poll", now + Duration::days(1))
                    .with_choices(["Later"]),
            )
            .expect("create succeeds");

        let hidden = router
            .clone()
            .oneshot(get(format!("/api/v1/polls/1?as_of={AS_OF}")))
            .await
            .expect("route executes");
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

        let visible = router
            .oneshot(get(
                "/api/v1/polls/1?as_of=2025-09-26T12:00:00Z".to_string()
            ))
            .await
            .expect("route executes");
        assert_eq!(visible.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_board_carries_the_no_polls_message() {
        let (router, _) = build_router();

        let response = router
            .oneshot(get(format!("/api/v1/polls?as_of={AS_OF}")))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let listing = read_json_body(response).await;
        assert_eq!(listing.get("message"), Some(&json!(NO_POLLS_MESSAGE)));
    }

    #[tokio::test]
    async fn deleting_a_question_cascades_to_its_results() {
        let (router, service) = build_router();
        let now = evaluation_instant();

        let created = service
            .create(
                QuestionDraft::new("Short lived", now - Duration::days(1))
                    .with_choices(["A", "B"]),
            )
            .expect("create succeeds");
        let id = created.question.id;

        let delete_response = router
            .clone()
            .oneshot(
                Request::delete(format!("/api/v1/polls/{id}"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(delete_response.status(), StatusCode::NO_CONTENT);

        let results_response = router
            .oneshot(get(format!("/api/v1/polls/{id}/results?as_of={AS_OF}")))
            .await
            .expect("route executes");
        assert_eq!(results_response.status(), StatusCode::NOT_FOUND);
    }
}
