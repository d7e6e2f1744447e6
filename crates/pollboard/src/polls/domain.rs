use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a stored question. Ids come from a monotonic
/// sequence, so ordering by id reproduces creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned to a stored choice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChoiceId(pub u64);

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A poll prompt together with the instant it becomes visible. `pub_date`
/// may sit in the future, in which case the question exists in storage but
/// is withheld from every public surface until the instant passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

/// One selectable answer for a question, with its running tally. Votes only
/// ever increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub choice_text: String,
    pub votes: u64,
}

/// Creation input for a question. Ids are assigned by the repository when
/// the draft is stored; an empty choice list is legal and produces a
/// question that is never listed until choices are added elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub choices: Vec<String>,
}

impl QuestionDraft {
    pub fn new(question_text: impl Into<String>, pub_date: DateTime<Utc>) -> Self {
        Self {
            question_text: question_text.into(),
            pub_date,
            choices: Vec::new(),
        }
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }
}

/// Where a question sits relative to an evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Scheduled,
    Recent,
    Published,
}

impl PublicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Recent => "Recently published",
            Self::Published => "Published",
        }
    }
}
