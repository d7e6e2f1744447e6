//! Poll publication pipeline: question and choice entities, the date-driven
//! visibility rules, the storage contract, the service facade the HTTP layer
//! consumes, and the CSV seed importer.
//!
//! Publication is a property of the evaluation instant, never of the stored
//! data: the same question can be hidden at one instant and listed the next,
//! so every read path threads `now` through explicitly.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use domain::{Choice, ChoiceId, PublicationStatus, Question, QuestionDraft, QuestionId};
pub use import::{PollCsvImporter, PollImportError};
pub use repository::{PollRepository, QuestionRecord, RepositoryError};
pub use router::{poll_router, ReadQuery, VoteRequest};
pub use service::{PollService, PollServiceError};
pub use views::{
    ChoiceOption, ChoiceTally, LatestQuestions, PollResults, QuestionDetail, QuestionSummary,
    NO_POLLS_MESSAGE,
};
pub use visibility::{
    get_or_not_found, is_displayable, is_published, publication_status, select_displayable,
    was_published_recently, QuestionNotFound,
};
