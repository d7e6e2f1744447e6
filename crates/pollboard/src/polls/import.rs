use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::QuestionDraft;

#[derive(Debug)]
pub enum PollImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingQuestionText { record: u64 },
    InvalidPubDate { record: u64, value: String },
}

impl std::fmt::Display for PollImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollImportError::Io(err) => write!(f, "failed to read poll export: {}", err),
            PollImportError::Csv(err) => write!(f, "invalid poll CSV data: {}", err),
            PollImportError::MissingQuestionText { record } => {
                write!(f, "record {} is missing a question text", record)
            }
            PollImportError::InvalidPubDate { record, value } => {
                write!(
                    f,
                    "record {} has an unparseable publish timestamp '{}'",
                    record, value
                )
            }
        }
    }
}

impl std::error::Error for PollImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollImportError::Io(err) => Some(err),
            PollImportError::Csv(err) => Some(err),
            PollImportError::MissingQuestionText { .. } => None,
            PollImportError::InvalidPubDate { .. } => None,
        }
    }
}

impl From<std::io::Error> for PollImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PollImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loader for CSV poll exports. Rows sharing a question text collapse into
/// one draft carrying every listed choice; the publish timestamp of the
/// first row wins. A row with an empty `Choice` cell contributes the
/// question alone, which is how choiceless questions enter the system.
pub struct PollCsvImporter;

impl PollCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<QuestionDraft>, PollImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<QuestionDraft>, PollImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut drafts: Vec<QuestionDraft> = Vec::new();

        for (index, row) in csv_reader.deserialize::<SeedRow>().enumerate() {
            let row = row?;
            let record = index as u64 + 1;

            let question_text = row
                .question
                .ok_or(PollImportError::MissingQuestionText { record })?;
            let raw_pub_date = row.published_at.unwrap_or_default();
            let pub_date = parse_timestamp(&raw_pub_date).ok_or_else(|| {
                PollImportError::InvalidPubDate {
                    record,
                    value: raw_pub_date.clone(),
                }
            })?;

            let position = match drafts
                .iter()
                .position(|draft| draft.question_text == question_text)
            {
                Some(position) => position,
                None => {
                    drafts.push(QuestionDraft::new(question_text, pub_date));
                    drafts.len() - 1
                }
            };

            if let Some(choice) = row.choice {
                drafts[position].choices.push(choice);
            }
        }

        Ok(drafts)
    }
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    #[serde(rename = "Question", default, deserialize_with = "empty_string_as_none")]
    question: Option<String>,
    #[serde(
        rename = "Published At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    published_at: Option<String>,
    #[serde(rename = "Choice", default, deserialize_with = "empty_string_as_none")]
    choice: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates; bare dates read
/// as midnight UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
