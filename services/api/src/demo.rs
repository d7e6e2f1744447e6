use crate::infra::{parse_timestamp, seed_service, InMemoryPollRepository};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use pollboard::config::ListingConfig;
use pollboard::error::AppError;
use pollboard::polls::{
    is_displayable, PollCsvImporter, PollService, QuestionDraft, QuestionRecord,
    NO_POLLS_MESSAGE,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct PollSnapshotArgs {
    /// Optional CSV export to seed the board (defaults to built-in samples).
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Evaluation instant for the snapshot (RFC 3339 or YYYY-MM-DD, defaults to now).
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Cap on the number of listed questions (defaults to the configured limit).
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Include each question's choices and tallies in the output.
    #[arg(long)]
    pub(crate) list_choices: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation instant for the demo (RFC 3339 or YYYY-MM-DD, defaults to now).
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

pub(crate) fn run_poll_snapshot(args: PollSnapshotArgs) -> Result<(), AppError> {
    let PollSnapshotArgs {
        csv,
        as_of,
        limit,
        list_choices,
    } = args;

    let now = as_of.unwrap_or_else(Utc::now);
    let (service, _, imported) = seeded_service(csv, now)?;

    if imported {
        println!("Data source: CSV import");
    } else {
        println!("Data source: built-in sample polls");
    }

    render_board(&service, now, limit, list_choices)?;
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.as_of.unwrap_or_else(Utc::now);

    println!("Poll board demo");
    let (service, seeded, _) = seeded_service(None, now)?;
    render_board(&service, now, None, true)?;

    let withheld: Vec<&QuestionRecord> = seeded
        .iter()
        .filter(|record| !is_displayable(record, now))
        .collect();
    if !withheld.is_empty() {
        println!("\nWithheld from the board:");
        for record in withheld {
            let reason = if record.choices.is_empty() {
                "has no choices yet".to_string()
            } else {
                format!("publishes {}", record.question.pub_date.to_rfc3339())
            };
            println!("  - {} ({})", record.question.question_text, reason);
        }
    }

    let listed = service.latest(None, now).map_err(AppError::from)?;
    let Some(target) = listed.first() else {
        println!("\nNothing displayable to vote on, demo ends early");
        return Ok(());
    };
    let question_id = target.question.id;
    let Some(choice) = target.choices.first() else {
        println!("\nListed question carries no choices, demo ends early");
        return Ok(());
    };

    println!(
        "\nCasting three votes for '{}' on question {}",
        choice.choice_text, question_id
    );
    for _ in 0..3 {
        if let Err(err) = service.vote(question_id, choice.id, now) {
            println!("  Vote rejected: {}", err);
            return Ok(());
        }
    }

    let results = match service.results(question_id, now) {
        Ok(record) => record,
        Err(err) => {
            println!("  Results unavailable: {}", err);
            return Ok(());
        }
    };
    println!("Results for question {question_id}:");
    for tally in &results.choices {
        println!("  - {}: {} votes", tally.choice_text, tally.votes);
    }

    match serde_json::to_string_pretty(&results.results_view()) {
        Ok(json) => println!("\nResults payload:\n{}", json),
        Err(err) => println!("\nResults payload unavailable: {}", err),
    }

    println!("\nDeleting question {question_id} and rendering the board again");
    if let Err(err) = service.delete(question_id) {
        println!("  Delete rejected: {}", err);
        return Ok(());
    }
    render_board(&service, now, None, false)?;

    Ok(())
}

type SeededBoard = (
    Arc<PollService<InMemoryPollRepository>>,
    Vec<QuestionRecord>,
    bool,
);

fn seeded_service(csv: Option<PathBuf>, now: DateTime<Utc>) -> Result<SeededBoard, AppError> {
    let repository = Arc::new(InMemoryPollRepository::default());
    let service = Arc::new(PollService::new(repository, ListingConfig::default()));

    let (drafts, imported) = match csv {
        Some(path) => (PollCsvImporter::from_path(path)?, true),
        None => (sample_drafts(now), false),
    };
    let seeded = seed_service(&service, drafts).map_err(AppError::from)?;

    Ok((service, seeded, imported))
}

/// Built-in seed data spanning every publication state: one recent, one
/// long-published, one scheduled, and one published without choices.
fn sample_drafts(now: DateTime<Utc>) -> Vec<QuestionDraft> {
    vec![
        QuestionDraft::new("What's the best way to start the day?", now - Duration::hours(3))
            .with_choices(["Coffee", "A long walk", "More sleep"]),
        QuestionDraft::new("Tabs or spaces?", now - Duration::days(6))
            .with_choices(["Tabs", "Spaces"]),
        QuestionDraft::new("Where should the next offsite be?", now + Duration::days(7))
            .with_choices(["Lisbon", "Kyoto"]),
        QuestionDraft::new("Any feedback on the new menu?", now - Duration::days(2)),
    ]
}

fn render_board(
    service: &PollService<InMemoryPollRepository>,
    now: DateTime<Utc>,
    limit: Option<usize>,
    list_choices: bool,
) -> Result<(), AppError> {
    let listed = service.latest(limit, now).map_err(AppError::from)?;

    println!("\nPoll board at {}", now.to_rfc3339());
    if listed.is_empty() {
        println!("{}", NO_POLLS_MESSAGE);
        return Ok(());
    }

    for record in &listed {
        render_entry(record, now, list_choices);
    }
    Ok(())
}

fn render_entry(record: &QuestionRecord, now: DateTime<Utc>, list_choices: bool) {
    let summary = record.summary(now);
    println!(
        "- [{}] {} (published {}, {} choices)",
        summary.status_label,
        summary.question_text,
        summary.pub_date.to_rfc3339(),
        summary.choice_count
    );

    if list_choices {
        for choice in &record.choices {
            println!("    - {}: {} votes", choice.choice_text, choice.votes);
        }
    }
}
