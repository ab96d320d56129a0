//! Search, suggestion and filter discovery commands

use crate::app::{OutputFormat, SearchArgs, SuggestArgs};
use crate::output::{self, DocumentRow, FormatOptions};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use examdesk_core::search::subject_display_name;
use examdesk_core::{DateRange, DocumentStore, ExamDeskError, FilterSet, SearchIndex};
use std::path::Path;

pub async fn run(args: SearchArgs, store_path: &Path, format: OutputFormat) -> Result<()> {
    let store = DocumentStore::open(store_path)?;
    let documents = store.documents();
    let query = args.query.join(" ");

    let mut filters = FilterSet::new();
    filters.subject = args.subject;
    filters.file_type = args.file_type;
    filters.exam_type = args.exam_type;
    if args.from.is_some() || args.to.is_some() {
        let start = args.from.as_deref().map(start_of_day).transpose()?;
        let end = args.to.as_deref().map(end_of_day).transpose()?;
        filters = filters.with_date_range(DateRange::new(start, end));
    }

    let index = SearchIndex::from_documents(documents);
    let positions = index.search_positions(&query, &filters, documents);
    tracing::debug!(
        "Query {:?} matched {} of {} documents ({} terms indexed)",
        query,
        positions.len(),
        documents.len(),
        index.term_count()
    );

    let rows: Vec<DocumentRow> = positions
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .filter_map(|position| {
            documents
                .get(position)
                .map(|document| DocumentRow { position, document })
        })
        .collect();

    if rows.is_empty() && format == OutputFormat::Cli {
        println!("No results found");
        return Ok(());
    }

    let options = FormatOptions {
        highlight: args.highlight.then_some(query),
    };
    print!("{}", output::format_documents(&rows, format, &options));
    Ok(())
}

pub async fn run_suggest(args: SuggestArgs, store_path: &Path, format: OutputFormat) -> Result<()> {
    let store = DocumentStore::open(store_path)?;
    let index = SearchIndex::from_documents(store.documents());
    let suggestions = index.suggestions(&args.partial, store.documents(), args.limit);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
        _ => {
            for suggestion in suggestions {
                println!("{}", suggestion);
            }
        }
    }
    Ok(())
}

pub async fn run_filters(store_path: &Path, format: OutputFormat) -> Result<()> {
    let store = DocumentStore::open(store_path)?;
    let available = SearchIndex::from_documents(store.documents()).available_filters(store.documents());

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&available)?);
        }
        _ => {
            println!("Subjects:");
            for code in &available.subjects {
                println!("  {:<12} {}", code, subject_display_name(code));
            }
            println!("File types:");
            for file_type in &available.file_types {
                println!("  {}", file_type);
            }
            println!("Exam types:");
            for exam_type in &available.exam_types {
                println!("  {}", exam_type);
            }
            println!("Years:");
            for year in &available.years {
                println!("  {}", year);
            }
        }
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ExamDeskError::InvalidInput(format!("expected a YYYY-MM-DD date, got '{}'", value)).into()
    })
}

fn start_of_day(value: &str) -> Result<DateTime<Utc>> {
    Ok(parse_date(value)?.and_time(NaiveTime::MIN).and_utc())
}

fn end_of_day(value: &str) -> Result<DateTime<Utc>> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Ok(parse_date(value)?.and_time(last_second).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_bounds() {
        assert_eq!(
            start_of_day("2024-03-10").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            end_of_day("2024-03-10").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_bad_date_is_invalid_input() {
        let err = start_of_day("10/03/2024").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExamDeskError>(),
            Some(ExamDeskError::InvalidInput(_))
        ));
    }
}
