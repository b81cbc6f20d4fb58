//! Readers for the comma-separated course timetable and flight listings.
//!
//! Timetable rows: `_, group, _, day, start, end, rating[, ...]` after a header line.
//! Flight rows: `_, _, start, end, price[, ...]` without a header.

use super::time::{day_and_time_to_ordinal, time_to_minutes, LabelError};
use crate::core::{Instance, InstanceError, Time};
use std::io::BufRead;
use thiserror::Error;

/// Reasons a table cannot be turned into an instance.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    Columns {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: {source}")]
    Label { line: usize, source: LabelError },
    #[error("line {line}: `{value}` is not a number")]
    Number { line: usize, value: String },
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default)]
struct Columns {
    start: Vec<Time>,
    end: Vec<Time>,
    weight: Vec<f64>,
    groups: Vec<Option<String>>,
}

fn fields(line: usize, text: &str, expected: usize) -> Result<Vec<&str>, TableError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() < expected {
        return Err(TableError::Columns {
            line,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn number(line: usize, value: &str) -> Result<f64, TableError> {
    value.parse().map_err(|_| TableError::Number {
        line,
        value: value.to_owned(),
    })
}

fn label<T>(line: usize, result: Result<T, LabelError>) -> Result<T, TableError> {
    result.map_err(|source| TableError::Label { line, source })
}

/// Reads a course timetable. Sections of the same course share a group,
/// so grouped solvers pick at most one section per course.
///
/// # Errors
/// - If a line has too few columns or an unparsable field.
/// - If a section ends before it starts.
pub fn read_timetable(reader: impl BufRead) -> Result<Instance, TableError> {
    let mut columns = Columns::default();

    for (index, text) in reader.lines().enumerate().skip(1) {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }

        let line = index + 1;
        let fields = fields(line, &text, 7)?;
        columns.start.push(label(line, day_and_time_to_ordinal(fields[3], fields[4]))?);
        columns.end.push(label(line, day_and_time_to_ordinal(fields[3], fields[5]))?);
        columns.weight.push(number(line, fields[6])?);
        columns.groups.push(Some(fields[1].to_owned()).filter(|group| !group.is_empty()));
    }

    Ok(Instance::from_columns(&columns.start, &columns.end, &columns.weight)?.with_groups(columns.groups)?)
}

/// Reads a flight listing with `HH:MM` departure and arrival times.
///
/// # Errors
/// - If a line has too few columns or an unparsable field.
/// - If a flight arrives before it departs.
pub fn read_flights(reader: impl BufRead) -> Result<Instance, TableError> {
    let mut columns = Columns::default();

    for (index, text) in reader.lines().enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }

        let line = index + 1;
        let fields = fields(line, &text, 5)?;
        columns.start.push(label(line, time_to_minutes(fields[2]))?);
        columns.end.push(label(line, time_to_minutes(fields[3]))?);
        columns.weight.push(number(line, fields[4])?);
    }

    Ok(Instance::from_columns(&columns.start, &columns.end, &columns.weight)?)
}
