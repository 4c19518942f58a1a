//! Handlers for the `.data`, `.string`, `.entry` and `.extern` directives

use super::Job;
use super::errors::ErrorCode;
use super::memory::{Word, int_to_word};
use super::statement::Statement;
use super::validation;

/// `.data`: append one signed-encoded word per integer value. A bad value
/// is reported and skipped; the rest of the list is still stored.
pub fn handle_data(job: &mut Job, statement: &Statement, values: &[&str]) {
    for &token in values {
        if !validation::is_valid_integer(token) {
            job.errors.add(
                ErrorCode::InvalidData,
                &job.current_file,
                statement.line_number(),
                Some(token),
            );
            continue;
        }
        let digits = token.strip_prefix('#').unwrap_or(token);
        match digits.parse::<i64>() {
            Ok(value) => job.memory.write_data(int_to_word(value)),
            Err(_) => job.errors.add(
                ErrorCode::InvalidData,
                &job.current_file,
                statement.line_number(),
                Some(token),
            ),
        }
    }
}

/// `.string`: append one word per byte of the quoted literal, then a zero
/// terminator.
pub fn handle_string(job: &mut Job, statement: &Statement, arguments: &[&str]) {
    let token = arguments.first().copied().unwrap_or(statement.line());
    if !validation::is_valid_string(token) {
        job.errors.add(
            ErrorCode::InvalidString,
            &job.current_file,
            statement.line_number(),
            Some(token),
        );
        return;
    }
    for &byte in token[1..token.len() - 1].as_bytes() {
        job.memory.write_data(byte as Word);
    }
    job.memory.write_data(0);
}

/// `.entry`: mark the label as exported from this job.
pub fn handle_entry(job: &mut Job, statement: &Statement, arguments: &[&str]) {
    if let Some(name) = checked_label(job, statement, arguments) {
        job.symbols
            .mark_entry(name, &job.current_file, statement.line_number(), &mut job.errors);
    }
}

/// `.extern`: mark the label as imported into this job.
pub fn handle_extern(job: &mut Job, statement: &Statement, arguments: &[&str]) {
    if let Some(name) = checked_label(job, statement, arguments) {
        job.symbols
            .mark_external(name, &job.current_file, statement.line_number(), &mut job.errors);
    }
}

fn checked_label<'a>(job: &mut Job, statement: &Statement, arguments: &[&'a str]) -> Option<&'a str> {
    let Some(&name) = arguments.first() else {
        job.errors.add(
            ErrorCode::InvalidLabelName,
            &job.current_file,
            statement.line_number(),
            Some(statement.line()),
        );
        return None;
    };
    if let Some(code) = validation::label_name_error(name, &job.macro_names) {
        job.errors
            .add(code, &job.current_file, statement.line_number(), Some(name));
        return None;
    }
    Some(name)
}
