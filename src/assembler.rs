//! Assembles source files for a 15-bit educational machine in two passes
//! over a shared job state.
//!
//! A source file is plain text, one statement per line. Comments start with
//! a semicolon (`;`) at the beginning of the line and blank lines are
//! ignored. A label declaration is a name followed by a colon at the start
//! of a line:
//!
//! ```ignore
//! MAIN:   mov r3, LENGTH
//!         prn #48
//!         stop
//! LENGTH: .data 6, -9, 15
//! STR:    .string "abcd"
//! ```
//!
//! The sixteen instructions are `mov`, `cmp`, `add`, `sub`, `lea`, `clr`,
//! `not`, `inc`, `dec`, `jmp`, `bne`, `red`, `prn`, `jsr`, `rts` and
//! `stop`. Operands use four addressing modes: immediate (`#5`), direct
//! (a label), indirect register (`*r2`) and direct register (`r2`).
//!
//! The supported directives are:
//! - `.data n, n, ...`: store signed words
//! - `.string "text"`: store a zero-terminated string
//! - `.entry LABEL`: export a label defined in this job
//! - `.extern LABEL`: import a label defined elsewhere
//!
//! Text macros are expanded before assembly: `macr NAME` opens a
//! definition, `endmacr` closes it, and a line starting with the macro
//! name is replaced by the body.
//!
//! All files given to one invocation are assembled into a single program:
//! the first pass collects symbols and encodes both streams file by file,
//! relocation moves data behind the instructions at the program origin,
//! and the second pass patches every word that names a label. Output is
//! suppressed when any error was collected along the way.

pub mod directives;
pub mod errors;
pub mod instructions;
pub mod memory;
pub mod operations;
pub mod output;
pub mod preprocessor;
pub mod statement;
pub mod symbols;
pub mod validation;

#[cfg(test)]
mod test;

use std::collections::HashSet;
use std::fs;

use crate::logging;
use errors::{ErrorCode, ErrorLog};
use memory::{
    ARE_EXTERNAL, ARE_RELOCATABLE, Memory, PROGRAM_ORIGIN, WORD_MASK, int_to_word,
};
use statement::Statement;
use symbols::SymbolTable;

/// Shared mutable state of one assembly job
#[derive(Debug, Default)]
pub struct Job {
    pub memory: Memory,
    pub symbols: SymbolTable,
    pub errors: ErrorLog,
    /// Names of every macro defined in any of the job's files
    pub macro_names: HashSet<String>,
    /// File the passes are currently walking, for error attribution
    pub current_file: String,
}

impl Job {
    pub fn new() -> Job {
        Job::default()
    }
}

/// One use of an external label: the referencing word's final address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUse {
    pub name: String,
    pub address: u16,
}

/// Run the first pass over one preprocessed file: classify each line and
/// grow the symbol table and the two streams.
pub fn first_pass(job: &mut Job, filename: &str, lines: &[String]) {
    job.current_file = filename.to_string();
    let lexer = statement::lexer();
    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let statement = Statement::tokenize(&lexer, line, index + 1);
        classify_line(job, &statement);
    }
}

/// Dispatch one statement to its handler.
fn classify_line(job: &mut Job, statement: &Statement) {
    let tokens = statement.tokens();
    let Some(&first) = tokens.first() else {
        return;
    };

    let mut rest = tokens;
    if let Some(label) = first.strip_suffix(':') {
        rest = &tokens[1..];
        // a label in front of .entry/.extern carries no meaning
        if !matches!(rest.first(), Some(&".entry" | &".extern")) {
            declare_label(job, statement, label, rest);
        }
    }

    match rest.first() {
        None => {}
        Some(&".data") => directives::handle_data(job, statement, &rest[1..]),
        Some(&".string") => directives::handle_string(job, statement, &rest[1..]),
        Some(&".entry") => directives::handle_entry(job, statement, &rest[1..]),
        Some(&".extern") => directives::handle_extern(job, statement, &rest[1..]),
        Some(&mnemonic) if operations::is_mnemonic(mnemonic) => {
            instructions::encode(job, statement, mnemonic, &rest[1..]);
        }
        Some(&other) => job.errors.add(
            ErrorCode::UnexpectedToken,
            &job.current_file,
            statement.line_number(),
            Some(other),
        ),
    }
}

/// Bind a label declaration at the current IC or DC.
fn declare_label(job: &mut Job, statement: &Statement, name: &str, rest: &[&str]) {
    if let Some(code) = validation::label_name_error(name, &job.macro_names) {
        job.errors
            .add(code, &job.current_file, statement.line_number(), Some(name));
        return;
    }
    let is_instruction = rest.first().is_some_and(|token| operations::is_mnemonic(token));
    let address = if is_instruction {
        job.memory.ic
    } else {
        job.memory.dc
    };
    job.symbols.declare(
        name,
        address,
        is_instruction,
        &job.current_file,
        statement.line_number(),
        &mut job.errors,
    );
}

/// Move every symbol and stream node to its final address: instructions
/// start at the program origin, data follows the last instruction word,
/// externals stay at zero.
pub fn relocate(job: &mut Job) {
    let data_base = job.memory.ic + PROGRAM_ORIGIN;
    for symbol in job.symbols.iter_mut() {
        if symbol.external {
            continue;
        }
        if symbol.is_instruction {
            symbol.address += PROGRAM_ORIGIN;
        } else if symbol.declared {
            symbol.address += data_base;
        }
    }
    job.memory.relocate();
}

/// Second pass: rewrite every instruction word that references a label with
/// the resolved address and ARE tag, collecting one record per use of an
/// external label. Unresolved names are left for the symbol cross-check.
pub fn resolve_references(job: &mut Job) -> Vec<ExternalUse> {
    let mut uses = Vec::new();
    for node in &mut job.memory.instructions {
        let Some(name) = &node.label_ref else {
            continue;
        };
        match job.symbols.find(name) {
            Some(symbol) if symbol.external => {
                node.word = ARE_EXTERNAL;
                uses.push(ExternalUse {
                    name: name.clone(),
                    address: node.address,
                });
            }
            Some(symbol) if symbol.declared => {
                node.word = ((int_to_word(symbol.address as i64) << 3) & WORD_MASK)
                    | ARE_RELOCATABLE;
            }
            _ => {}
        }
    }
    uses
}

/// Validate the finished symbol table across all of the job's files.
pub fn cross_check_symbols(job: &mut Job) {
    for symbol in job.symbols.iter() {
        if symbol.external {
            if symbol.declared {
                job.errors.add(
                    ErrorCode::LabelDeclaredAsExternal,
                    &symbol.file,
                    symbol.line,
                    Some(&symbol.name),
                );
            }
            if symbol.entry {
                job.errors.add(
                    ErrorCode::EntryLabelExternal,
                    &symbol.file,
                    symbol.line,
                    Some(&symbol.name),
                );
            }
        } else if !symbol.declared {
            job.errors.add(
                ErrorCode::LabelNotDeclared,
                &symbol.file,
                symbol.line,
                Some(&symbol.name),
            );
        }
    }
}

/// Assemble one job. Returns `true` when every pass finished without a
/// recorded error and all output files were written.
pub fn assemble_files(paths: &[String]) -> bool {
    let mut job = Job::new();

    // pre-process every file up front; failure suppresses all output
    let mut listings = Vec::new();
    for path in paths {
        match fs::read_to_string(path) {
            Ok(source) => {
                let lines =
                    preprocessor::preprocess(&source, path, &mut job.errors, &mut job.macro_names);
                listings.push((path.clone(), lines));
            }
            Err(_) => job.errors.add(ErrorCode::FileNotFound, path, 0, Some(path)),
        }
    }
    if job.errors.has_errors() {
        job.errors.report();
        return false;
    }

    let base = output::job_base_name(paths);
    output::delete_stale_outputs(&base, paths);
    for (path, lines) in &listings {
        let am = output::am_path(path);
        if let Err(error) = output::write_am_file(&am, lines) {
            logging::error(format!("failed to write {am}: {error}"));
            return false;
        }
        println!("Preprocessing succeeded. Output written to {am}");
    }

    for (path, lines) in &listings {
        first_pass(&mut job, &output::am_path(path), lines);
    }
    relocate(&mut job);
    let uses = resolve_references(&mut job);
    cross_check_symbols(&mut job);

    if job.errors.has_errors() {
        job.errors.report();
        return false;
    }
    if let Err(error) = output::write_output_files(&base, &job, &uses) {
        logging::error(format!("failed to write output files: {error}"));
        return false;
    }
    println!("Assembly completed successfully for all files.");
    true
}
