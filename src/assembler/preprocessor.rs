//! Text-macro expansion.
//!
//! A definition opens with a line whose first token is `macr` followed by
//! the macro name, and closes with a line whose first token is `endmacr`.
//! Elsewhere, a line whose first token names a defined macro is replaced by
//! the body verbatim. Definitions are collected in a first scan and
//! expanded in a second, so a call site above its definition still expands.
//! The expansion table lives and dies with one source file; only the set of
//! names is handed back to the job so label validation can reject them.

use std::collections::HashSet;

use super::errors::{ErrorCode, ErrorLog};
use super::validation;

/// One collected macro definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub body: Vec<String>,
}

/// Expand every macro in one source file, returning the output line list.
/// Names of the macros defined here are added to `macro_names`.
pub fn preprocess(
    source: &str,
    filename: &str,
    errors: &mut ErrorLog,
    macro_names: &mut HashSet<String>,
) -> Vec<String> {
    let macros = collect_macros(source, filename, errors);
    for definition in &macros {
        macro_names.insert(definition.name.clone());
    }
    expand(source, &macros)
}

fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// First scan: gather every `macr` definition. A missing or invalid name is
/// reported and the definition skipped, but scanning continues.
fn collect_macros(source: &str, filename: &str, errors: &mut ErrorLog) -> Vec<Macro> {
    let lines: Vec<&str> = source.lines().collect();
    let mut macros = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let line_number = index + 1;
        let mut tokens = lines[index].split_whitespace();
        if tokens.next() == Some("macr") {
            match tokens.next() {
                None => errors.add(ErrorCode::MacroNameMissing, filename, line_number, None),
                Some(name) if !validation::is_valid_macro_name(name) => {
                    errors.add(ErrorCode::MacroNameInvalid, filename, line_number, Some(name));
                }
                Some(name) => {
                    let mut body = Vec::new();
                    index += 1;
                    while index < lines.len() && first_token(lines[index]) != Some("endmacr") {
                        body.push(lines[index].to_string());
                        index += 1;
                    }
                    macros.push(Macro {
                        name: name.to_string(),
                        body,
                    });
                }
            }
        }
        index += 1;
    }
    macros
}

/// Second scan: drop definition blocks and splice bodies in at call sites.
/// Everything else, empty and comment lines included, passes through.
fn expand(source: &str, macros: &[Macro]) -> Vec<String> {
    let mut output = Vec::new();
    let mut in_definition = false;
    for line in source.lines() {
        let Some(token) = first_token(line) else {
            output.push(String::new());
            continue;
        };
        if token == "macr" {
            in_definition = true;
            continue;
        }
        if token == "endmacr" {
            in_definition = false;
            continue;
        }
        if in_definition {
            continue;
        }
        if let Some(definition) = macros.iter().find(|m| m.name == token) {
            output.extend(definition.body.iter().cloned());
        } else {
            output.push(line.to_string());
        }
    }
    output
}
