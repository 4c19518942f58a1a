//! Categorized error collection for one assembly job.
//!
//! Handlers append one record per violation and carry on; the job finishes
//! every pass and only then decides, from [`ErrorLog::has_errors`], whether
//! any output may be written.

use std::fmt;

/// Every error category the assembler can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FileNotFound,
    MacroNameMissing,
    MacroNameInvalid,
    AllocationFailed,
    UnexpectedToken,
    InvalidLabelName,
    LabelNameUsedAsMacro,
    LabelNameAlreadyDeclared,
    ReservedWord,
    InvalidData,
    InvalidString,
    InvalidInstruction,
    InvalidSourceOperand,
    InvalidDestOperand,
    InvalidAddressMode,
    LabelAlreadyDeclared,
    LabelDeclaredAsExternal,
    LabelNotDeclared,
    EntryLabelExternal,
    Unknown,
}

impl ErrorCode {
    /// The message template for this code. `%s` interpolates the record's
    /// detail token.
    pub fn template(self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "File not found: %s",
            ErrorCode::MacroNameMissing => "Macro name missing.",
            ErrorCode::MacroNameInvalid => "Macro name is not valid: %s",
            ErrorCode::AllocationFailed => "Memory allocation failed.",
            ErrorCode::UnexpectedToken => "Unexpected token: %s",
            ErrorCode::InvalidLabelName => "Invalid label name: %s",
            ErrorCode::LabelNameUsedAsMacro => "Label name used as macro: %s",
            ErrorCode::LabelNameAlreadyDeclared => "Label name already declared: %s",
            ErrorCode::ReservedWord => "Reserved word: %s",
            ErrorCode::InvalidData => "Invalid data: %s",
            ErrorCode::InvalidString => "Invalid string: %s",
            ErrorCode::InvalidInstruction => "Invalid instruction: %s",
            ErrorCode::InvalidSourceOperand => "Invalid source operand at the instruction: %s",
            ErrorCode::InvalidDestOperand => "Invalid destination operand at the instruction: %s",
            ErrorCode::InvalidAddressMode => "Invalid address mode at the instruction: %s",
            ErrorCode::LabelAlreadyDeclared => "Label already declared: %s",
            ErrorCode::LabelDeclaredAsExternal => "Label: %s is declared as an extern.",
            ErrorCode::LabelNotDeclared => "Label: %s is not declared.",
            ErrorCode::EntryLabelExternal => "Label: %s is declared as an entry.",
            ErrorCode::Unknown => "Unknown error.",
        }
    }
}

/// One recorded error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub filename: String,
    pub line: usize,
    pub detail: Option<String>,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match &self.detail {
            Some(detail) => self.code.template().replace("%s", detail),
            None => self.code.template().to_string(),
        };
        write!(
            f,
            "Error in file {} at line {}: {}",
            self.filename, self.line, message
        )
    }
}

/// Append-only error accumulator for one job
#[derive(Debug, Default)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
}

impl ErrorLog {
    pub fn new() -> ErrorLog {
        ErrorLog::default()
    }

    /// Record one error.
    pub fn add(&mut self, code: ErrorCode, filename: &str, line: usize, detail: Option<&str>) {
        self.records.push(ErrorRecord {
            code,
            filename: filename.to_string(),
            line,
            detail: detail.map(str::to_string),
        });
    }

    /// Whether any error has been recorded for the current job.
    pub fn has_errors(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Print every record on its own line to standard error.
    pub fn report(&self) {
        for record in &self.records {
            eprintln!("{record}");
        }
    }
}
