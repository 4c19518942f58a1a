//! Pure validation predicates over source tokens.
//!
//! Nothing here touches the job state; callers report whatever code a
//! predicate hands back.

use std::collections::HashSet;

use super::errors::ErrorCode;
use super::memory::AddressingMode;
use super::operations;

/// Words that may not be used as label names
pub const RESERVED_WORDS: [&str; 20] = [
    "mov", "cmp", "add", "sub", "lea", "clr", "not", "inc", "dec", "jmp", "bne", "red", "prn",
    "jsr", "rts", "stop", ".data", ".string", ".extern", ".entry",
];

/// Whether a token is a valid integer literal: an optional leading `#`, an
/// optional sign, then one or more decimal digits.
pub fn is_valid_integer(token: &str) -> bool {
    let token = token.strip_prefix('#').unwrap_or(token);
    let token = token
        .strip_prefix('+')
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token);
    !token.is_empty() && token.bytes().all(|byte| byte.is_ascii_digit())
}

/// Whether a token is a valid string literal: enclosed in double quotes
/// with every interior byte printable ASCII.
pub fn is_valid_string(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
        return false;
    }
    bytes[1..bytes.len() - 1]
        .iter()
        .all(|&byte| (32..=126).contains(&byte))
}

/// Whether a token is a register, `r0` through `r7`.
pub fn is_register(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 2 && bytes[0] == b'r' && (b'0'..=b'7').contains(&bytes[1])
}

/// Whether a token is a pointer to a register, `*r0` through `*r7`.
pub fn is_indirect_register(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 3 && bytes[0] == b'*' && bytes[1] == b'r' && (b'0'..=b'7').contains(&bytes[2])
}

/// Check a label name. Returns the error to report when the name is not
/// usable: it must start with a letter, must not be a reserved word, and
/// must not collide with a macro defined anywhere in the job.
pub fn label_name_error(name: &str, macro_names: &HashSet<String>) -> Option<ErrorCode> {
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Some(ErrorCode::InvalidLabelName);
    }
    if RESERVED_WORDS.contains(&name) {
        return Some(ErrorCode::ReservedWord);
    }
    if macro_names.contains(name) {
        return Some(ErrorCode::LabelNameUsedAsMacro);
    }
    None
}

/// Whether a name may be defined as a macro: starts with a letter and is
/// not a mnemonic, a pre-processor keyword, or a register name.
pub fn is_valid_macro_name(name: &str) -> bool {
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if operations::is_mnemonic(name) || name == "macr" || name == "endmacr" {
        return false;
    }
    !is_register(name)
}

/// Check an instruction's addressing modes against the per-opcode legality
/// table. Returns every violated rule; an empty vector means the
/// combination is encodable.
pub fn validate_instruction(
    mnemonic: &str,
    source: Option<AddressingMode>,
    dest: Option<AddressingMode>,
) -> Vec<ErrorCode> {
    use AddressingMode::*;

    let mut violations = Vec::new();
    match mnemonic {
        "mov" | "add" | "sub" | "cmp" | "lea" => {
            if source.is_none() {
                violations.push(ErrorCode::InvalidSourceOperand);
            } else if mnemonic == "lea" && source != Some(Direct) {
                violations.push(ErrorCode::InvalidAddressMode);
            }
            if dest.is_none() {
                violations.push(ErrorCode::InvalidDestOperand);
            } else if mnemonic != "cmp" && dest == Some(Immediate) {
                violations.push(ErrorCode::InvalidAddressMode);
            }
        }
        "clr" | "not" | "inc" | "dec" | "red" | "jmp" | "bne" | "jsr" | "prn" => {
            if source.is_some() {
                violations.push(ErrorCode::InvalidSourceOperand);
            }
            match dest {
                None => violations.push(ErrorCode::InvalidDestOperand),
                Some(Immediate) if mnemonic != "prn" => {
                    violations.push(ErrorCode::InvalidAddressMode);
                }
                Some(Direct) if matches!(mnemonic, "jmp" | "bne" | "jsr") => {
                    violations.push(ErrorCode::InvalidAddressMode);
                }
                Some(_) => {}
            }
        }
        "rts" | "stop" => {
            if source.is_some() || dest.is_some() {
                violations.push(ErrorCode::InvalidSourceOperand);
            }
        }
        _ => {}
    }
    violations
}
