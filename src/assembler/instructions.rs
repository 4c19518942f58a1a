//! Encoding of instruction lines into machine words

use super::Job;
use super::errors::ErrorCode;
use super::memory::{
    ARE_ABSOLUTE, ARE_EXTERNAL, ARE_RELOCATABLE, AddressingMode, WORD_MASK, Word, int_to_word,
};
use super::operations;
use super::statement::Statement;
use super::validation;

/// A classified and parsed operand token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand<'a> {
    Immediate(i64),
    Register(u8),
    IndirectRegister(u8),
    Label(&'a str),
}

impl Operand<'_> {
    fn mode(&self) -> AddressingMode {
        match self {
            Operand::Immediate(_) => AddressingMode::Immediate,
            Operand::Register(_) => AddressingMode::DirectRegister,
            Operand::IndirectRegister(_) => AddressingMode::IndirectRegister,
            Operand::Label(_) => AddressingMode::Direct,
        }
    }

    fn register_number(&self) -> Option<u8> {
        match self {
            Operand::Register(number) | Operand::IndirectRegister(number) => Some(*number),
            _ => None,
        }
    }
}

/// Where an operand word sits: register numbers move between bit fields
/// depending on the side they encode.
#[derive(Debug, Clone, Copy)]
enum Role {
    Source,
    Destination,
}

/// Encode one instruction line: the opcode word followed by zero, one or
/// two operand words. A validation failure reports the violation and
/// leaves the instruction stream untouched.
pub fn encode(job: &mut Job, statement: &Statement, mnemonic: &str, operands: &[&str]) {
    let Some(opcode) = operations::opcode(mnemonic) else {
        return;
    };

    let (source_token, dest_token) = match operands {
        [] => (None, None),
        [dest] => (None, Some(*dest)),
        [source, dest] => (Some(*source), Some(*dest)),
        _ => {
            job.errors.add(
                ErrorCode::InvalidInstruction,
                &job.current_file,
                statement.line_number(),
                Some(statement.line()),
            );
            return;
        }
    };

    let mut valid = true;
    let source = source_token.and_then(|token| {
        parse_operand(job, statement, token).or_else(|| {
            valid = false;
            None
        })
    });
    let dest = dest_token.and_then(|token| {
        parse_operand(job, statement, token).or_else(|| {
            valid = false;
            None
        })
    });
    if !valid {
        return;
    }

    let source_mode = source.map(|operand| operand.mode());
    let dest_mode = dest.map(|operand| operand.mode());
    let violations = validation::validate_instruction(mnemonic, source_mode, dest_mode);
    if !violations.is_empty() {
        for code in violations {
            job.errors.add(
                code,
                &job.current_file,
                statement.line_number(),
                Some(statement.line()),
            );
        }
        return;
    }

    let mode_bits = |mode: Option<AddressingMode>| mode.map_or(0, AddressingMode::bits);
    let first_word =
        (opcode << 11) | (mode_bits(source_mode) << 7) | (mode_bits(dest_mode) << 3) | ARE_ABSOLUTE;
    job.memory.write_instruction(first_word, None);

    match (source, dest) {
        (Some(source), Some(dest))
            if source.register_number().is_some() && dest.register_number().is_some() =>
        {
            // both registers share one operand word
            let source_number = source.register_number().unwrap_or(0) as Word;
            let dest_number = dest.register_number().unwrap_or(0) as Word;
            let shared = (source_number << 3) | (dest_number << 6) | ARE_ABSOLUTE;
            job.memory.write_instruction(shared, None);
        }
        (source, dest) => {
            if let Some(operand) = source {
                emit_operand_word(job, statement, operand, Role::Source);
            }
            if let Some(operand) = dest {
                emit_operand_word(job, statement, operand, Role::Destination);
            }
        }
    }
}

/// Classify and parse one operand token, reporting the failure otherwise.
fn parse_operand<'a>(job: &mut Job, statement: &Statement, token: &'a str) -> Option<Operand<'a>> {
    if validation::is_register(token) {
        return Some(Operand::Register(token.as_bytes()[1] - b'0'));
    }
    if validation::is_indirect_register(token) {
        return Some(Operand::IndirectRegister(token.as_bytes()[2] - b'0'));
    }
    if token.starts_with('#') {
        if validation::is_valid_integer(token) {
            if let Ok(value) = token[1..].parse::<i64>() {
                return Some(Operand::Immediate(value));
            }
        }
        job.errors.add(
            ErrorCode::InvalidData,
            &job.current_file,
            statement.line_number(),
            Some(token),
        );
        return None;
    }
    match validation::label_name_error(token, &job.macro_names) {
        None => Some(Operand::Label(token)),
        Some(code) => {
            job.errors
                .add(code, &job.current_file, statement.line_number(), Some(token));
            None
        }
    }
}

/// Emit the extra word one operand occupies.
fn emit_operand_word(job: &mut Job, statement: &Statement, operand: Operand, role: Role) {
    match operand {
        Operand::Immediate(value) => {
            let word = ((int_to_word(value) << 3) & WORD_MASK) | ARE_ABSOLUTE;
            job.memory.write_instruction(word, None);
        }
        Operand::Register(number) | Operand::IndirectRegister(number) => {
            let shift = match role {
                Role::Source => 3,
                Role::Destination => 6,
            };
            let word = ((number as Word) << shift) | ARE_ABSOLUTE;
            job.memory.write_instruction(word, None);
        }
        Operand::Label(name) => {
            // provisional word; the second pass rewrites it entirely
            let word = match job.symbols.find(name) {
                Some(symbol) if symbol.external => ARE_EXTERNAL,
                Some(symbol) if symbol.declared => {
                    ((int_to_word(symbol.address as i64) << 3) & WORD_MASK) | ARE_RELOCATABLE
                }
                Some(_) => ARE_RELOCATABLE,
                None => ARE_EXTERNAL,
            };
            job.symbols
                .reference(name, &job.current_file, statement.line_number());
            job.memory.write_instruction(word, Some(name.to_string()));
        }
    }
}
