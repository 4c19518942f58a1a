//! A two-pass assembler for a 15-bit educational instruction set, featuring:
//! - a `macr`/`endmacr` text-macro pre-processor
//! - sixteen mnemonics over four addressing modes
//! - `.data`, `.string`, `.entry` and `.extern` directives
//! - object, entry and external output files shared across source files

pub mod assembler;
pub mod logging;
