use std::{env, process};

use asm15::assembler;
use asm15::assembler::output;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <source.as> [<source.as> ...]", args[0]);
        process::exit(1);
    }

    let paths: Vec<String> = args[1..]
        .iter()
        .map(|arg| output::with_source_suffix(arg))
        .collect();

    if !assembler::assemble_files(&paths) {
        process::exit(1);
    }
}
