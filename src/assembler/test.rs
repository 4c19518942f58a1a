//! Whole-pipeline tests: preprocess, both passes and relocation over
//! in-memory sources, checked against hand-assembled words.

use super::*;
use memory::{ARE_ABSOLUTE, MemoryNode, Word};

/// Run a full job over one in-memory source file.
fn assemble_source(source: &str) -> (Job, Vec<ExternalUse>) {
    assemble_sources(&[source])
}

/// Run a full job over several in-memory source files.
fn assemble_sources(sources: &[&str]) -> (Job, Vec<ExternalUse>) {
    let mut job = Job::new();
    let mut listings = Vec::new();
    for (index, source) in sources.iter().enumerate() {
        let name = format!("test{index}.as");
        let lines = preprocessor::preprocess(source, &name, &mut job.errors, &mut job.macro_names);
        listings.push(lines);
    }
    for (index, lines) in listings.iter().enumerate() {
        first_pass(&mut job, &format!("test{index}.am"), lines);
    }
    relocate(&mut job);
    let uses = resolve_references(&mut job);
    cross_check_symbols(&mut job);
    (job, uses)
}

fn words(nodes: &[MemoryNode]) -> Vec<Word> {
    nodes.iter().map(|node| node.word).collect()
}

#[test]
fn register_to_label_move() {
    let source = "MAIN: mov r3, LENGTH\nstop\nLENGTH: .data 7";
    let (job, uses) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    // opcode word, source register word, label word, stop word
    assert_eq!(job.memory.ic, 4);
    assert_eq!(job.memory.dc, 1);
    let expected = vec![
        (0 << 11) | (8 << 7) | (2 << 3) | ARE_ABSOLUTE,
        (3 << 3) | ARE_ABSOLUTE,
        (104 << 3) | ARE_RELOCATABLE,
        (15 << 11) | ARE_ABSOLUTE,
    ];
    assert_eq!(words(&job.memory.instructions), expected);

    let addresses: Vec<u16> = job.memory.instructions.iter().map(|n| n.address).collect();
    assert_eq!(addresses, vec![100, 101, 102, 103]);
    assert_eq!(job.memory.data[0].address, 104);
    assert_eq!(job.memory.data[0].word, 7);
    assert!(uses.is_empty());
}

#[test]
fn external_reference_records_each_use_site() {
    let source = ".extern EXT\nmov EXT, r1";
    let (job, uses) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    assert_eq!(job.memory.ic, 3);
    // the external word keeps zero address bits and the E tag
    assert_eq!(job.memory.instructions[1].word, ARE_EXTERNAL);
    assert_eq!(job.memory.instructions[1].address, 101);
    assert_eq!(
        uses,
        vec![ExternalUse {
            name: "EXT".to_string(),
            address: 101,
        }]
    );
    // destination register word sits in the destination field
    assert_eq!(job.memory.instructions[2].word, (1 << 6) | ARE_ABSOLUTE);
}

#[test]
fn entry_data_label_relocates_to_the_origin() {
    let source = ".entry E\nE: .data 5";
    let (job, _) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    assert_eq!(job.memory.ic, 0);
    assert_eq!(job.memory.dc, 1);
    let symbol = job.symbols.find("E").expect("symbol missing");
    assert!(symbol.entry && symbol.declared);
    assert_eq!(symbol.address, 100);
    assert_eq!(output::render_entries(&job.symbols), Some("E 100\n".to_string()));
    assert_eq!(output::render_object(&job.memory), "   0 1\n0100 00005\n");
}

#[test]
fn macro_body_assembles_at_the_call_site() {
    let source = "macr GREET\nmov r1,r2\nendmacr\nGREET\nstop";
    let (job, _) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    // mov opcode word + shared register word + stop word
    assert_eq!(job.memory.ic, 3);
    let expected = vec![
        (0 << 11) | (8 << 7) | (8 << 3) | ARE_ABSOLUTE,
        (1 << 3) | (2 << 6) | ARE_ABSOLUTE,
        (15 << 11) | ARE_ABSOLUTE,
    ];
    assert_eq!(words(&job.memory.instructions), expected);
}

#[test]
fn lea_with_immediate_source_is_rejected() {
    let (job, _) = assemble_source("lea #5, r1");
    let codes: Vec<ErrorCode> = job.errors.records().iter().map(|r| r.code).collect();
    assert_eq!(codes, vec![ErrorCode::InvalidAddressMode]);
    assert_eq!(job.memory.ic, 0);
}

#[test]
fn double_declaration_is_rejected() {
    let (job, _) = assemble_source("A: .data 1\nA: .data 2");
    assert_eq!(job.errors.records()[0].code, ErrorCode::LabelAlreadyDeclared);
}

#[test]
fn undeclared_label_is_reported_after_the_second_pass() {
    let (job, _) = assemble_source("jsr *r1\nmov MISSING, r2");
    let codes: Vec<ErrorCode> = job.errors.records().iter().map(|r| r.code).collect();
    assert_eq!(codes, vec![ErrorCode::LabelNotDeclared]);
}

#[test]
fn label_declared_across_files_resolves() {
    let (job, uses) = assemble_sources(&["mov r1, SHARED\nstop", "SHARED: .data 9"]);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    // SHARED sits right after the 4 instruction words
    let symbol = job.symbols.find("SHARED").expect("symbol missing");
    assert_eq!(symbol.address, 104);
    assert_eq!(
        job.memory.instructions[2].word,
        (104 << 3) | ARE_RELOCATABLE
    );
    assert!(uses.is_empty());
}

#[test]
fn entry_on_external_label_is_rejected() {
    let (job, _) = assemble_source(".extern X\n.entry X\nmov X, r1");
    let codes: Vec<ErrorCode> = job.errors.records().iter().map(|r| r.code).collect();
    assert!(codes.contains(&ErrorCode::LabelAlreadyDeclared));
    assert!(codes.contains(&ErrorCode::EntryLabelExternal));
}

#[test]
fn declared_extern_is_rejected() {
    let (job, _) = assemble_source(".extern X\nX: .data 1");
    let codes: Vec<ErrorCode> = job.errors.records().iter().map(|r| r.code).collect();
    assert!(codes.contains(&ErrorCode::LabelDeclaredAsExternal));
}

#[test]
fn every_word_fits_fifteen_bits() {
    let source = "MAIN: add #-1, r7\ncmp *r3, #16383\nprn #-16384\nstop\nVALS: .data 16383, -16384, -1\nSTR: .string \"ab\"";
    let (job, _) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());
    for node in job.memory.instructions.iter().chain(job.memory.data.iter()) {
        assert!(node.word <= WORD_MASK);
    }
}

#[test]
fn segments_occupy_disjoint_address_ranges() {
    let source = "mov #3, r1\nstop\nD: .data 1, 2, 3";
    let (job, _) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    let ic = job.memory.ic;
    let dc = job.memory.dc;
    for node in &job.memory.instructions {
        assert!((100..100 + ic).contains(&node.address));
    }
    for node in &job.memory.data {
        assert!((100 + ic..100 + ic + dc).contains(&node.address));
    }
    let object = output::render_object(&job.memory);
    assert_eq!(object.lines().count(), 1 + ic as usize + dc as usize);
}

#[test]
fn string_directive_emits_bytes_and_terminator() {
    let (job, _) = assemble_source("S: .string \"ab\"");
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());
    assert_eq!(words(&job.memory.data), vec![b'a' as Word, b'b' as Word, 0]);
}

#[test]
fn data_list_keeps_going_past_a_bad_value() {
    let (job, _) = assemble_source("D: .data 1, x, 3");
    assert_eq!(job.errors.records()[0].code, ErrorCode::InvalidData);
    assert_eq!(words(&job.memory.data), vec![1, 3]);
}

#[test]
fn immediate_and_two_labels_lay_out_source_then_destination() {
    let source = ".extern IN\nlea IN, r2\nLOCAL: .data 2\ncmp LOCAL, #-2";
    let (job, uses) = assemble_source(source);
    assert!(!job.errors.has_errors(), "{:?}", job.errors.records());

    // lea opcode, IN word, r2 word, cmp opcode, LOCAL word, immediate word
    assert_eq!(job.memory.ic, 6);
    assert_eq!(job.memory.instructions[1].word, ARE_EXTERNAL);
    assert_eq!(
        uses,
        vec![ExternalUse {
            name: "IN".to_string(),
            address: 101,
        }]
    );
    assert_eq!(
        job.memory.instructions[4].word,
        (106 << 3) | ARE_RELOCATABLE
    );
    let minus_two = int_to_word(-2);
    assert_eq!(
        job.memory.instructions[5].word,
        ((minus_two << 3) & WORD_MASK) | ARE_ABSOLUTE
    );
}

#[test]
fn macro_name_cannot_be_reused_as_a_label() {
    let source = "macr SETUP\nclr r1\nendmacr\nSETUP: .data 1";
    let (job, _) = assemble_source(source);
    let codes: Vec<ErrorCode> = job.errors.records().iter().map(|r| r.code).collect();
    assert!(codes.contains(&ErrorCode::LabelNameUsedAsMacro));
}
