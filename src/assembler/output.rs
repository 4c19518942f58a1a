//! Filename preparation and output file generation.
//!
//! One job emits a `.am` listing per source file plus a shared object file
//! (`.ob`), entry file (`.ent`) and external file (`.ext`) named after the
//! combined job base name.

use std::fs;
use std::io;

use super::ExternalUse;
use super::Job;
use super::memory::Memory;
use super::symbols::SymbolTable;

/// Append the `.as` suffix to a source argument that lacks it.
pub fn with_source_suffix(name: &str) -> String {
    if name.ends_with(".as") {
        name.to_string()
    } else {
        format!("{name}.as")
    }
}

/// The `.am` listing path for a source file.
pub fn am_path(source_path: &str) -> String {
    let stem = source_path.strip_suffix(".as").unwrap_or(source_path);
    format!("{stem}.am")
}

/// The shared base name of a job's output files: each source basename with
/// its extension stripped and awkward characters mapped to underscores,
/// joined by underscores.
pub fn job_base_name(paths: &[String]) -> String {
    paths
        .iter()
        .map(|path| {
            let name = path.rsplit('/').next().unwrap_or(path);
            let stem = match name.rfind('.') {
                Some(index) => &name[..index],
                None => name,
            };
            stem.chars()
                .map(|c| match c {
                    ' ' | '/' | '\\' | '.' => '_',
                    other => other,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Remove output files a previous run of this job may have left behind.
pub fn delete_stale_outputs(base: &str, sources: &[String]) {
    for extension in ["ob", "ent", "ext"] {
        let _ = fs::remove_file(format!("{base}.{extension}"));
    }
    for source in sources {
        let _ = fs::remove_file(am_path(source));
    }
}

/// Write one macro-expanded listing.
pub fn write_am_file(path: &str, lines: &[String]) -> io::Result<()> {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text)
}

/// The object file text: a header with the two segment sizes, then every
/// word as `address word` with the address decimal and the word octal.
pub fn render_object(memory: &Memory) -> String {
    let mut text = format!("   {} {}\n", memory.ic, memory.dc);
    for node in memory.instructions.iter().chain(memory.data.iter()) {
        text.push_str(&format!("{:04} {:05o}\n", node.address, node.word));
    }
    text
}

/// The entry file text, or `None` when the job exports nothing.
pub fn render_entries(symbols: &SymbolTable) -> Option<String> {
    let mut text = String::new();
    for symbol in symbols.iter().filter(|symbol| symbol.entry) {
        text.push_str(&format!("{} {:03}\n", symbol.name, symbol.address));
    }
    if text.is_empty() { None } else { Some(text) }
}

/// The external file text, one line per use site, or `None` when no
/// external label is referenced.
pub fn render_externals(uses: &[ExternalUse]) -> Option<String> {
    if uses.is_empty() {
        return None;
    }
    let mut text = String::new();
    for record in uses {
        text.push_str(&format!("{} {:04}\n", record.name, record.address));
    }
    Some(text)
}

/// Write the `.ob`, `.ent` and `.ext` files for a finished job and list the
/// created paths on stdout.
pub fn write_output_files(base: &str, job: &Job, uses: &[ExternalUse]) -> io::Result<()> {
    println!("Created output files:");

    if let Some(text) = render_entries(&job.symbols) {
        let path = format!("{base}.ent");
        fs::write(&path, text)?;
        println!("  Entry file: ./{path}");
    }

    if let Some(text) = render_externals(uses) {
        let path = format!("{base}.ext");
        fs::write(&path, text)?;
        println!("  External file: ./{path}");
    }

    let path = format!("{base}.ob");
    fs::write(&path, render_object(&job.memory))?;
    println!("  Object file: ./{path}");

    Ok(())
}
