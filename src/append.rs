//! Appending a selected publication to the bibliography file.
//!
//! The append is gated on a citation key the user confirms interactively:
//! the key must be syntactically valid and must not collide with any key
//! already in the file. Only the new entry is serialized; existing entries
//! are never rewritten or reformatted.

use crate::bibsonomy::Publication;
use crate::bibtex::{self, BibEntry};
use crate::console::Console;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, Read, Write};
use std::path::Path;
use tracing::debug;

/// Append `publication` to the bibliography under a user-confirmed key.
///
/// The file is opened once in read+append mode; the same handle spans
/// reading the existing entries, validating the new key against them, and
/// appending the serialized entry. External edits between the read and the
/// append remain possible; this is a single-user tool and that window is a
/// known limitation.
///
/// # Errors
///
/// Unreadable or unparsable bibliography text is fatal, since key
/// uniqueness cannot be verified against it. No write happens in that
/// case.
pub fn add_entry<R, W>(
    console: &mut Console<R, W>,
    bib_path: &Path,
    publication: &Publication,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut file = OpenOptions::new().read(true).append(true).open(bib_path)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    let existing = bibtex::parse(&text)?;

    console.line("")?;
    console.line("Entry to add:")?;
    for line in publication.render_lines() {
        console.line(&line)?;
    }
    console.line("")?;

    let key = read_new_key(console, &existing)?;
    debug!(key = %key, "Appending entry");

    let entry = BibEntry {
        key,
        entry_type: publication.entry_type.clone(),
        fields: publication.bib_fields(),
    };

    let mut serialized = entry.to_bibtex();
    // keep the new entry off the tail of an unterminated last line
    if !text.is_empty() && !text.ends_with('\n') {
        serialized.insert(0, '\n');
    }
    file.write_all(serialized.as_bytes())?;

    console.line("Entry added")?;
    Ok(())
}

/// Prompt for a citation key until one is syntactically valid and unused
fn read_new_key<R, W>(
    console: &mut Console<R, W>,
    existing: &BTreeMap<String, BibEntry>,
) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    loop {
        let key = console.prompt("New BibTex Key: ")?.trim().to_string();
        if !bibtex::is_valid_key(&key) {
            console.error("Invalid BibTex key")?;
        } else if existing.contains_key(&key) {
            console.error("That BibTex key already exists in bibliography")?;
        } else {
            return Ok(key);
        }
    }
}
