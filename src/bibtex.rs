//! BibTeX parsing and serialization.
//!
//! The appender needs exactly two format operations: parsing an existing
//! bibliography into a map keyed by citation key (so uniqueness can be
//! verified), and serializing one new entry for appending. A record looks
//! like `@type{key, field = {value}, ...}`; values may be braced (nesting
//! respected), quoted, or bare tokens, optionally joined with `#`. Free
//! text between records is commentary and ignored, as are `@comment`,
//! `@preamble` and `@string` blocks. Anything structurally broken inside a
//! record is a fatal error: an unparsable bibliography cannot be checked
//! for key collisions.

use crate::error::{BibfetchError, Result};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One bibliography entry: citation key, entry type, and field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Citation key naming the entry within the file
    pub key: String,
    /// Entry category, e.g. `article` or `book`
    pub entry_type: String,
    /// Field name (lowercased) to value
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    /// Serialize this entry as BibTeX text suitable for appending to a
    /// bibliography file.
    ///
    /// Fields are emitted one per line in name order, values braced, with
    /// a blank separator line after the closing brace:
    ///
    /// ```text
    /// @article{smith2020,
    ///   title = {On Things},
    ///   year = {2020}
    /// }
    /// ```
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{}", self.entry_type, self.key);
        for (name, value) in &self.fields {
            out.push_str(&format!(",\n  {} = {{{}}}", name, value));
        }
        out.push_str("\n}\n\n");
        out
    }
}

/// Check a candidate citation key: one or more characters, none of which
/// is `{`, `}` or `,`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(|c| c == '{' || c == '}' || c == ',')
}

/// Parse bibliography text into a map from citation key to entry.
///
/// Empty input yields an empty map. A duplicate key keeps the first
/// occurrence and logs a warning; the file invariant is that keys are
/// pairwise distinct, and either occurrence would trip the collision
/// check the same way.
pub fn parse(text: &str) -> Result<BTreeMap<String, BibEntry>> {
    let mut entries = BTreeMap::new();
    let mut parser = Parser::new(text);

    while let Some(entry) = parser.next_entry()? {
        if entries.contains_key(&entry.key) {
            warn!(key = %entry.key, "Duplicate citation key in bibliography, keeping first occurrence");
        } else {
            entries.insert(entry.key.clone(), entry);
        }
    }

    debug!(count = entries.len(), "Parsed bibliography");
    Ok(entries)
}

/// Character scanner over the bibliography text
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// Produce the next record, or `None` once input is exhausted.
    fn next_entry(&mut self) -> Result<Option<BibEntry>> {
        loop {
            // Everything outside a record is commentary.
            if !self.skip_to_record() {
                return Ok(None);
            }
            self.pos += 1; // consume '@'
            self.skip_ws();

            let entry_type = self.ident().to_lowercase();
            if entry_type.is_empty() {
                return Err(self.fail("expected entry type after '@'"));
            }

            self.skip_ws();
            let close = match self.peek() {
                Some('{') => '}',
                Some('(') => ')',
                _ => return Err(self.fail(&format!("expected '{{' after '@{}'", entry_type))),
            };
            self.pos += 1;

            // Blocks without a citation key are skipped wholesale.
            if matches!(entry_type.as_str(), "comment" | "preamble" | "string") {
                self.skip_balanced(close)?;
                continue;
            }

            return self.record_body(entry_type, close).map(Some);
        }
    }

    /// Parse `key, field = value, ...` up to the record's closing delimiter.
    fn record_body(&mut self, entry_type: String, close: char) -> Result<BibEntry> {
        self.skip_ws();

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == close {
                break;
            }
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err(self.fail("unterminated entry"));
        }
        let key: String = self.chars[start..self.pos].iter().collect();
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(self.fail("entry is missing a citation key"));
        }

        let mut fields = BTreeMap::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some(',') => {
                    self.pos += 1;
                    self.skip_ws();
                    // Trailing comma before the closer is accepted.
                    if self.peek() == Some(close) {
                        self.pos += 1;
                        break;
                    }

                    let name = self.ident().to_lowercase();
                    if name.is_empty() {
                        return Err(self.fail(&format!("expected field name in entry '{}'", key)));
                    }
                    self.skip_ws();
                    if self.peek() != Some('=') {
                        return Err(self.fail(&format!(
                            "expected '=' after field '{}' in entry '{}'",
                            name, key
                        )));
                    }
                    self.pos += 1;
                    self.skip_ws();

                    let value = self.field_value(&key, &name, close)?;
                    fields.insert(name, value);
                }
                Some(_) => {
                    return Err(self.fail(&format!(
                        "expected ',' or '{}' in entry '{}'",
                        close, key
                    )));
                }
                None => return Err(self.fail(&format!("unterminated entry '{}'", key))),
            }
        }

        Ok(BibEntry {
            key,
            entry_type,
            fields,
        })
    }

    /// Parse a field value: one or more pieces joined with `#`.
    fn field_value(&mut self, key: &str, name: &str, close: char) -> Result<String> {
        let mut value = self.value_piece(key, name, close)?;
        loop {
            self.skip_ws();
            if self.peek() == Some('#') {
                self.pos += 1;
                self.skip_ws();
                value.push_str(&self.value_piece(key, name, close)?);
            } else {
                return Ok(value);
            }
        }
    }

    /// One value piece: `{braced}`, `"quoted"`, or a bare token.
    fn value_piece(&mut self, key: &str, name: &str, close: char) -> Result<String> {
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                let mut depth = 1usize;
                let mut piece = String::new();
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                return Ok(piece);
                            }
                        }
                        _ => {}
                    }
                    piece.push(c);
                }
                Err(self.fail(&format!(
                    "unbalanced braces in field '{}' of entry '{}'",
                    name, key
                )))
            }
            Some('"') => {
                self.pos += 1;
                let mut depth = 0usize;
                let mut piece = String::new();
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    match c {
                        '{' => depth += 1,
                        '}' => depth = depth.saturating_sub(1),
                        // A quote inside braces is literal text.
                        '"' if depth == 0 => return Ok(piece),
                        _ => {}
                    }
                    piece.push(c);
                }
                Err(self.fail(&format!(
                    "unterminated quoted value in field '{}' of entry '{}'",
                    name, key
                )))
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == ',' || c == close || c == '#' {
                        break;
                    }
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err(self.fail(&format!(
                        "missing value for field '{}' in entry '{}'",
                        name, key
                    )));
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
        }
    }

    /// Advance to the next `@`; false once input is exhausted.
    fn skip_to_record(&mut self) -> bool {
        while let Some(c) = self.peek() {
            if c == '@' {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    /// Consume a balanced block whose opener has already been consumed.
    fn skip_balanced(&mut self, close: char) -> Result<()> {
        let open = if close == '}' { '{' } else { '(' };
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(self.fail("unterminated block"))
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+') {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn fail(&self, msg: &str) -> BibfetchError {
        let line = self.chars[..self.pos.min(self.chars.len())]
            .iter()
            .filter(|c| **c == '\n')
            .count()
            + 1;
        BibfetchError::Bibtex(format!("{} (line {})", msg, line))
    }
}
