//! One interactive session, from search prompt to exit.
//!
//! Sequences the pipeline: load config, prompt for a search phrase, fetch
//! matching publications, paginate them, then loop on commands until the
//! user quits or adds a single entry. Data flows one way; only the relist
//! command loops back, re-rendering the list without re-querying.

use crate::bibsonomy::{BibsonomyClient, Publication};
use crate::command::{self, Command};
use crate::config::Config;
use crate::console::Console;
use crate::error::{BibfetchError, Result};
use crate::{append, pager};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

/// Run one interactive session end to end.
///
/// Configuration, bibliography, and credential problems are all fatal
/// before the first prompt appears.
pub async fn run<R, W>(console: &mut Console<R, W>) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let config = Config::load()?;
    let bib_path = config.bib_path()?;
    if !bib_path.exists() {
        return Err(BibfetchError::Config(format!(
            "bibliography {} not found",
            bib_path.display()
        )));
    }
    let (username, api_key) = config.credentials()?;
    let page_height = config.page_height()?;
    let client = BibsonomyClient::new(username, api_key)?;

    info!(bib = %bib_path.display(), "Session starting");

    let query = read_search_query(console)?;
    let publications = client.search_publications(&query).await?;

    interact(console, &publications, &bib_path, page_height)
}

/// Prompt for a search phrase, rejecting empty input
fn read_search_query<R, W>(console: &mut Console<R, W>) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    loop {
        let query = console.prompt("Search: ")?;
        let query = query.trim();
        if query.is_empty() {
            console.error("Empty search string")?;
        } else {
            return Ok(query.to_string());
        }
    }
}

/// Paginate the results and run the command loop until quit or one add
fn interact<R, W>(
    console: &mut Console<R, W>,
    publications: &[Publication],
    bib_path: &Path,
    page_height: usize,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    if publications.is_empty() {
        console.line("No results found")?;
        return Ok(());
    }

    pager::display_results(console, publications, page_height)?;
    command::print_menu(console)?;

    let mut cmd = command::read_command(console, publications.len())?;
    while cmd == Command::Relist {
        pager::display_results(console, publications, page_height)?;
        cmd = command::read_command(console, publications.len())?;
    }

    if let Command::Add(index) = cmd {
        append::add_entry(console, bib_path, &publications[index - 1])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn publication(title: &str) -> Publication {
        Publication {
            title: title.to_string(),
            year: "2020".to_string(),
            author: None,
            journal: None,
            booktitle: None,
            entry_type: "article".to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn run_interact(publications: &[Publication], input: &str) -> (String, String) {
        let file = NamedTempFile::new().expect("temp file");
        let mut output = Vec::new();
        let mut console = Console::new(Cursor::new(input.to_string()), &mut output);

        interact(&mut console, publications, file.path(), 25).expect("interact failed");

        let bib_text = fs::read_to_string(file.path()).expect("read back");
        (String::from_utf8(output).expect("not utf-8"), bib_text)
    }

    #[test]
    fn test_no_results_skips_menu() {
        let (rendered, bib_text) = run_interact(&[], "");
        assert_eq!(rendered, "No results found\n");
        assert!(bib_text.is_empty());
    }

    #[test]
    fn test_relist_then_add_second_result() {
        let publications = vec![publication("First"), publication("Second")];
        let (rendered, bib_text) = run_interact(&publications, "r\na 2\nmykey\n");

        // listed twice, menu shown once
        assert_eq!(rendered.matches("title: First").count(), 2);
        assert_eq!(rendered.matches("Commands:").count(), 1);
        assert!(rendered.contains("Entry to add:"));
        assert!(rendered.contains("Entry added"));

        let entries = bibtex::parse(&bib_text).expect("reparse failed");
        assert_eq!(entries.len(), 1);
        let entry = entries.get("mykey").expect("mykey missing");
        assert_eq!(entry.fields.get("title").map(String::as_str), Some("Second"));
    }

    #[test]
    fn test_out_of_range_index_reprompts() {
        let publications: Vec<_> = ["A", "B", "C"].iter().map(|t| publication(t)).collect();
        let (rendered, bib_text) = run_interact(&publications, "a 5\nq\n");

        assert!(rendered.contains("Error: Out of range: expected integer between 1 and 3"));
        assert_eq!(rendered.matches("Command: ").count(), 2);
        assert!(bib_text.is_empty());
    }

    #[test]
    fn test_quit_adds_nothing() {
        let (rendered, bib_text) = run_interact(&[publication("Only")], "q\n");
        assert!(!rendered.contains("Entry to add:"));
        assert!(bib_text.is_empty());
    }

    #[test]
    fn test_search_prompt_rejects_empty_input() {
        let mut output = Vec::new();
        let mut console = Console::new(Cursor::new("\n   \nquantum physics\n".to_string()), &mut output);

        let query = read_search_query(&mut console).expect("read failed");
        assert_eq!(query, "quantum physics");

        let rendered = String::from_utf8(output).expect("not utf-8");
        assert_eq!(rendered.matches("Search: ").count(), 3);
        assert_eq!(rendered.matches("Error: Empty search string").count(), 2);
    }
}
