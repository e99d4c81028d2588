//! Paged display of search results.
//!
//! Results print as numbered entries separated by blank lines, pausing for
//! an Enter keypress whenever the next entry would reach the bottom of the
//! page. Entries are never split across a pause: one taller than the page
//! prints whole, after a pause of its own.

use crate::bibsonomy::Publication;
use crate::console::Console;
use crate::error::Result;
use std::io::{BufRead, Write};

/// Page height assumed when the config file does not override it
pub const DEFAULT_PAGE_HEIGHT: usize = 25;

/// Print `publications` as a numbered list, pausing between pages.
///
/// Each entry occupies its field lines plus an index line and a trailing
/// blank line. The pause fires before printing an entry whenever that
/// entry would reach or exceed `page_height` on the current page, which
/// means a first entry taller than the page pauses before any output.
pub fn display_results<R, W>(
    console: &mut Console<R, W>,
    publications: &[Publication],
    page_height: usize,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut lines_printed = 0;

    for (index, publication) in publications.iter().enumerate() {
        let entry_lines = publication.render_lines();
        // index line + field lines + separating blank line
        let entry_height = entry_lines.len() + 2;

        if lines_printed + entry_height >= page_height {
            console.prompt("Press <Enter> to continue")?;
            lines_printed = 0;
        }

        console.line(&format!("{}:", index + 1))?;
        for line in &entry_lines {
            console.line(line)?;
        }
        console.line("")?;
        lines_printed += entry_height;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    /// Three field lines, so five page lines per entry
    fn publication(n: usize) -> Publication {
        Publication {
            title: format!("Title {}", n),
            year: "2020".to_string(),
            author: Some(format!("Author {}", n)),
            journal: None,
            booktitle: None,
            entry_type: "article".to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn run_pager(publications: &[Publication], page_height: usize, input: &str) -> String {
        let mut output = Vec::new();
        let mut console = Console::new(Cursor::new(input.to_string()), &mut output);
        display_results(&mut console, publications, page_height).expect("display failed");
        String::from_utf8(output).expect("not utf-8")
    }

    #[test]
    fn test_single_page_prints_all_entries() {
        let publications: Vec<_> = (1..=3).map(publication).collect();
        let rendered = run_pager(&publications, DEFAULT_PAGE_HEIGHT, "");
        assert_eq!(
            rendered,
            "1:\ntitle: Title 1\nyear: 2020\nauthor: Author 1\n\n\
             2:\ntitle: Title 2\nyear: 2020\nauthor: Author 2\n\n\
             3:\ntitle: Title 3\nyear: 2020\nauthor: Author 3\n\n"
        );
    }

    #[test]
    fn test_pauses_at_page_boundaries() {
        // Five lines per entry: four entries fit, the fifth reaches 25
        let publications: Vec<_> = (1..=10).map(publication).collect();
        let rendered = run_pager(&publications, 25, "\n\n");

        assert_eq!(rendered.matches("Press <Enter> to continue").count(), 2);
        // The pause happens right before entries 5 and 9
        assert!(rendered.contains("Press <Enter> to continue5:"));
        assert!(rendered.contains("Press <Enter> to continue9:"));
    }

    #[test]
    fn test_oversize_entry_pauses_then_prints_whole() {
        let mut tall = publication(1);
        tall.journal = Some("Journal of Long Outputs".to_string());

        let rendered = run_pager(&[tall], 5, "\n");
        assert!(rendered.starts_with("Press <Enter> to continue1:"));
        assert!(rendered.contains("journal: Journal of Long Outputs"));
    }

    #[test]
    fn test_page_line_bound_holds_between_pauses() {
        let publications: Vec<_> = (1..=20).map(publication).collect();
        let rendered = run_pager(&publications, 25, "\n\n\n\n\n");

        for page in rendered.split("Press <Enter> to continue") {
            assert!(page.lines().count() < 25, "page too tall:\n{}", page);
        }
    }

    #[test]
    fn test_no_results_prints_nothing() {
        assert_eq!(run_pager(&[], DEFAULT_PAGE_HEIGHT, ""), "");
    }
}
