//! bibfetch - interactive BibSonomy search and BibTeX append
//!
//! Searches BibSonomy for publications matching a phrase, lists the
//! matches a page at a time, and appends the one you pick to your
//! bibliography file under a fresh citation key.
//!
//! ## Usage
//!
//! ```bash
//! bibfetch
//! ```
//!
//! Configuration lives in `~/.bibfetch`:
//!
//! ```text
//! bib=/home/you/refs.bib
//! bibsonomy_username=you
//! bibsonomy_api_key=xxxx
//! ```

use bibfetch::console::Console;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Search BibSonomy and append a chosen publication to a BibTeX file
#[derive(Parser)]
#[command(name = "bibfetch")]
#[command(version, about, long_about = None)]
struct Cli;

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    // Quiet by default so logs stay out of the prompts; RUST_LOG overrides
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let mut console = Console::stdio();
    if let Err(e) = bibfetch::session::run(&mut console).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
