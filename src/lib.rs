//! # bibfetch
//!
//! Interactive BibSonomy search with append-to-bibliography.
//!
//! ## Modules
//!
//! - [`bibsonomy`] - BibSonomy REST API client
//! - [`bibtex`] - BibTeX parsing and serialization
//! - [`pager`] - Paged result display
//! - [`command`] - Interactive command parsing
//! - [`append`] - Bibliography append with key confirmation
//! - [`session`] - One interactive session end to end
//! - [`config`] - `~/.bibfetch` configuration
//! - [`console`] - Prompt/response terminal IO
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bibfetch::console::Console;
//!
//! #[tokio::main]
//! async fn main() -> bibfetch::Result<()> {
//!     let mut console = Console::stdio();
//!     bibfetch::session::run(&mut console).await
//! }
//! ```

pub mod append;
pub mod bibsonomy;
pub mod bibtex;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod pager;
pub mod session;

pub use error::{BibfetchError, Result};
