//! Configuration loading for bibfetch.
//!
//! Settings live in `~/.bibfetch`, a line-oriented `key=value` file.
//! Blank lines and lines starting with `#` are ignored; every other line
//! must contain at least one `=`. The first `=` splits key from value
//! (both trimmed), so values may themselves contain `=`.
//!
//! Required keys:
//! - `bib` - path to the BibTeX bibliography file
//! - `bibsonomy_username` / `bibsonomy_api_key` - service credentials
//!
//! Optional keys:
//! - `page_height` - terminal lines per result page (default 25)

use crate::error::{BibfetchError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration file name in the user's home directory
pub const CONFIG_FILE_NAME: &str = ".bibfetch";

/// Default configuration path: `~/.bibfetch`
fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(CONFIG_FILE_NAME))
        .ok_or_else(|| BibfetchError::Config("Cannot determine home directory".to_string()))
}

/// Loaded configuration: a read-only key/value map plus validated accessors.
#[derive(Debug, Clone)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load configuration from the default path (`~/.bibfetch`)
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path()?)
    }

    /// Load configuration from an explicit path
    ///
    /// Returns a fatal `Config` error if the file is missing or any
    /// non-comment line lacks an `=`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BibfetchError::Config("config file not found".to_string()));
        }

        let text = std::fs::read_to_string(path)?;
        let values = parse_config(&text)?;
        info!(path = %path.display(), keys = values.len(), "Loaded configuration");
        Ok(Self { values })
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Path to the bibliography file (required key `bib`)
    pub fn bib_path(&self) -> Result<PathBuf> {
        self.get("bib").map(PathBuf::from).ok_or_else(|| {
            BibfetchError::Config("bibliography not specified in config file".to_string())
        })
    }

    /// BibSonomy credentials as `(username, api_key)`
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.get("bibsonomy_username"), self.get("bibsonomy_api_key")) {
            (Some(user), Some(key)) => Ok((user, key)),
            _ => Err(BibfetchError::Config(
                "bibsonomy username or api key not in config file".to_string(),
            )),
        }
    }

    /// Result-page height in terminal lines (optional key `page_height`)
    pub fn page_height(&self) -> Result<usize> {
        match self.get("page_height") {
            None => Ok(crate::pager::DEFAULT_PAGE_HEIGHT),
            Some(raw) => match raw.parse::<usize>() {
                Ok(height) if height >= 1 => Ok(height),
                _ => Err(BibfetchError::Config(format!(
                    "page_height must be a positive integer, got '{}'",
                    raw
                ))),
            },
        }
    }
}

/// Parse configuration text into a key/value map
///
/// A line without `=` is a fatal error naming the 1-based line number.
fn parse_config(text: &str) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();

        // Ignore blank lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                return Err(BibfetchError::Config(format!(
                    "error parsing configuration file at line {}",
                    idx + 1
                )));
            }
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_from(text: &str) -> Config {
        Config {
            values: parse_config(text).expect("config should parse"),
        }
    }

    #[test]
    fn test_parse_basic() {
        let values = parse_config("bib = /home/u/refs.bib\nbibsonomy_username=alice\n")
            .expect("parse failed");
        assert_eq!(values.get("bib").map(String::as_str), Some("/home/u/refs.bib"));
        assert_eq!(values.get("bibsonomy_username").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_parse_value_containing_equals() {
        let values = parse_config("bibsonomy_api_key = abc=def==\n").expect("parse failed");
        assert_eq!(
            values.get("bibsonomy_api_key").map(String::as_str),
            Some("abc=def==")
        );
    }

    #[test]
    fn test_parse_ignores_comments_and_blanks() {
        let values = parse_config("# a comment\n\n   \nbib=x.bib\n").expect("parse failed");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_parse_malformed_line_reports_line_number() {
        let err = parse_config("bib=x.bib\n# fine\nnot a config line\n")
            .expect_err("should reject line without '='");
        assert!(err.to_string().contains("line 3"), "got: {}", err);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/.bibfetch"))
            .expect_err("should fail on missing file");
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "bib = refs.bib")?;
        writeln!(temp, "bibsonomy_username = alice")?;
        writeln!(temp, "bibsonomy_api_key = s3cret")?;

        let config = Config::load_from(temp.path())?;
        assert_eq!(config.bib_path()?, PathBuf::from("refs.bib"));
        assert_eq!(config.credentials()?, ("alice", "s3cret"));
        Ok(())
    }

    #[test]
    fn test_missing_bib_key() {
        let config = config_from("bibsonomy_username=a\nbibsonomy_api_key=b\n");
        let err = config.bib_path().expect_err("bib should be required");
        assert!(err.to_string().contains("bibliography not specified"));
    }

    #[test]
    fn test_missing_credentials() {
        let config = config_from("bib=x.bib\nbibsonomy_username=a\n");
        let err = config.credentials().expect_err("api key should be required");
        assert!(err.to_string().contains("username or api key"));
    }

    #[test]
    fn test_page_height_default_and_override() {
        assert_eq!(
            config_from("bib=x.bib").page_height().expect("default"),
            crate::pager::DEFAULT_PAGE_HEIGHT
        );
        assert_eq!(
            config_from("page_height = 40").page_height().expect("custom"),
            40
        );
    }

    #[test]
    fn test_page_height_rejects_invalid() {
        assert!(config_from("page_height = 0").page_height().is_err());
        assert!(config_from("page_height = ten").page_height().is_err());
    }
}
