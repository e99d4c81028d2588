//! BibSonomy API client.
//!
//! Searches publication posts on the BibSonomy bibliography-sharing
//! service and maps them into [`Publication`] records. The session issues
//! exactly one authenticated GET; a failed search is fatal and the user
//! re-runs the tool (no automatic retries).
//!
//! API details:
//! - Endpoint: `GET /api/posts`
//! - Auth: HTTP Basic with username + API key
//! - `resourcetype=bibtex` selects publication posts
//! - Result window bounded with `start`/`end`

use crate::error::{BibfetchError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// BibSonomy API base URL
pub const DEFAULT_API_BASE: &str = "https://www.bibsonomy.org";

/// Largest result window requested from the service
const MAX_RESULTS: usize = 100;

/// User agent string for requests
const USER_AGENT: &str = "bibfetch/0.1";

/// One publication returned by the search service.
///
/// `title` and `year` are always present; the other bibliographic fields
/// are explicit options or ride along in `extra`. Records are immutable
/// for the rest of the session once the search returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub title: String,
    pub year: String,
    pub author: Option<String>,
    pub journal: Option<String>,
    pub booktitle: Option<String>,
    /// Entry category for the serialized BibTeX entry, e.g. `article`
    pub entry_type: String,
    /// Remaining string-valued fields supplied by the service
    pub extra: BTreeMap<String, String>,
}

impl Publication {
    /// Render the field lines shown to the user: title and year always,
    /// author if present, then journal if present else booktitle (the
    /// latter labeled `book:`).
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("title: {}", self.title),
            format!("year: {}", self.year),
        ];
        if let Some(author) = &self.author {
            lines.push(format!("author: {}", author));
        }
        if let Some(journal) = &self.journal {
            lines.push(format!("journal: {}", journal));
        } else if let Some(booktitle) = &self.booktitle {
            lines.push(format!("book: {}", booktitle));
        }
        lines
    }

    /// All bibliographic fields of this record, named as BibTeX fields.
    ///
    /// The citation key and entry type are not fields; they map to the
    /// entry's dedicated key and type slots instead.
    pub fn bib_fields(&self) -> BTreeMap<String, String> {
        let mut fields = self.extra.clone();
        fields.insert("title".to_string(), self.title.clone());
        fields.insert("year".to_string(), self.year.clone());
        if let Some(author) = &self.author {
            fields.insert("author".to_string(), author.clone());
        }
        if let Some(journal) = &self.journal {
            fields.insert("journal".to_string(), journal.clone());
        }
        if let Some(booktitle) = &self.booktitle {
            fields.insert("booktitle".to_string(), booktitle.clone());
        }
        fields
    }
}

/// BibSonomy REST client for publication search
pub struct BibsonomyClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    api_key: String,
}

impl BibsonomyClient {
    /// Create a client for the public BibSonomy instance
    pub fn new(username: &str, api_key: &str) -> Result<Self> {
        Self::with_base_url(username, api_key, DEFAULT_API_BASE)
    }

    /// Create a client against a different instance (mirrors, tests)
    pub fn with_base_url(username: &str, api_key: &str, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BibfetchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Search publication posts matching `query`.
    ///
    /// The query is wrapped in double quotes so the service performs an
    /// exact-phrase search, as the interactive prompt has always promised.
    ///
    /// # Errors
    ///
    /// Network failures, non-success HTTP statuses, and service-level
    /// `stat: fail` responses are all fatal.
    pub async fn search_publications(&self, query: &str) -> Result<Vec<Publication>> {
        let url = build_search_url(&self.base_url, query)?;

        info!(query = query, "Starting BibSonomy search");
        debug!(url = %url, "Fetching posts");

        let response = self
            .client
            .get(url.as_str())
            .basic_auth(&self.username, Some(&self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BibfetchError::Api {
                code: status.as_u16() as i32,
                message: service_error_text(&body)
                    .unwrap_or_else(|| format!("BibSonomy API error: {}", status)),
            });
        }

        let body = response.text().await?;
        let publications = parse_response(&body)?;
        info!(count = publications.len(), "Search complete");
        Ok(publications)
    }
}

/// Build the posts search URL. Credentials travel in the auth header, not
/// the URL.
fn build_search_url(base_url: &str, query: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/api/posts", base_url))
        .map_err(|e| BibfetchError::Config(format!("Invalid API base URL: {}", e)))?;

    {
        let mut params = url.query_pairs_mut();
        params.append_pair("format", "json");
        params.append_pair("resourcetype", "bibtex");
        params.append_pair("search", &format!("\"{}\"", query));
        params.append_pair("start", "0");
        params.append_pair("end", &MAX_RESULTS.to_string());
    }

    Ok(url)
}

// === BibSonomy API Response Types ===

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    stat: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    posts: Option<PostList>,
}

#[derive(Debug, Deserialize)]
struct PostList {
    #[serde(default)]
    post: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    bibtex: Option<BibtexResource>,
}

#[derive(Debug, Deserialize)]
struct BibtexResource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    journal: Option<String>,
    #[serde(default)]
    booktitle: Option<String>,
    #[serde(rename = "entrytype", default)]
    entry_type: Option<String>,
    /// The poster's own key; never reused, the user picks a fresh one
    #[serde(rename = "bibtexKey", default)]
    #[allow(dead_code)]
    bibtex_key: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Extract the `error` text from a failure body, if it is one
fn service_error_text(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.error)
}

/// Parse a BibSonomy posts response into publication records
fn parse_response(json_str: &str) -> Result<Vec<Publication>> {
    let response: PostsResponse = serde_json::from_str(json_str)?;

    if response.stat.as_deref() == Some("fail") {
        return Err(BibfetchError::Api {
            code: 0,
            message: response
                .error
                .unwrap_or_else(|| "unknown service error".to_string()),
        });
    }

    let posts = response.posts.map(|p| p.post).unwrap_or_default();
    let mut publications = Vec::new();

    for post in posts {
        let bib = match post.bibtex {
            Some(b) => b,
            None => continue,
        };
        match publication_from_resource(bib) {
            Some(publication) => publications.push(publication),
            None => debug!("Skipping post without title or year"),
        }
    }

    Ok(publications)
}

/// Map an API bibtex resource into a `Publication`.
///
/// Returns `None` when the required title or year is missing (empty
/// strings count as missing). Service bookkeeping fields never become
/// bibliographic fields.
fn publication_from_resource(bib: BibtexResource) -> Option<Publication> {
    let title = non_empty(bib.title)?;
    let year = non_empty(bib.year)?;

    let mut extra = BTreeMap::new();
    for (name, value) in bib.extra {
        if matches!(name.as_str(), "interhash" | "intrahash" | "href") {
            continue;
        }
        if let serde_json::Value::String(s) = value {
            if !s.is_empty() {
                let name = match name.as_str() {
                    "bibtexAbstract" => "abstract".to_string(),
                    _ => name.to_lowercase(),
                };
                extra.insert(name, s);
            }
        }
    }

    Some(Publication {
        title,
        year,
        author: non_empty(bib.author),
        journal: non_empty(bib.journal),
        booktitle: non_empty(bib.booktitle),
        entry_type: non_empty(bib.entry_type).unwrap_or_else(|| "misc".to_string()),
        extra,
    })
}

/// Treat empty strings from the service as absent values
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
