//! Resource Type Catalog
//!
//! Paginated listing of resource type names used to build the allow-list
//! given to the model and to the template structure gate. The listing is
//! drained completely before use; a partial list is never returned.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Errors from catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog program not found: {0}")]
    ProgramNotFound(String),

    #[error("Catalog command failed: {0}")]
    Command(String),

    #[error("Catalog request timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to parse catalog page: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pagination token repeated: {0}")]
    RepeatedToken(String),

    #[error("Catalog exceeded {0} pages")]
    TooManyPages(usize),
}

/// One page of type names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub type_names: Vec<String>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait ResourceTypeCatalog: Send + Sync {
    /// Fetch the page after `next_token` (the first page when `None`)
    async fn list_page(&self, next_token: Option<&str>) -> Result<CatalogPage, CatalogError>;
}

/// `cloudformation list-types` response shape
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListTypesResponse {
    #[serde(default)]
    type_summaries: Vec<TypeSummary>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TypeSummary {
    type_name: String,
}

impl From<ListTypesResponse> for CatalogPage {
    fn from(response: ListTypesResponse) -> Self {
        CatalogPage {
            type_names: response
                .type_summaries
                .into_iter()
                .map(|s| s.type_name)
                .collect(),
            next_token: response.next_token.filter(|t| !t.is_empty()),
        }
    }
}

fn parse_list_types(raw: &str) -> Result<CatalogPage, CatalogError> {
    serde_json::from_str::<ListTypesResponse>(raw)
        .map(CatalogPage::from)
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

/// Public types listed through the `aws` CLI
#[derive(Debug, Clone)]
pub struct CliCatalog {
    program: String,
    timeout_secs: u64,
}

impl CliCatalog {
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            timeout_secs,
        }
    }

    fn args(next_token: Option<&str>) -> Vec<String> {
        let mut args: Vec<String> = [
            "cloudformation",
            "list-types",
            "--visibility",
            "PUBLIC",
            "--no-paginate",
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        if let Some(token) = next_token {
            args.push("--next-token".to_string());
            args.push(token.to_string());
        }
        args
    }
}

#[async_trait]
impl ResourceTypeCatalog for CliCatalog {
    async fn list_page(&self, next_token: Option<&str>) -> Result<CatalogPage, CatalogError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::args(next_token))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(Duration::from_secs(self.timeout_secs), cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::ProgramNotFound(self.program.clone()))
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(CatalogError::Timeout(self.timeout_secs)),
        };

        if !output.status.success() {
            return Err(CatalogError::Command(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        parse_list_types(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Catalog snapshot stored as JSON: either an array of names or a
/// `list-types` response. Always a single page.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResourceTypeCatalog for FileCatalog {
    async fn list_page(&self, _next_token: Option<&str>) -> Result<CatalogPage, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        if let Ok(names) = serde_json::from_str::<Vec<String>>(&raw) {
            return Ok(CatalogPage {
                type_names: names,
                next_token: None,
            });
        }
        let mut page = parse_list_types(&raw)?;
        page.next_token = None;
        Ok(page)
    }
}

/// Follow continuation tokens until the listing is exhausted.
pub async fn drain_catalog(
    catalog: &dyn ResourceTypeCatalog,
    max_pages: usize,
) -> Result<Vec<String>, CatalogError> {
    let mut names = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if pages >= max_pages {
            return Err(CatalogError::TooManyPages(max_pages));
        }
        let page = catalog.list_page(next_token.as_deref()).await?;
        pages += 1;
        names.extend(page.type_names);

        match page.next_token {
            Some(token) => {
                if !seen_tokens.insert(token.clone()) {
                    return Err(CatalogError::RepeatedToken(token));
                }
                next_token = Some(token);
            }
            None => break,
        }
    }

    tracing::info!(pages, types = names.len(), "catalog: drained");
    Ok(names)
}

/// Keep names starting with `prefix`, first occurrence order, no duplicates.
pub fn allow_list<I>(names: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
