//! Organization repository enumeration.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, SyncError};
use crate::github::{GitHubClient, SearchQuery};

/// Smallest page size accepted by the search API.
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest page size accepted by the search API.
pub const MAX_PAGE_SIZE: u32 = 100;

/// The minimal record identifying one repository to synchronize.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_empty: bool,
}

impl RepositoryDescriptor {
    pub fn new(name: impl Into<String>, is_empty: bool) -> Self {
        Self {
            name: name.into(),
            is_empty,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Total number of repositories matching the query, across all pages.
    pub repository_count: usize,
    /// Resume position for the next page; empty when there are no more pages.
    pub end_cursor: String,
    pub repositories: Vec<RepositoryDescriptor>,
}

/// A source of paginated repository search results.
#[async_trait]
pub trait SearchPages: Send + Sync {
    /// Fetch up to `first` repositories matching `query`, starting after `after`.
    async fn search_page(
        &self,
        query: &SearchQuery,
        first: u32,
        after: Option<&str>,
    ) -> Result<SearchPage>;
}

/// Return every repository of `organization` matching `filter`, in API order.
///
/// Any page failure aborts the whole listing: a truncated list is never
/// returned.
pub async fn enumerate_org_repos<S: SearchPages + ?Sized>(
    source: &S,
    organization: &str,
    filter: &str,
    page_size: u32,
) -> Result<Vec<RepositoryDescriptor>> {
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(SyncError::Validation(format!(
            "invalid batch size ({}); must be between {} and {}",
            page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
        )));
    }

    let query = SearchQuery::new(organization, filter);
    tracing::debug!(query = %query, page_size, "Enumerating organization repositories");

    let first = fetch_page(source, &query, page_size, None, 1).await?;
    let total = first.repository_count;
    let mut repositories = first.repositories;
    repositories.reserve(total.saturating_sub(repositories.len()));

    if total > page_size as usize {
        let mut cursor = first.end_cursor;
        let mut page_number = 1;
        while !cursor.is_empty() {
            page_number += 1;
            let page = fetch_page(source, &query, page_size, Some(&cursor), page_number).await?;
            if page.repositories.is_empty() {
                break;
            }
            repositories.extend(page.repositories);
            cursor = page.end_cursor;
        }
    }

    tracing::debug!(found = repositories.len(), reported = total, "Enumeration complete");
    Ok(repositories)
}

async fn fetch_page<S: SearchPages + ?Sized>(
    source: &S,
    query: &SearchQuery,
    page_size: u32,
    after: Option<&str>,
    page_number: usize,
) -> Result<SearchPage> {
    tracing::debug!(page = page_number, cursor = ?after, "Fetching search page");
    source
        .search_page(query, page_size, after)
        .await
        .map_err(|e| match e {
            e @ SyncError::Enumeration { .. } => e,
            other => SyncError::Enumeration {
                message: format!("page {}: {}", page_number, other),
            },
        })
}

const SEARCH_QUERY: &str = r#"
query OrganizationRepositories($query: String!, $first: Int!, $after: String) {
  search(type: REPOSITORY, query: $query, first: $first, after: $after) {
    pageInfo {
      endCursor
      hasNextPage
    }
    repositoryCount
    edges {
      node {
        ... on Repository {
          name
          isEmpty
        }
      }
    }
  }
}
"#;

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct SearchData {
    search: SearchConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchConnection {
    page_info: PageInfo,
    repository_count: usize,
    #[serde(default)]
    edges: Vec<SearchEdge>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Deserialize)]
struct SearchEdge {
    node: Option<RepositoryNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name: Option<String>,
    #[serde(default)]
    is_empty: bool,
}

impl GraphQlResponse {
    fn into_page(self) -> Result<SearchPage> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(SyncError::Enumeration {
                message: messages.join("; "),
            });
        }

        let search = self
            .data
            .ok_or_else(|| SyncError::Enumeration {
                message: "search response contained no data".into(),
            })?
            .search;

        let end_cursor = if search.page_info.has_next_page {
            search.page_info.end_cursor.unwrap_or_default()
        } else {
            String::new()
        };

        let repositories = search
            .edges
            .into_iter()
            .filter_map(|edge| edge.node)
            .filter_map(|node| node.name.map(|name| RepositoryDescriptor::new(name, node.is_empty)))
            .collect();

        Ok(SearchPage {
            repository_count: search.repository_count,
            end_cursor,
            repositories,
        })
    }
}

#[async_trait]
impl SearchPages for GitHubClient {
    async fn search_page(
        &self,
        query: &SearchQuery,
        first: u32,
        after: Option<&str>,
    ) -> Result<SearchPage> {
        let payload = json!({
            "query": SEARCH_QUERY,
            "variables": {
                "query": query.as_str(),
                "first": first,
                "after": after,
            },
        });

        let response: GraphQlResponse =
            self.octocrab
                .graphql(&payload)
                .await
                .map_err(|e| SyncError::Enumeration {
                    message: format!("search request failed: {}", e),
                })?;

        response.into_page()
    }
}
