//! Search query construction.

use std::fmt;

/// A repository search query scoped to one organization.
///
/// The organization qualifier appears exactly once, and forks are included
/// unless the caller's filter already says otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Build a query from an organization name and an optional free-form filter
    /// (e.g. `language:Rust stars:>10`).
    pub fn new(organization: &str, filter: &str) -> Self {
        let org_qualifier = org_qualifier(organization);
        let filter = filter.trim();

        let mut query = if filter.contains(&org_qualifier) {
            filter.to_string()
        } else if filter.is_empty() {
            org_qualifier
        } else {
            format!("{} {}", org_qualifier, filter)
        };

        if !filter.contains("fork:") {
            query.push_str(" fork:true");
        }

        Self(query)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn org_qualifier(organization: &str) -> String {
    format!("org:\"{}\"", organization)
}
