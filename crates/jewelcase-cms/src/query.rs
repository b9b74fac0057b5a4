//! Query options and search responses.

use jewelcase_core::Document;
use serde::{Deserialize, Serialize};

/// Options accompanying a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Linked-document fields to resolve inline, as `type.field`.
    pub fetch_links: Vec<String>,
    /// Results per page. The client default applies when unset.
    pub page_size: Option<u32>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the given linked-document fields inline.
    #[must_use]
    pub fn fetch_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch_links.extend(links.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Query-string pairs for these options, excluding the predicates.
    pub fn to_params(&self, default_page_size: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![(
            "pageSize",
            self.page_size.unwrap_or(default_page_size).to_string(),
        )];

        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if !self.fetch_links.is_empty() {
            params.push(("fetchLinks", self.fetch_links.join(",")));
        }

        params
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// URL of the following page, absent on the last page.
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

fn first_page() -> u32 {
    1
}

impl SearchResponse {
    /// A single-page response holding `results`.
    pub fn single_page(results: Vec<Document>) -> Self {
        let size = u32::try_from(results.len()).unwrap_or(u32::MAX);
        Self {
            page: 1,
            results_per_page: size,
            total_results_size: size,
            total_pages: u32::from(size > 0),
            next_page: None,
            results,
        }
    }

    /// Whether a following page exists.
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some() && self.page < self.total_pages
    }
}
