//! The content API seam.
//!
//! Route handlers depend on [`ContentApi`] rather than on the HTTP client so
//! the fetch-and-merge logic can be exercised against in-memory documents.

use std::future::Future;

use jewelcase_core::Document;

use crate::{
    error::{CmsError, Result},
    predicate::Predicate,
    query::{QueryOptions, SearchResponse},
};

/// Read access to CMS documents at a fixed content ref.
pub trait ContentApi: Send + Sync {
    /// Run a query and return one page of results.
    fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> impl Future<Output = Result<SearchResponse>> + Send;

    /// The only document of a singleton type.
    ///
    /// Fails with [`CmsError::NotFound`] when the type has no document.
    fn get_single(
        &self,
        doc_type: &str,
        options: &QueryOptions,
    ) -> impl Future<Output = Result<Document>> + Send {
        async move {
            let predicates = [Predicate::document_type(doc_type)];
            let options = options.clone().page_size(1);
            let response = self.query(&predicates, &options).await?;

            response.results.into_iter().next().ok_or_else(|| {
                CmsError::NotFound(format!("single document of type {doc_type:?}"))
            })
        }
    }

    /// The document of `doc_type` whose uid is `uid`, if any.
    fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> impl Future<Output = Result<Option<Document>>> + Send {
        async move {
            let predicates = [Predicate::uid(doc_type, uid)];
            let options = options.clone().page_size(1);
            let response = self.query(&predicates, &options).await?;
            Ok(response.results.into_iter().next())
        }
    }

    /// Every document of `doc_type`, reading all pages in order.
    fn get_all_by_type(
        &self,
        doc_type: &str,
        options: &QueryOptions,
    ) -> impl Future<Output = Result<Vec<Document>>> + Send {
        async move {
            let predicates = [Predicate::document_type(doc_type)];
            let mut documents = Vec::new();
            let mut page = 1;

            loop {
                let options = options.clone().page(page);
                let response = self.query(&predicates, &options).await?;

                // An upstream that ignores `page` keeps answering with the same page.
                if response.page != page {
                    tracing::warn!(doc_type, requested = page, got = response.page, "CMS ignored page parameter");
                    break;
                }

                let more = response.has_next_page() && !response.results.is_empty();
                documents.extend(response.results);

                if !more {
                    break;
                }
                page += 1;
            }

            tracing::debug!(doc_type, count = documents.len(), pages = page, "fetched all documents");
            Ok(documents)
        }
    }
}
