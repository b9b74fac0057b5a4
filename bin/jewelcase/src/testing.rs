//! In-memory content API for route and router tests.

use std::sync::{Arc, Mutex};

use jewelcase_cms::{
    ApiFactory, CmsError, ContentApi, Document, Predicate, QueryOptions, RequestScope,
    SearchResponse,
};
use serde_json::json;
use tokio::sync::Barrier;

type Seen = Arc<Mutex<Vec<(Vec<Predicate>, QueryOptions)>>>;

/// Answers queries from a fixed document set and records them.
#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    docs: Arc<Vec<Document>>,
    failing: Option<String>,
    stalled: Option<String>,
    barrier: Option<Arc<Barrier>>,
    seen: Seen,
}

impl FakeApi {
    pub(crate) fn new(docs: Vec<Document>) -> Self {
        Self {
            docs: Arc::new(docs),
            ..Self::default()
        }
    }

    /// Queries for `doc_type` fail with a 503.
    pub(crate) fn failing(mut self, doc_type: &str) -> Self {
        self.failing = Some(doc_type.to_string());
        self
    }

    /// Queries for `doc_type` never complete.
    pub(crate) fn stalled(mut self, doc_type: &str) -> Self {
        self.stalled = Some(doc_type.to_string());
        self
    }

    /// Every query waits until `n` queries are in flight.
    pub(crate) fn with_barrier(mut self, n: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(n)));
        self
    }

    pub(crate) fn queries(&self) -> Vec<(Vec<Predicate>, QueryOptions)> {
        self.seen.lock().unwrap().clone()
    }
}

fn queried_type(predicates: &[Predicate]) -> Option<&str> {
    predicates.iter().find_map(|p| {
        if p.path == "document.type" {
            Some(p.value.as_str())
        } else {
            p.path.strip_prefix("my.").and_then(|rest| rest.strip_suffix(".uid"))
        }
    })
}

fn matches(doc: &Document, predicate: &Predicate) -> bool {
    if predicate.path == "document.type" {
        doc.doc_type == predicate.value
    } else {
        predicate.path == format!("my.{}.uid", doc.doc_type)
            && doc.uid.as_deref() == Some(predicate.value.as_str())
    }
}

impl ContentApi for FakeApi {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> jewelcase_cms::Result<SearchResponse> {
        self.seen
            .lock()
            .unwrap()
            .push((predicates.to_vec(), options.clone()));

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        let doc_type = queried_type(predicates).unwrap_or_default();
        if self.stalled.as_deref() == Some(doc_type) {
            std::future::pending::<()>().await;
        }
        if self.failing.as_deref() == Some(doc_type) {
            return Err(CmsError::Status {
                status: 503,
                message: format!("{doc_type} unavailable"),
            });
        }

        let results = self
            .docs
            .iter()
            .filter(|doc| predicates.iter().all(|p| matches(doc, p)))
            .cloned()
            .collect();
        Ok(SearchResponse::single_page(results))
    }
}

/// Hands out clones of one [`FakeApi`] and records each request scope.
#[derive(Clone, Default)]
pub(crate) struct FakeFactory {
    api: FakeApi,
    refuse: bool,
    scopes: Arc<Mutex<Vec<RequestScope>>>,
}

impl FakeFactory {
    pub(crate) fn new(api: FakeApi) -> Self {
        Self {
            api,
            ..Self::default()
        }
    }

    /// `connect` fails as if the API root were unreachable.
    pub(crate) fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    pub(crate) fn scopes(&self) -> Vec<RequestScope> {
        self.scopes.lock().unwrap().clone()
    }
}

impl ApiFactory for FakeFactory {
    type Api = FakeApi;

    async fn connect(&self, scope: &RequestScope) -> jewelcase_cms::Result<FakeApi> {
        self.scopes.lock().unwrap().push(scope.clone());
        if self.refuse {
            return Err(CmsError::NoMasterRef);
        }
        Ok(self.api.clone())
    }
}

/// A small but complete catalog.
pub(crate) fn catalog() -> Vec<Document> {
    let rings_link = json!({
        "id": "C1", "type": "collection", "uid": "rings", "link_type": "Document",
        "data": {"title": "Rings"}
    });
    let ring_card = json!({
        "products_product": {
            "id": "P1", "type": "product", "uid": "ring-01", "link_type": "Document",
            "data": {
                "title": "Solitaire",
                "slug": "solitaire",
                "image": {"url": "https://images.test/ring.jpg", "alt": "Solitaire"}
            }
        }
    });

    vec![
        Document::new("M", "metadata")
            .with_field("title", json!("Maison Or"))
            .with_field("description", json!("Fine jewelry since 1920")),
        Document::new("PL", "preloader").with_field(
            "title",
            json!([{"type": "paragraph", "text": "Polishing", "spans": []}]),
        ),
        Document::new("H", "home")
            .with_field(
                "title",
                json!([{"type": "heading1", "text": "Hand made in Lisbon", "spans": []}]),
            )
            .with_field("link_label", json!("All collections")),
        Document::new("A", "about")
            .with_field("title", json!("Our story"))
            .with_field(
                "body",
                json!([{"type": "paragraph", "text": "Four generations of goldsmiths.", "spans": []}]),
            ),
        Document::new("C1", "collection")
            .with_uid("rings")
            .with_field("title", json!("Rings"))
            .with_field("products", json!([ring_card])),
        Document::new("C2", "collection")
            .with_uid("necklaces")
            .with_field("title", json!("Necklaces"))
            .with_field("products", json!([])),
        Document::new("P1", "product")
            .with_uid("ring-01")
            .with_field(
                "title",
                json!([{"type": "heading1", "text": "Solitaire", "spans": []}]),
            )
            .with_field("price", json!("1 200 €"))
            .with_field("collection", rings_link),
    ]
}
