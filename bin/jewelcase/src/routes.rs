//! View context assembly.
//!
//! Each route fetches its documents concurrently and merges them into one
//! [`ViewContext`]. The first failed fetch fails the route; nothing is
//! rendered from a partial context.

use std::fmt;

use jewelcase_cms::{ContentApi, QueryOptions};
use jewelcase_render::{View, ViewContext};

use crate::error::SiteError;

/// Product fields resolved inline on every collection.
pub const COLLECTION_PRODUCT_LINKS: [&str; 3] = ["product.title", "product.slug", "product.image"];

/// Collection fields resolved inline on a product.
pub const PRODUCT_COLLECTION_LINKS: [&str; 1] = ["collection.title"];

/// A page the site can serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Collections,
    Product { uid: String },
}

impl Route {
    /// The view that renders this route.
    pub fn view(&self) -> View {
        match self {
            Self::Home => View::Home,
            Self::About => View::About,
            Self::Collections => View::Collections,
            Self::Product { .. } => View::Product,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::About => f.write_str("/about"),
            Self::Collections => f.write_str("/collections"),
            Self::Product { uid } => write!(f, "/jewel/{uid}"),
        }
    }
}

/// Fetch everything `route` needs.
pub async fn assemble<A: ContentApi>(api: &A, route: &Route) -> Result<ViewContext, SiteError> {
    let ctx = match route {
        Route::Home => home(api).await?,
        Route::About => about(api).await?,
        Route::Collections => collections(api).await?,
        Route::Product { uid } => product(api, uid).await?,
    };

    tracing::debug!(%route, keys = ctx.len(), "assembled view context");
    Ok(ctx)
}

fn collection_options() -> QueryOptions {
    QueryOptions::new().fetch_links(COLLECTION_PRODUCT_LINKS)
}

/// Context for `/`: home, metadata, preloader and every collection.
pub async fn home<A: ContentApi>(api: &A) -> Result<ViewContext, SiteError> {
    let plain = QueryOptions::new();
    let links = collection_options();

    let (home, metadata, preloader, collections) = tokio::try_join!(
        api.get_single("home", &plain),
        api.get_single("metadata", &plain),
        api.get_single("preloader", &plain),
        api.get_all_by_type("collection", &links),
    )?;

    Ok(ViewContext::new()
        .with("home", home)
        .with("metadata", metadata)
        .with("preloader", preloader)
        .with("collections", collections))
}

/// Context for `/about`.
pub async fn about<A: ContentApi>(api: &A) -> Result<ViewContext, SiteError> {
    let plain = QueryOptions::new();

    let (about, metadata, preloader) = tokio::try_join!(
        api.get_single("about", &plain),
        api.get_single("metadata", &plain),
        api.get_single("preloader", &plain),
    )?;

    Ok(ViewContext::new()
        .with("about", about)
        .with("metadata", metadata)
        .with("preloader", preloader))
}

/// Context for `/collections`.
pub async fn collections<A: ContentApi>(api: &A) -> Result<ViewContext, SiteError> {
    let plain = QueryOptions::new();
    let links = collection_options();

    let (collections, home, metadata, preloader) = tokio::try_join!(
        api.get_all_by_type("collection", &links),
        api.get_single("home", &plain),
        api.get_single("metadata", &plain),
        api.get_single("preloader", &plain),
    )?;

    Ok(ViewContext::new()
        .with("collections", collections)
        .with("home", home)
        .with("metadata", metadata)
        .with("preloader", preloader))
}

/// Context for `/jewel/{uid}`.
///
/// An unknown uid is [`SiteError::NotFound`].
pub async fn product<A: ContentApi>(api: &A, uid: &str) -> Result<ViewContext, SiteError> {
    let plain = QueryOptions::new();
    let links = QueryOptions::new().fetch_links(PRODUCT_COLLECTION_LINKS);

    let (metadata, product, preloader) = tokio::try_join!(
        api.get_single("metadata", &plain),
        api.get_by_uid("product", uid, &links),
        api.get_single("preloader", &plain),
    )?;

    let product = product.ok_or_else(|| SiteError::NotFound(format!("product {uid:?}")))?;

    Ok(ViewContext::new()
        .with("metadata", metadata)
        .with("product", product)
        .with("preloader", preloader))
}
