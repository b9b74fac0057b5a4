//! Jewelcase CMS Library
//!
//! Client adapter for a Prismic-style headless CMS.
//!
//! # Modules
//!
//! - [`predicate`] - Query predicates and their wire syntax
//! - [`query`] - Query options and search responses
//! - [`api`] - The [`ContentApi`] seam used by route handlers
//! - [`client`] - HTTP client, request-scoped API handles and their factory

pub mod api;
pub mod client;
pub mod error;
pub mod predicate;
pub mod query;

pub use api::ContentApi;
pub use client::{Api, ApiFactory, CmsClient, PREVIEW_COOKIE, RequestScope};
pub use error::{CmsError, Result};
pub use jewelcase_core::Document;
pub use predicate::Predicate;
pub use query::{QueryOptions, SearchResponse};
