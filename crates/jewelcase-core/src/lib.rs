//! Jewelcase Core Library
//!
//! Configuration, error handling and the CMS document model shared by the
//! Jewelcase crates.

pub mod config;
pub mod document;
pub mod error;

pub use config::Config;
pub use document::Document;
pub use error::{CoreError, Result};
