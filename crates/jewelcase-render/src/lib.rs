//! Jewelcase Render Library
//!
//! Turns CMS documents into HTML pages.
//!
//! # Modules
//!
//! - [`template`] - HTML template system with variable interpolation
//! - [`helpers`] - Rich text, link and image helpers shared by every view
//! - [`context`] - Per-request view context
//! - [`views`] - Site views and the renderer

pub mod context;
pub mod error;
pub mod helpers;
pub mod template;
pub mod views;

pub use context::{ContextValue, ViewContext};
pub use error::{RenderError, Result};
pub use helpers::{Helpers, LinkResolver};
pub use template::{Template, TemplateContext, TemplateError, TemplateRegistry};
pub use views::{SiteRenderer, View};
