//! HTML template system for views.
//!
//! A deliberately small interpolation engine: `{{ name }}` inserts a
//! variable, `{{ name? }}` inserts it when present. Templates are parsed once
//! when registered, so syntax errors surface at startup rather than while
//! serving a request. Values are HTML-escaped unless they were inserted as
//! trusted markup.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Variables available to one render call.
///
/// Every value is stored ready to splice into markup.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert plain text, escaping it.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        self.variables
            .insert(key.into(), escape_html(value.as_ref()));
    }

    /// Insert trusted markup as-is.
    pub fn insert_html(&mut self, key: impl Into<String>, html: impl Into<String>) {
        self.variables.insert(key.into(), html.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder form of [`insert_html`](Self::insert_html).
    #[must_use]
    pub fn with_html(mut self, key: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert_html(key, html);
        self
    }

    /// Insert plain text when there is some.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl AsRef<str>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Get a variable value as it will be spliced.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Check if a variable exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable { name: String, optional: bool },
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| TemplateError::InvalidSyntax {
                template: name.clone(),
                message: "unclosed {{ delimiter".to_string(),
            })?;

            let raw = after[..end].trim();
            let (var, optional) = match raw.strip_suffix('?') {
                Some(stripped) => (stripped.trim(), true),
                None => (raw, false),
            };

            if var.is_empty() || !var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TemplateError::InvalidSyntax {
                    template: name,
                    message: format!("invalid variable name {raw:?}"),
                });
            }

            segments.push(Segment::Variable {
                name: var.to_string(),
                optional,
            });
            rest = &after[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable { name, optional } => match context.get(name) {
                    Some(value) => out.push_str(value),
                    None if *optional => {}
                    None => return Err(TemplateError::MissingVariable(name.clone())),
                },
            }
        }

        Ok(out)
    }
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a registry holding the built-in site templates.
    pub fn new() -> Result<Self> {
        let mut registry = Self::default();
        registry.register_defaults()?;
        Ok(registry)
    }

    fn register_defaults(&mut self) -> Result<()> {
        for (name, source) in [
            ("base", BASE_TEMPLATE),
            ("preloader", PRELOADER_TEMPLATE),
            ("home", HOME_TEMPLATE),
            ("about", ABOUT_TEMPLATE),
            ("collections", COLLECTIONS_TEMPLATE),
            ("product", PRODUCT_TEMPLATE),
        ] {
            self.register(Template::parse(name, source)?);
        }
        Ok(())
    }

    /// Register a template, replacing any with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        template.render(context)
    }
}

/// Page layout shared by every view.
pub const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description? }}">
    <meta property="og:title" content="{{ title }}">
    <meta property="og:description" content="{{ description? }}">
    <meta property="og:image" content="{{ og_image? }}">
    <link rel="stylesheet" href="/static/main.css">
</head>
<body>
    {{ preloader }}
    <header class="navigation">
        <a href="/" class="navigation__logo">{{ site_title }}</a>
        <nav class="navigation__list">
            <a href="/collections" class="navigation__link">Collections</a>
            <a href="/about" class="navigation__link">About</a>
        </nav>
    </header>
    <main class="content" data-template="{{ template }}">
        {{ content }}
    </main>
    <footer class="footer">
        <p>&copy; {{ year }} {{ site_title }}</p>
    </footer>
    <script src="/static/main.js" defer></script>
</body>
</html>"##;

/// Loading overlay shown until assets are ready.
pub const PRELOADER_TEMPLATE: &str = r#"<div class="preloader" data-preloader>
    <div class="preloader__text">{{ text }}</div>
    <div class="preloader__number">
        <span class="preloader__number__text">0%</span>
    </div>
</div>"#;

/// Landing page.
pub const HOME_TEMPLATE: &str = r#"<section class="home">
    <h1 class="home__title">{{ title }}</h1>
    <div class="home__description">{{ description? }}</div>
    <div class="home__gallery">{{ gallery? }}</div>
    <ul class="home__collections">{{ collections }}</ul>
    <a href="/collections" class="home__link">{{ link_label }}</a>
</section>"#;

/// About page.
pub const ABOUT_TEMPLATE: &str = r#"<section class="about">
    <h1 class="about__title">{{ title }}</h1>
    <figure class="about__media">{{ image? }}</figure>
    <div class="about__content">{{ body? }}</div>
</section>"#;

/// Collections listing.
pub const COLLECTIONS_TEMPLATE: &str = r#"<section class="collections">
    <p class="collections__eyebrow">{{ eyebrow? }}</p>
    <h1 class="collections__title">{{ title }}</h1>
    <div class="collections__wrapper">{{ collections }}</div>
</section>"#;

/// Product detail page.
pub const PRODUCT_TEMPLATE: &str = r#"<article class="detail">
    <figure class="detail__media">{{ image? }}</figure>
    <div class="detail__information">
        <a href="{{ collection_url }}" class="detail__information__collection">{{ collection_title? }}</a>
        <h1 class="detail__information__title">{{ title }}</h1>
        <p class="detail__information__price">{{ price? }}</p>
        <div class="detail__information__description">{{ description? }}</div>
    </div>
    <a href="/collections" class="detail__button">Back to collections</a>
</article>"#;
