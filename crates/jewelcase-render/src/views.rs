//! Site views.
//!
//! Each [`View`] names the context keys it needs. [`SiteRenderer`] checks
//! them all before producing any markup, renders the view's own template and
//! wraps it in the shared layout.

use std::fmt;

use chrono::{Datelike, Utc};
use jewelcase_core::{
    Document,
    config::SiteConfig,
    document::first_text,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    context::ViewContext,
    error::{RenderError, Result},
    helpers::Helpers,
    template::{TemplateContext, TemplateRegistry, escape_html},
};

/// A page of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    About,
    Collections,
    Product,
}

impl View {
    /// Template rendering the view body.
    pub fn template_name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Collections => "collections",
            Self::Product => "product",
        }
    }

    /// Context keys the view reads.
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::Home => &["home", "metadata", "preloader", "collections"],
            Self::About => &["about", "metadata", "preloader"],
            Self::Collections => &["collections", "home", "metadata", "preloader"],
            Self::Product => &["metadata", "product", "preloader"],
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

/// Renders views from their context.
#[derive(Debug, Clone)]
pub struct SiteRenderer {
    templates: TemplateRegistry,
    helpers: Helpers,
    site: SiteConfig,
}

impl SiteRenderer {
    /// Create a renderer with the built-in templates.
    pub fn new(site: SiteConfig, helpers: Helpers) -> Result<Self> {
        Ok(Self {
            templates: TemplateRegistry::new()?,
            helpers,
            site,
        })
    }

    /// Render a full HTML page.
    pub fn render(&self, view: View, ctx: &ViewContext) -> Result<String> {
        if let Some(missing) = view.required_keys().iter().find(|k| !ctx.contains(k)) {
            return Err(RenderError::MissingKey((*missing).to_string()));
        }

        debug!(%view, keys = ?ctx.keys().collect::<Vec<_>>(), "rendering view");

        let (title, inner) = match view {
            View::Home => self.home(ctx)?,
            View::About => self.about(ctx)?,
            View::Collections => self.collections(ctx)?,
            View::Product => self.product(ctx)?,
        };
        let content = self.templates.render(view.template_name(), &inner)?;

        let metadata = ctx.document("metadata")?;
        let site_title = metadata.text("title").unwrap_or(&self.site.title);
        let page_title = match title {
            Some(title) if title != site_title => format!("{title} | {site_title}"),
            _ => site_title.to_string(),
        };

        let mut base = TemplateContext::new()
            .with_var("lang", &self.site.lang)
            .with_var("title", &page_title)
            .with_var("site_title", site_title)
            .with_var("template", view.template_name())
            .with_var("year", Utc::now().year().to_string())
            .with_html("preloader", self.preloader(ctx.document("preloader")?)?)
            .with_html("content", content);

        base.insert_opt("description", metadata.text("description"));
        base.insert_opt(
            "og_image",
            metadata.field("image").and_then(|i| self.helpers.image_url(i)),
        );

        Ok(self.templates.render("base", &base)?)
    }

    fn preloader(&self, preloader: &Document) -> Result<String> {
        let text = preloader
            .field("title")
            .map(|t| self.helpers.as_text(t, " "))
            .unwrap_or_default();
        let ctx = TemplateContext::new().with_var("text", text);
        Ok(self.templates.render("preloader", &ctx)?)
    }

    fn home(&self, ctx: &ViewContext) -> Result<(Option<String>, TemplateContext)> {
        let home = ctx.document("home")?;
        let collections = ctx.documents("collections")?;

        let gallery = home
            .group("gallery")
            .filter_map(|item| item.get("image"))
            .filter_map(|image| self.helpers.image_tag(image, "home__gallery__image"))
            .collect::<String>();

        let collections_html = collections
            .iter()
            .map(|collection| {
                format!(
                    r#"<li class="home__collection"><a href="{}" class="home__collection__link">{}</a><div class="home__collection__products">{}</div></li>"#,
                    escape_html(&self.helpers.link_resolver().resolve(&collection.doc_type, collection.uid.as_deref())),
                    escape_html(collection.text("title").unwrap_or_default()),
                    self.product_thumbnails(collection, "home__collection__product"),
                )
            })
            .collect::<String>();

        let mut inner = TemplateContext::new()
            .with_var("title", home.text("title").unwrap_or_default())
            .with_var("link_label", home.text("link_label").unwrap_or("View collections"))
            .with_html("collections", collections_html);

        if let Some(description) = home.field("description") {
            inner.insert_html("description", self.helpers.as_html(description));
        }
        if !gallery.is_empty() {
            inner.insert_html("gallery", gallery);
        }

        Ok((None, inner))
    }

    fn about(&self, ctx: &ViewContext) -> Result<(Option<String>, TemplateContext)> {
        let about = ctx.document("about")?;
        let title = about.text("title").unwrap_or("About").to_string();

        let mut inner = TemplateContext::new().with_var("title", &title);
        if let Some(image) = about
            .field("image")
            .and_then(|i| self.helpers.image_tag(i, "about__media__image"))
        {
            inner.insert_html("image", image);
        }
        if let Some(body) = about.field("body") {
            inner.insert_html("body", self.helpers.as_html(body));
        }

        Ok((Some(title), inner))
    }

    fn collections(&self, ctx: &ViewContext) -> Result<(Option<String>, TemplateContext)> {
        let home = ctx.document("home")?;
        let collections = ctx.documents("collections")?;

        let collections_html = collections
            .iter()
            .enumerate()
            .map(|(index, collection)| {
                let description = collection
                    .field("description")
                    .map(|d| self.helpers.as_html(d))
                    .unwrap_or_default();
                format!(
                    r#"<article class="collection" data-index="{index}"><h2 class="collection__title">{}</h2><div class="collection__description">{description}</div><ul class="collection__products">{}</ul></article>"#,
                    escape_html(collection.text("title").unwrap_or_default()),
                    self.product_list(collection),
                )
            })
            .collect::<String>();

        let mut inner = TemplateContext::new()
            .with_var("title", "Collections")
            .with_html("collections", collections_html);
        inner.insert_opt("eyebrow", home.text("title"));

        Ok((Some("Collections".to_string()), inner))
    }

    fn product(&self, ctx: &ViewContext) -> Result<(Option<String>, TemplateContext)> {
        let product = ctx.document("product")?;
        let title = product
            .text("title")
            .or(product.uid.as_deref())
            .unwrap_or_default()
            .to_string();

        let collection_url = product
            .link("collection")
            .and_then(|link| self.helpers.link_url_from(link))
            .unwrap_or_else(|| "/collections".to_string());

        let mut inner = TemplateContext::new()
            .with_var("title", &title)
            .with_var("collection_url", collection_url);

        inner.insert_opt("collection_title", product.linked_text("collection", "title"));
        inner.insert_opt("price", product.field("price").and_then(price_text));
        if let Some(image) = product
            .field("image")
            .and_then(|i| self.helpers.image_tag(i, "detail__media__image"))
        {
            inner.insert_html("image", image);
        }
        if let Some(description) = product.field("description") {
            inner.insert_html("description", self.helpers.as_html(description));
        }

        Ok((Some(title), inner))
    }

    /// Linked products of a collection, as resolved through `fetchLinks`.
    fn linked_products<'a>(&self, collection: &'a Document) -> impl Iterator<Item = &'a Map<String, Value>> {
        collection
            .group("products")
            .filter_map(|item| item.get("products_product"))
            .filter_map(Value::as_object)
    }

    fn product_thumbnails(&self, collection: &Document, class: &str) -> String {
        self.linked_products(collection)
            .filter_map(|link| link.get("data")?.get("image"))
            .filter_map(|image| self.helpers.image_tag(image, class))
            .collect()
    }

    fn product_list(&self, collection: &Document) -> String {
        self.linked_products(collection)
            .filter_map(|link| {
                let url = self.helpers.link_url_from(link)?;
                let data = link.get("data");
                let title = data
                    .and_then(|d| d.get("title"))
                    .and_then(first_text)
                    .unwrap_or_default();
                let image = data
                    .and_then(|d| d.get("image"))
                    .and_then(|i| self.helpers.image_tag(i, "collection__product__image"))
                    .unwrap_or_default();

                Some(format!(
                    r#"<li class="collection__product"><a href="{}" class="collection__product__link">{image}<span class="collection__product__title">{}</span></a></li>"#,
                    escape_html(&url),
                    escape_html(title),
                ))
            })
            .collect()
    }
}

fn price_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::helpers::LinkResolver;

    fn renderer() -> SiteRenderer {
        SiteRenderer::new(SiteConfig::default(), Helpers::new(LinkResolver)).unwrap()
    }

    fn metadata() -> Document {
        Document::new("M", "metadata")
            .with_field("title", json!("Maison Or"))
            .with_field("description", json!("Fine jewelry"))
            .with_field("image", json!({"url": "https://images.test/og.jpg"}))
    }

    fn preloader() -> Document {
        Document::new("PL", "preloader")
            .with_field("title", json!([{"type": "paragraph", "text": "Loading gold", "spans": []}]))
    }

    fn home() -> Document {
        Document::new("H", "home")
            .with_field("title", json!([{"type": "heading1", "text": "Hand made", "spans": []}]))
            .with_field("gallery", json!([{"image": {"url": "https://images.test/g1.jpg", "alt": "g1"}}]))
    }

    fn collection() -> Document {
        Document::new("C1", "collection")
            .with_uid("rings")
            .with_field("title", json!("Rings"))
            .with_field(
                "products",
                json!([{
                    "products_product": {
                        "id": "P1", "type": "product", "uid": "ring-01", "link_type": "Document",
                        "data": {
                            "title": "Solitaire",
                            "slug": "solitaire",
                            "image": {"url": "https://images.test/ring.jpg", "alt": "ring"}
                        }
                    }
                }]),
            )
    }

    #[test]
    fn test_render_home() {
        let ctx = ViewContext::new()
            .with("home", home())
            .with("metadata", metadata())
            .with("preloader", preloader())
            .with("collections", vec![collection()]);

        let html = renderer().render(View::Home, &ctx).unwrap();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Maison Or</title>"));
        assert!(html.contains(r#"<meta name="description" content="Fine jewelry">"#));
        assert!(html.contains(r#"content="https://images.test/og.jpg""#));
        assert!(html.contains("Loading gold"));
        assert!(html.contains("Hand made"));
        assert!(html.contains("https://images.test/g1.jpg"));
        assert!(html.contains("https://images.test/ring.jpg"));
        assert!(html.contains(r#"data-template="home""#));
    }

    #[test]
    fn test_render_home_without_collections() {
        let ctx = ViewContext::new()
            .with("home", home())
            .with("metadata", metadata())
            .with("preloader", preloader())
            .with("collections", Vec::<Document>::new());

        let html = renderer().render(View::Home, &ctx).unwrap();
        assert!(html.contains(r#"<ul class="home__collections"></ul>"#));
    }

    #[test]
    fn test_render_collections_links_products() {
        let ctx = ViewContext::new()
            .with("home", home())
            .with("metadata", metadata())
            .with("preloader", preloader())
            .with("collections", vec![collection()]);

        let html = renderer().render(View::Collections, &ctx).unwrap();

        assert!(html.contains("<title>Collections | Maison Or</title>"));
        assert!(html.contains(r#"href="/jewel/ring-01""#));
        assert!(html.contains("Solitaire"));
        assert!(html.contains(r#"<h2 class="collection__title">Rings</h2>"#));
    }

    #[test]
    fn test_render_product() {
        let product = Document::new("P1", "product")
            .with_uid("ring-01")
            .with_field("title", json!([{"type": "heading1", "text": "Solitaire <18k>", "spans": []}]))
            .with_field("price", json!(1200))
            .with_field(
                "description",
                json!([{"type": "paragraph", "text": "Brilliant cut.", "spans": []}]),
            )
            .with_field(
                "collection",
                json!({"id": "C1", "type": "collection", "uid": "rings", "link_type": "Document",
                       "data": {"title": "Rings"}}),
            );
        let ctx = ViewContext::new()
            .with("metadata", metadata())
            .with("preloader", preloader())
            .with("product", product);

        let html = renderer().render(View::Product, &ctx).unwrap();

        assert!(html.contains("<title>Solitaire &lt;18k&gt; | Maison Or</title>"));
        assert!(html.contains(r#"href="/collections" class="detail__information__collection">Rings</a>"#));
        assert!(html.contains("1200"));
        assert!(html.contains("<p>Brilliant cut.</p>"));
    }

    #[test]
    fn test_render_about() {
        let about = Document::new("A", "about")
            .with_field("title", json!("Our story"))
            .with_field("body", json!([{"type": "paragraph", "text": "Since 1920.", "spans": []}]));
        let ctx = ViewContext::new()
            .with("about", about)
            .with("metadata", metadata())
            .with("preloader", preloader());

        let html = renderer().render(View::About, &ctx).unwrap();
        assert!(html.contains("<title>Our story | Maison Or</title>"));
        assert!(html.contains("<p>Since 1920.</p>"));
    }

    #[test]
    fn test_missing_key_renders_nothing() {
        let ctx = ViewContext::new()
            .with("metadata", metadata())
            .with("preloader", preloader());

        let err = renderer().render(View::Product, &ctx).unwrap_err();
        assert!(matches!(err, RenderError::MissingKey(k) if k == "product"));
    }

    #[test]
    fn test_site_title_fallback() {
        let ctx = ViewContext::new()
            .with("about", Document::new("A", "about"))
            .with("metadata", Document::new("M", "metadata"))
            .with("preloader", Document::new("PL", "preloader"));

        let html = renderer().render(View::About, &ctx).unwrap();
        assert!(html.contains("<title>About | Jewelcase</title>"));
    }

    #[test]
    fn test_required_keys() {
        assert_eq!(
            View::Home.required_keys(),
            ["home", "metadata", "preloader", "collections"]
        );
        assert_eq!(View::Product.to_string(), "product");
    }

    #[test]
    fn test_price_text() {
        assert_eq!(price_text(&json!("€ 120")), Some("€ 120".to_string()));
        assert_eq!(price_text(&json!(99.5)), Some("99.5".to_string()));
        assert_eq!(price_text(&json!("")), None);
        assert_eq!(price_text(&json!(null)), None);
    }
}
