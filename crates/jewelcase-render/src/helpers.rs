//! Field rendering helpers shared by every view.
//!
//! Built once at startup and handed to the renderer. They turn CMS field
//! values (rich text, links, images) into escaped HTML and site URLs.

use serde_json::{Map, Value};

use crate::template::escape_html;

/// Maps CMS document links to site URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkResolver;

impl LinkResolver {
    /// URL of a document of `doc_type` with an optional uid.
    pub fn resolve(&self, doc_type: &str, uid: Option<&str>) -> String {
        match (doc_type, uid) {
            ("about", _) => "/about".to_string(),
            ("collection" | "collections", _) => "/collections".to_string(),
            ("product", Some(uid)) => format!("/jewel/{uid}"),
            _ => "/".to_string(),
        }
    }
}

/// Rich text, link and image helpers.
#[derive(Debug, Clone, Default)]
pub struct Helpers {
    link_resolver: LinkResolver,
}

impl Helpers {
    pub fn new(link_resolver: LinkResolver) -> Self {
        Self { link_resolver }
    }

    pub fn link_resolver(&self) -> &LinkResolver {
        &self.link_resolver
    }

    /// URL a link field points at.
    ///
    /// Document links go through the link resolver; web and media links use
    /// their url. Empty and broken links resolve to nothing.
    pub fn link_url(&self, link: &Value) -> Option<String> {
        self.link_url_from(link.as_object()?)
    }

    /// [`link_url`](Self::link_url) for an already unpacked link object.
    pub fn link_url_from(&self, link: &Map<String, Value>) -> Option<String> {
        let str_field = |name: &str| link.get(name).and_then(Value::as_str);

        match str_field("link_type") {
            Some("Document") => {
                if link.get("isBroken").and_then(Value::as_bool) == Some(true) {
                    return None;
                }
                let doc_type = str_field("type")?;
                Some(self.link_resolver.resolve(doc_type, str_field("uid")))
            }
            Some("Web" | "Media") => str_field("url")
                .filter(|url| is_safe_url(url))
                .map(str::to_string),
            _ => None,
        }
    }

    /// Source URL of an image field.
    pub fn image_url<'a>(&self, image: &'a Value) -> Option<&'a str> {
        image.get("url").and_then(Value::as_str)
    }

    /// `<img>` tag for an image field, or nothing when the field is empty.
    pub fn image_tag(&self, image: &Value, class: &str) -> Option<String> {
        let url = self.image_url(image)?;
        let alt = image.get("alt").and_then(Value::as_str).unwrap_or_default();
        Some(format!(
            r#"<img class="{}" src="{}" alt="{}">"#,
            escape_html(class),
            escape_html(url),
            escape_html(alt)
        ))
    }

    /// Plain text of a rich text field, blocks joined by `separator`.
    ///
    /// A plain string field is returned unchanged.
    pub fn as_text(&self, field: &Value, separator: &str) -> String {
        match field {
            Value::String(s) => s.clone(),
            Value::Array(blocks) => blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(separator),
            _ => String::new(),
        }
    }

    /// HTML for a rich text field.
    ///
    /// Consecutive list items are grouped into one `<ul>` or `<ol>`.
    /// Unknown block types are skipped.
    pub fn as_html(&self, field: &Value) -> String {
        let blocks = match field {
            Value::Array(blocks) => blocks,
            Value::String(s) => return format!("<p>{}</p>", escape_html(s)),
            _ => return String::new(),
        };

        let mut out = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in blocks {
            let kind = block.get("type").and_then(Value::as_str).unwrap_or_default();
            let list = match kind {
                "list-item" => Some("ul"),
                "o-list-item" => Some("ol"),
                _ => None,
            };

            if open_list != list {
                if let Some(tag) = open_list {
                    out.push_str(&format!("</{tag}>"));
                }
                if let Some(tag) = list {
                    out.push_str(&format!("<{tag}>"));
                }
                open_list = list;
            }

            out.push_str(&self.block_html(kind, block));
        }

        if let Some(tag) = open_list {
            out.push_str(&format!("</{tag}>"));
        }

        out
    }

    fn block_html(&self, kind: &str, block: &Value) -> String {
        let class = block
            .get("label")
            .and_then(Value::as_str)
            .map(|label| format!(r#" class="{}""#, escape_html(label)))
            .unwrap_or_default();

        let tag = match kind {
            "paragraph" => "p",
            "heading1" => "h1",
            "heading2" => "h2",
            "heading3" => "h3",
            "heading4" => "h4",
            "heading5" => "h5",
            "heading6" => "h6",
            "preformatted" => "pre",
            "list-item" | "o-list-item" => "li",
            "image" => {
                return self
                    .image_tag(block, "block-img__image")
                    .map(|img| format!(r#"<p class="block-img">{img}</p>"#))
                    .unwrap_or_default();
            }
            "embed" => return embed_html(block),
            other => {
                tracing::trace!(block = other, "skipping unsupported rich text block");
                return String::new();
            }
        };

        let text = block.get("text").and_then(Value::as_str).unwrap_or_default();
        let spans = block
            .get("spans")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        format!("<{tag}{class}>{}</{tag}>", self.spans_html(text, spans))
    }

    /// Apply inline spans to a block's text.
    ///
    /// Offsets count characters. The text is cut at every span boundary and
    /// each piece is wrapped in the spans covering it, so overlapping spans
    /// still produce well-formed markup.
    fn spans_html(&self, text: &str, spans: &[Value]) -> String {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let mut parsed: Vec<(usize, usize, &Value)> = spans
            .iter()
            .filter_map(|span| {
                let start = usize::try_from(span.get("start")?.as_u64()?).ok()?;
                let end = usize::try_from(span.get("end")?.as_u64()?).ok()?;
                (start < end && end <= len).then_some((start, end, span))
            })
            .collect();
        parsed.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut bounds: Vec<usize> = vec![0, len];
        for (start, end, _) in &parsed {
            bounds.push(*start);
            bounds.push(*end);
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut out = String::new();
        for window in bounds.windows(2) {
            let (from, to) = (window[0], window[1]);
            let piece: String = chars[from..to].iter().collect();
            let mut html = escape_html(&piece).replace('\n', "<br />");

            for (_, _, span) in parsed
                .iter()
                .rev()
                .filter(|(start, end, _)| *start <= from && to <= *end)
            {
                html = self.wrap_span(span, html);
            }
            out.push_str(&html);
        }

        out
    }

    fn wrap_span(&self, span: &Value, inner: String) -> String {
        match span.get("type").and_then(Value::as_str) {
            Some("strong") => format!("<strong>{inner}</strong>"),
            Some("em") => format!("<em>{inner}</em>"),
            Some("label") => {
                let label = span
                    .pointer("/data/label")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                format!(r#"<span class="{}">{inner}</span>"#, escape_html(label))
            }
            Some("hyperlink") => match span.get("data").and_then(|d| self.link_url(d)) {
                Some(url) => {
                    let target = span
                        .pointer("/data/target")
                        .and_then(Value::as_str)
                        .map(|t| format!(r#" target="{}" rel="noopener noreferrer""#, escape_html(t)))
                        .unwrap_or_default();
                    format!(r#"<a href="{}"{target}>{inner}</a>"#, escape_html(&url))
                }
                None => inner,
            },
            _ => inner,
        }
    }
}

/// Relative URLs and `http`, `https` or `mailto` URLs.
fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let scheme_end = url.find(|c| matches!(c, ':' | '/' | '?' | '#'));

    match scheme_end {
        Some(i) if url[i..].starts_with(':') => {
            let scheme = url[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

fn embed_html(block: &Value) -> String {
    let Some(oembed) = block.get("oembed") else {
        return String::new();
    };
    let field = |name: &str| oembed.get(name).and_then(Value::as_str).unwrap_or_default();

    // oEmbed html is provider markup and is inserted verbatim.
    format!(
        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
        escape_html(field("embed_url")),
        escape_html(field("type")),
        escape_html(field("provider_name")),
        field("html")
    )
}
