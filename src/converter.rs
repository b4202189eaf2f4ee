use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::parse_document;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use reqwest::Url;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to parse article markup: {0}")]
    Parse(#[source] std::io::Error),
    #[error("failed to render article: {0}")]
    Render(#[source] std::io::Error),
    #[error("conversion produced no text")]
    Empty,
    #[error("base url {0} has no origin to resolve links against")]
    OpaqueBase(String),
}

/// Turns extracted article markup into portable text.
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, html: &str, base: &Url) -> Result<String, ConversionError>;
}

/// Article markup to Markdown: ATX headings, fenced code, inline links.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    fn engine() -> htmd::HtmlToMarkdown {
        let options = htmd::options::Options {
            heading_style: htmd::options::HeadingStyle::Atx,
            code_block_style: htmd::options::CodeBlockStyle::Fenced,
            link_style: htmd::options::LinkStyle::Inlined,
            ..Default::default()
        };
        htmd::HtmlToMarkdown::builder()
            .options(options)
            .skip_tags(vec!["script", "style", "noscript"])
            .build()
    }
}

impl MarkupConverter for MarkdownConverter {
    fn convert(&self, html: &str, base: &Url) -> Result<String, ConversionError> {
        let resolved = ResolvedMarkup::parse(html, base)?;
        let markdown = Self::engine()
            .convert(&resolved.html)
            .map_err(ConversionError::Render)?;
        resolved.non_empty(markdown.trim().to_string())
    }
}

/// Article markup to wrapped plain text, links as numbered footnotes.
#[derive(Debug, Clone)]
pub struct PlainTextConverter {
    pub width: usize,
}

impl MarkupConverter for PlainTextConverter {
    fn convert(&self, html: &str, base: &Url) -> Result<String, ConversionError> {
        let resolved = ResolvedMarkup::parse(html, base)?;
        let text = html2text::from_read(resolved.html.as_bytes(), self.width.max(20))
            .map_err(|e| ConversionError::Render(std::io::Error::other(e.to_string())))?;
        resolved.non_empty(text.trim().to_string())
    }
}

/// Origin of `url` (scheme, host and port); the path is dropped.
pub fn origin_of(url: &Url) -> Result<Url, ConversionError> {
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(ConversionError::OpaqueBase(url.to_string()));
    }
    Url::parse(&origin.ascii_serialization()).map_err(|_| ConversionError::OpaqueBase(url.to_string()))
}

/// Article markup with links made absolute, plus how much visible text the
/// parsed tree held.
struct ResolvedMarkup {
    html: String,
    visible_chars: usize,
}

impl ResolvedMarkup {
    fn parse(html: &str, base: &Url) -> Result<ResolvedMarkup, ConversionError> {
        let origin = origin_of(base)?;
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut Cursor::new(html.as_bytes()))
            .map_err(ConversionError::Parse)?;

        rewrite_links(&dom.document, &origin);

        let mut out = Vec::with_capacity(html.len());
        let document: SerializableHandle = dom.document.clone().into();
        serialize(&mut out, &document, SerializeOpts::default()).map_err(ConversionError::Render)?;
        Ok(ResolvedMarkup {
            html: String::from_utf8_lossy(&out).into_owned(),
            visible_chars: visible_text_chars(&dom.document),
        })
    }

    /// Empty output is only an error when the markup had something to show.
    fn non_empty(&self, out: String) -> Result<String, ConversionError> {
        if out.is_empty() && self.visible_chars > 0 {
            return Err(ConversionError::Empty);
        }
        Ok(out)
    }
}

/// Rewrites relative `href`/`src` attributes to absolute URLs on the origin of `base`.
pub fn absolutize_links(html: &str, base: &Url) -> Result<String, ConversionError> {
    ResolvedMarkup::parse(html, base).map(|resolved| resolved.html)
}

/// Non-whitespace characters in text nodes, skipping script and style bodies.
fn visible_text_chars(handle: &Handle) -> usize {
    match &handle.data {
        NodeData::Text { contents } => contents.borrow().chars().filter(|c| !c.is_whitespace()).count(),
        NodeData::Element { name, .. }
            if matches!(name.local.as_ref(), "script" | "style" | "noscript" | "template") =>
        {
            0
        }
        NodeData::Comment { .. } => 0,
        _ => handle.children.borrow().iter().map(visible_text_chars).sum(),
    }
}

fn rewrite_links(handle: &Handle, origin: &Url) {
    if let NodeData::Element { name, attrs, .. } = &handle.data {
        let attr_name = match name.local.as_ref() {
            "a" | "area" => Some("href"),
            "img" | "source" | "video" | "audio" | "iframe" => Some("src"),
            _ => None,
        };
        if let Some(attr_name) = attr_name {
            for attr in attrs.borrow_mut().iter_mut() {
                if attr.name.local.as_ref() != attr_name {
                    continue;
                }
                let value = attr.value.trim().to_string();
                if value.is_empty() || value.starts_with('#') {
                    continue;
                }
                if let Ok(resolved) = origin.join(&value) {
                    attr.value = StrTendril::from_slice(resolved.as_str());
                }
            }
        }
    }

    for child in handle.children.borrow().iter() {
        rewrite_links(child, origin);
    }
}
