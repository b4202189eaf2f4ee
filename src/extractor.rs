use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use thiserror::Error;

use crate::data_models::Article;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("content does not look like an html document")]
    NotHtml,
    #[error("no readable article found")]
    NoArticle,
}

/// Isolates the primary content of a page.
pub trait ArticleExtractor: Send + Sync {
    fn extract(&self, raw: &[u8], url: &Url) -> Result<Article, ExtractionError>;
}

/// Words in class/id attributes that mark page chrome rather than content.
const BOILERPLATE_WORDS: &[&str] = &[
    "nav",
    "navbar",
    "navigation",
    "menu",
    "sidebar",
    "footer",
    "header",
    "masthead",
    "banner",
    "cookie",
    "consent",
    "ad",
    "ads",
    "advert",
    "advertisement",
    "promo",
    "sponsored",
    "subscribe",
    "newsletter",
    "share",
    "social",
    "related",
    "comments",
    "breadcrumb",
    "breadcrumbs",
];

const CANDIDATES: &str = r#"article, main, [role="main"], section, div, body"#;
const CONTENT_ROOTS: &str = r#"article, main, [role="main"]"#;
const JUNK: &str = "script, style, noscript, iframe, form, nav, aside, footer, button, \
                    input, select, textarea, svg, canvas, template, object, embed, link, meta";

static CANDIDATE_SELECTOR: OnceLock<Selector> = OnceLock::new();
static JUNK_SELECTOR: OnceLock<Selector> = OnceLock::new();
static CONTENT_ROOT_SELECTOR: OnceLock<Selector> = OnceLock::new();
static ANCHOR_SELECTOR: OnceLock<Selector> = OnceLock::new();
static OG_TITLE_SELECTOR: OnceLock<Selector> = OnceLock::new();
static TITLE_SELECTOR: OnceLock<Selector> = OnceLock::new();
static H1_SELECTOR: OnceLock<Selector> = OnceLock::new();
static ANY_ELEMENT_SELECTOR: OnceLock<Selector> = OnceLock::new();

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    // all selectors are literals in this module
    cell.get_or_init(|| Selector::parse(css).unwrap_or_else(|e| panic!("bad selector {css}: {e}")))
}

/// Readability-style extraction: score candidate containers by dense non-link
/// text, keep the best one and strip chrome out of it.
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    pub min_text_chars: usize,
}

impl Default for ReadabilityExtractor {
    fn default() -> Self {
        ReadabilityExtractor { min_text_chars: 25 }
    }
}

impl ArticleExtractor for ReadabilityExtractor {
    fn extract(&self, raw: &[u8], url: &Url) -> Result<Article, ExtractionError> {
        if !looks_like_html(raw) {
            return Err(ExtractionError::NotHtml);
        }
        let text = String::from_utf8_lossy(raw);
        let mut document = Html::parse_document(&text);
        let title = page_title(&document);

        let best = self
            .best_candidate(&document)
            .map(|el| el.id())
            .ok_or(ExtractionError::NoArticle)?;

        let junk: Vec<_> = {
            let root = document
                .tree
                .get(best)
                .and_then(ElementRef::wrap)
                .ok_or(ExtractionError::NoArticle)?;
            let root_text = text_chars(&root);
            root.select(selector(&JUNK_SELECTOR, JUNK))
                .filter(|el| !holds_content_root(el))
                .chain(
                    root.select(selector(&ANY_ELEMENT_SELECTOR, "*"))
                        .filter(|el| is_boilerplate_container(el) && is_disposable(el, root_text)),
                )
                .map(|el| el.id())
                .filter(|id| *id != best)
                .collect()
        };
        for id in junk {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let root = document
            .tree
            .get(best)
            .and_then(ElementRef::wrap)
            .ok_or(ExtractionError::NoArticle)?;
        if text_chars(&root) == 0 {
            return Err(ExtractionError::NoArticle);
        }

        log::debug!(
            "extracted <{}> article from {url} ({} text chars)",
            root.value().name(),
            text_chars(&root)
        );
        Ok(Article {
            title,
            html_body: root.html(),
        })
    }
}

impl ReadabilityExtractor {
    fn best_candidate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let mut best: Option<(i64, ElementRef<'a>)> = None;
        for el in document.select(selector(&CANDIDATE_SELECTOR, CANDIDATES)) {
            let txt = text_chars(&el);
            if txt < self.min_text_chars {
                continue;
            }
            let link_txt = link_text_chars(&el);
            let link_heavy = link_txt > txt / 2;
            let chrome = is_boilerplate_container(&el) && !is_content_root(&el);
            if chrome && link_heavy {
                continue;
            }
            let mut score = txt as i64 - 2 * link_txt as i64;
            match el.value().name() {
                "article" => score += 500,
                "main" => score += 300,
                "body" => score -= 50,
                _ => {}
            }
            if el.value().attr("role") == Some("main") {
                score += 300;
            }
            if link_heavy {
                score -= 500;
            }
            if chrome {
                score -= 250;
            }
            if score > 0 && best.is_none_or(|(s, _)| score > s) {
                best = Some((score, el));
            }
        }
        best.map(|(_, el)| el)
    }
}

/// Cheap sniff so plain text, JSON and binaries skip the html parser. The body
/// must open with markup and carry a known tag in its first 4 KiB.
pub fn looks_like_html(raw: &[u8]) -> bool {
    let raw = raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(raw);
    let Some(start) = raw.iter().position(|b| !b.is_ascii_whitespace()) else {
        return false;
    };
    if raw[start] != b'<' {
        return false;
    }
    let head = &raw[start..raw.len().min(start + 4096)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    ["<!doctype html", "<html", "<head", "<body", "<article", "<main", "<div", "<p>", "<p "]
        .iter()
        .any(|marker| head.contains(marker))
}

fn page_title(document: &Html) -> String {
    let og = document
        .select(selector(&OG_TITLE_SELECTOR, r#"meta[property="og:title"]"#))
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(norm_ws);
    let title = || {
        document
            .select(selector(&TITLE_SELECTOR, "title"))
            .next()
            .map(|t| norm_ws(&t.text().collect::<String>()))
    };
    let h1 = || {
        document
            .select(selector(&H1_SELECTOR, "h1"))
            .next()
            .map(|t| norm_ws(&t.text().collect::<Vec<_>>().join(" ")))
    };
    og.filter(|t| !t.is_empty())
        .or_else(|| title().filter(|t| !t.is_empty()))
        .or_else(h1)
        .unwrap_or_default()
}

fn is_boilerplate_container(el: &ElementRef) -> bool {
    let attrs = [el.value().attr("class"), el.value().attr("id")];
    attrs.iter().flatten().any(|value| {
        value
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .map(|word| word.to_ascii_lowercase())
            .any(|word| BOILERPLATE_WORDS.contains(&word.as_str()))
    })
}

fn is_content_root(el: &ElementRef) -> bool {
    matches!(el.value().name(), "article" | "main") || el.value().attr("role") == Some("main")
}

/// True if `el` is, or wraps, an article/main container.
fn holds_content_root(el: &ElementRef) -> bool {
    is_content_root(el) || el.select(selector(&CONTENT_ROOT_SELECTOR, CONTENT_ROOTS)).next().is_some()
}

/// Chrome-named elements are only dropped when they are link lists or carry
/// under a quarter of the winner's prose.
fn is_disposable(el: &ElementRef, root_text: usize) -> bool {
    if holds_content_root(el) {
        return false;
    }
    let txt = text_chars(el);
    let link_txt = link_text_chars(el);
    let prose = txt.saturating_sub(link_txt);
    link_txt > txt / 2 || prose * 4 < root_text
}

/// Visible text length, ignoring whitespace and script/style bodies.
fn text_chars(el: &ElementRef) -> usize {
    el.descendants()
        .filter(|node| {
            !node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"))
        })
        .filter_map(|node| node.value().as_text())
        .map(|t| t.chars().filter(|c| !c.is_whitespace()).count())
        .sum()
}

fn link_text_chars(el: &ElementRef) -> usize {
    el.select(selector(&ANCHOR_SELECTOR, "a"))
        .map(|a| text_chars(&a))
        .sum()
}

fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
