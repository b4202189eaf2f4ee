use std::sync::Arc;

use crate::converter::MarkupConverter;
use crate::data_models::PageContent;
use crate::extractor::ArticleExtractor;
use crate::fetcher::{FetchError, FetchedPage, PageFetcher};

/// Where a page-read landed, best tier first.
#[derive(Debug)]
pub enum PageOutcome {
    /// Article extracted and converted to portable text.
    Converted(PageContent),
    /// Article extracted but conversion failed; content is the article markup.
    ExtractedOnly(PageContent),
    /// Extraction failed; content is the raw page.
    RawFallback(PageContent),
    /// The page could not be retrieved.
    Fatal(FetchError),
}

impl PageOutcome {
    pub fn tier(&self) -> &'static str {
        match self {
            PageOutcome::Converted(_) => "converted",
            PageOutcome::ExtractedOnly(_) => "extracted-only",
            PageOutcome::RawFallback(_) => "raw-fallback",
            PageOutcome::Fatal(_) => "fatal",
        }
    }

    pub fn content(&self) -> Option<&PageContent> {
        match self {
            PageOutcome::Converted(c) | PageOutcome::ExtractedOnly(c) | PageOutcome::RawFallback(c) => {
                Some(c)
            }
            PageOutcome::Fatal(_) => None,
        }
    }

    pub fn into_result(self) -> Result<PageContent, FetchError> {
        match self {
            PageOutcome::Converted(c) | PageOutcome::ExtractedOnly(c) | PageOutcome::RawFallback(c) => {
                Ok(c)
            }
            PageOutcome::Fatal(e) => Err(e),
        }
    }
}

/// Fetch, extract, convert; degrade instead of failing whenever the page was
/// retrieved.
#[derive(Clone)]
pub struct PageReader {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ArticleExtractor>,
    converter: Arc<dyn MarkupConverter>,
}

impl PageReader {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ArticleExtractor>,
        converter: Arc<dyn MarkupConverter>,
    ) -> PageReader {
        PageReader {
            fetcher,
            extractor,
            converter,
        }
    }

    pub async fn read(&self, url: &str) -> PageOutcome {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("page read failed for {url}: {e}");
                return PageOutcome::Fatal(e);
            }
        };

        // parsing is cpu bound; keep it off the async workers
        let extractor = self.extractor.clone();
        let converter = self.converter.clone();
        let fallback = page.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            settle(&page, extractor.as_ref(), converter.as_ref())
        })
        .await
        .unwrap_or_else(|e| {
            log::error!("extraction task for {url} aborted: {e}");
            PageOutcome::RawFallback(PageContent::new("", fallback.text_lossy()))
        });

        match outcome.content() {
            Some(content) => log::info!("read {url} as {} ({} bytes)", outcome.tier(), content.content.len()),
            None => log::info!("read {url} as {}", outcome.tier()),
        }
        outcome
    }
}

/// Picks the best tier for an already fetched page.
pub fn settle(
    page: &FetchedPage,
    extractor: &dyn ArticleExtractor,
    converter: &dyn MarkupConverter,
) -> PageOutcome {
    let article = match extractor.extract(&page.body, &page.final_url) {
        Ok(article) => article,
        Err(e) => {
            log::debug!("extraction failed for {}: {e}", page.final_url);
            return PageOutcome::RawFallback(PageContent::new("", page.text_lossy()));
        }
    };

    match converter.convert(&article.html_body, &page.final_url) {
        Ok(text) => PageOutcome::Converted(PageContent::new(article.title, text)),
        Err(e) => {
            log::debug!("conversion failed for {}: {e}", page.final_url);
            PageOutcome::ExtractedOnly(PageContent::new(article.title, article.html_body))
        }
    }
}
