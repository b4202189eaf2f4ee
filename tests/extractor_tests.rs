use plugin_relay::extractor::{ArticleExtractor, ExtractionError, ReadabilityExtractor, looks_like_html};
use reqwest::Url;

fn url() -> Url {
    Url::parse("https://example.com/posts/1").unwrap()
}

fn extract(html: &str) -> Result<plugin_relay::data_models::Article, ExtractionError> {
    ReadabilityExtractor::default().extract(html.as_bytes(), &url())
}

const NEWS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Page Title | Example</title>
  <style>body { color: red; }</style>
</head>
<body>
  <div class="navbar"><a href="/">Home</a> <a href="/about">About</a> <a href="/blog">Blog</a></div>
  <article>
    <h1>The Real Headline</h1>
    <p>This is the first paragraph of the story, long enough to count as content.</p>
    <script>alert('tracking');</script>
    <div class="share-buttons">Share on everything</div>
    <p>A second paragraph with a <a href="/related">link</a> inside the text body.</p>
  </article>
  <aside class="sidebar">Trending: cats, dogs, more cats and even more dogs.</aside>
  <footer>Copyright 2024 Example Corp. All rights reserved forever.</footer>
</body>
</html>"#;

#[cfg(test)]
mod extraction_tests {
    use super::*;

    #[test]
    fn test_picks_article_over_chrome() {
        let article = extract(NEWS_PAGE).unwrap();
        assert!(article.html_body.starts_with("<article"));
        assert!(article.html_body.contains("first paragraph"));
        assert!(article.html_body.contains("second paragraph"));
        assert!(!article.html_body.contains("Trending"));
        assert!(!article.html_body.contains("Copyright"));
        assert!(!article.html_body.contains("About"));
    }

    #[test]
    fn test_strips_scripts_and_boilerplate_inside_article() {
        let article = extract(NEWS_PAGE).unwrap();
        assert!(!article.html_body.contains("alert"));
        assert!(!article.html_body.contains("<script"));
        assert!(!article.html_body.contains("Share on everything"));
    }

    #[test]
    fn test_title_from_title_tag() {
        let article = extract(NEWS_PAGE).unwrap();
        assert_eq!(article.title, "Page Title | Example");
    }

    #[test]
    fn test_og_title_preferred() {
        let html = r#"<html><head>
            <meta property="og:title" content="  Open   Graph Title ">
            <title>Fallback</title></head>
            <body><main><p>Plenty of body text to make this a readable main section.</p></main></body></html>"#;
        let article = extract(html).unwrap();
        assert_eq!(article.title, "Open Graph Title");
        assert!(article.html_body.starts_with("<main"));
    }

    #[test]
    fn test_h1_title_when_no_title_tag() {
        let html = r#"<html><body><div><h1>Heading Title</h1>
            <p>Enough words in this paragraph for the extractor to accept it.</p></div></body></html>"#;
        let article = extract(html).unwrap();
        assert_eq!(article.title, "Heading Title");
    }

    #[test]
    fn test_densest_div_wins_without_semantic_tags() {
        let html = r#"<html><body>
            <div id="links"><a href="/a">one link</a> <a href="/b">two link</a> <a href="/c">three link</a></div>
            <div id="story"><p>The story itself is written here in long, plain sentences without any links.</p>
            <p>It continues for another sentence so that it clearly outweighs everything else.</p></div>
            </body></html>"#;
        let article = extract(html).unwrap();
        assert!(article.html_body.contains(r#"id="story""#));
        assert!(!article.html_body.contains("three link"));
    }

    #[test]
    fn test_body_fallback_for_bare_paragraphs() {
        let html = "<html><body><p>Just a bare paragraph of reasonable length, no containers at all.</p></body></html>";
        let article = extract(html).unwrap();
        assert!(article.html_body.starts_with("<body"));
        assert!(article.html_body.contains("bare paragraph"));
    }

    #[test]
    fn test_not_html_is_rejected() {
        assert_eq!(extract("just some plain text, nothing else").unwrap_err(), ExtractionError::NotHtml);
        assert_eq!(extract(r#"{"json": "<b>value</b>"}"#).unwrap_err(), ExtractionError::NotHtml);
        assert_eq!(extract("").unwrap_err(), ExtractionError::NotHtml);
    }

    #[test]
    fn test_too_little_text_is_no_article() {
        let html = "<html><body><p>tiny</p></body></html>";
        assert_eq!(extract(html).unwrap_err(), ExtractionError::NoArticle);
    }

    #[test]
    fn test_script_only_page_is_no_article() {
        let html = r#"<html><head><title>App</title></head><body><div id="root"></div>
            <script>window.__STATE__ = {"a": 1}; renderTheWholeAppClientSide();</script></body></html>"#;
        assert_eq!(extract(html).unwrap_err(), ExtractionError::NoArticle);
    }

    #[test]
    fn test_article_with_chrome_class_inside_main_is_kept() {
        let html = r#"<html><body>
            <main class="site-main">
              <div class="menu"><a href="/">Home</a> <a href="/news">News</a> <a href="/sport">Sport</a></div>
              <article class="post has-sidebar">
                <h1>Headline</h1>
                <p>The real story starts here and runs for several plain sentences of reporting.</p>
                <p>It keeps going with quotes, figures and the context a reader came for.</p>
              </article>
            </main>
            </body></html>"#;
        let article = extract(html).unwrap();
        assert!(article.html_body.starts_with("<article"));
        assert!(article.html_body.contains("The real story starts here"));
        assert!(article.html_body.contains("quotes, figures"));
        assert!(!article.html_body.contains("Sport"));
    }

    #[test]
    fn test_lead_paragraph_in_header_named_wrapper_is_kept() {
        let html = r#"<html><body><article>
            <h1>Headline</h1>
            <div class="content-header-wrap"><p>The lead paragraph of the actual article, carrying most of what there is to say.</p></div>
            <p>Short tail.</p>
            </article></body></html>"#;
        let article = extract(html).unwrap();
        assert!(article.html_body.contains("The lead paragraph of the actual article"));
        assert!(article.html_body.contains("Short tail."));
    }

    #[test]
    fn test_link_list_with_chrome_class_is_still_stripped() {
        let html = r#"<html><body><article>
            <h1>Headline</h1>
            <p>A long enough paragraph of article prose so the container clearly wins the scoring.</p>
            <div class="related-posts"><a href="/a">Another story</a> <a href="/b">Yet another story</a></div>
            </article></body></html>"#;
        let article = extract(html).unwrap();
        assert!(article.html_body.contains("article prose"));
        assert!(!article.html_body.contains("Yet another story"));
    }

    #[test]
    fn test_junk_wrapper_around_main_region_is_not_stripped() {
        let html = r#"<html><body><article>
            <h1>Inside a form</h1>
            <form action="/comment"><div role="main">
            <p>Some sites wrap the whole story in a form element for reasons of their own.</p>
            </div></form>
            </article></body></html>"#;
        let article = extract(html).unwrap();
        assert!(article.html_body.starts_with("<article"));
        assert!(article.html_body.contains("wrap the whole story"));
    }

    #[test]
    fn test_json_and_text_mentioning_tags_are_not_html() {
        assert_eq!(
            extract(r#"{"template": "<div class=\"card\"><p>hello</p></div>"}"#).unwrap_err(),
            ExtractionError::NotHtml
        );
        assert_eq!(
            extract("Release notes: wrap each item in <p> and the list in <div>.").unwrap_err(),
            ExtractionError::NotHtml
        );
    }

    #[test]
    fn test_invalid_utf8_does_not_panic() {
        let mut raw = b"<html><body><article><p>Valid text that is long enough to be kept ".to_vec();
        raw.extend_from_slice(&[0xff, 0xfe]);
        raw.extend_from_slice(b" and more text.</p></article></body></html>");
        let article = ReadabilityExtractor::default().extract(&raw, &url()).unwrap();
        assert!(article.html_body.contains("Valid text"));
    }
}

#[cfg(test)]
mod sniff_tests {
    use super::*;

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html(b"  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html(b"<HTML><BODY>x</BODY></HTML>"));
        assert!(looks_like_html(b"<div>fragment</div>"));
        assert!(!looks_like_html(b"%PDF-1.7"));
        assert!(!looks_like_html(b"a < b and c > d"));
        assert!(looks_like_html(b"\xef\xbb\xbf<!doctype html><p>bom</p>"));
        assert!(!looks_like_html(br#"[{"html": "<div>x</div>"}]"#));
        assert!(!looks_like_html(b"  {\"body\": \"<p>hi</p>\"}"));
        assert!(!looks_like_html(b"Use <p> for paragraphs."));
        assert!(!looks_like_html(b"   \n\t"));
    }
}
