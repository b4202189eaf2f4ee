use once_cell::sync::Lazy;
use std::fmt::{self, Write};

use crate::data_models::SearchAnswer;

/// Fixed text of the digest around the query, answer and citations.
#[derive(Debug)]
struct DigestLayout {
    rule: &'static str,
    query_label: &'static str,
    references_label: &'static str,
}

/// Built once, shared read-only by every request.
static LAYOUT: Lazy<DigestLayout> = Lazy::new(|| DigestLayout {
    rule: "-----",
    query_label: "Results for search query",
    references_label: "References:",
});

impl DigestLayout {
    fn write_digest(&self, out: &mut impl Write, query: &str, answer: &SearchAnswer) -> fmt::Result {
        writeln!(out, "{}", self.rule)?;
        writeln!(out, "{} \"{query}\"", self.query_label)?;
        writeln!(out, "{}", self.rule)?;
        writeln!(out, "{}", answer.output)?;
        writeln!(out)?;
        write!(out, "{}", self.references_label)?;
        for (i, reference) in answer.references.iter().enumerate() {
            write!(out, "\n[{}]: {} ({})", i + 1, reference.title, reference.url)?;
        }
        writeln!(out)
    }
}

/// Forces the layout to be built; call once at startup.
pub fn init() {
    Lazy::force(&LAYOUT);
}

/// Renders a search answer as a citation-annotated digest.
pub fn format(query: &str, answer: &SearchAnswer) -> String {
    let mut out = String::with_capacity(answer.output.len() + 128);
    // writing into a String cannot fail
    if let Err(e) = LAYOUT.write_digest(&mut out, query, answer) {
        log::error!("failed to render search digest: {e}");
    }
    out
}
