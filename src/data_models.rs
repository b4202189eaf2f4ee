use serde::{Deserialize, Serialize};

/// Normalized output of the page-reading pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub content: String,
}

impl PageContent {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> PageContent {
        PageContent {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Main readable portion of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub html_body: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnswer {
    pub output: String,
    pub token_count: i64,
    /// Order drives citation numbering.
    pub references: Vec<Reference>,
}

/// Search payload handed back to callers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchDigest {
    pub content: String,
}

// FastGPT wire format

#[derive(Deserialize, Debug, Clone)]
pub struct FastGptResults {
    #[serde(default)]
    pub meta: Option<FastGptMeta>,
    pub data: FastGptData,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FastGptMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub ms: i64,
    #[serde(default)]
    pub api_balance: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FastGptData {
    pub output: String,
    #[serde(default)]
    pub tokens: i64,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl From<FastGptData> for SearchAnswer {
    fn from(data: FastGptData) -> SearchAnswer {
        SearchAnswer {
            output: data.output,
            token_count: data.tokens,
            references: data.references,
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct FastGptRequest<'a> {
    pub query: &'a str,
}
