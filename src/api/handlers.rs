use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
};

use crate::data_models::{PageContent, SearchDigest};
use crate::fetcher::FetchError;
use crate::formatter;
use crate::reader::PageOutcome;

use super::AppState;
use super::models::{MSG_FETCHED, MSG_FETCHED_FALLBACK, ReaderParams, SearchParams, ServiceResponse};

pub const API_KEY_HEADER: &str = "Kagi-API-Key";

pub async fn get_content_handler(
    State(state): State<AppState>,
    params: Result<Query<ReaderParams>, QueryRejection>,
) -> ServiceResponse<PageContent> {
    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => return ServiceResponse::error(StatusCode::BAD_REQUEST, e.body_text()),
    };
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return ServiceResponse::error(StatusCode::BAD_REQUEST, "`url` query parameter missing");
    };

    let outcome = state.reader.read(&url).await;
    let message = match outcome {
        PageOutcome::RawFallback(_) => MSG_FETCHED_FALLBACK,
        _ => MSG_FETCHED,
    };
    match outcome.into_result() {
        Ok(content) => ServiceResponse::ok(message, content),
        Err(e @ FetchError::InvalidUrl { .. }) => ServiceResponse::error(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => ServiceResponse::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn fastgpt_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ServiceResponse<SearchDigest> {
    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => return ServiceResponse::error(StatusCode::BAD_REQUEST, e.body_text()),
    };
    let Some(query) = params.q.filter(|q| !q.trim().is_empty()) else {
        return ServiceResponse::error(StatusCode::BAD_REQUEST, "`q` query parameter missing");
    };

    let key = match headers.get(API_KEY_HEADER).map(|v| v.to_str()) {
        Some(Ok(key)) if !key.trim().is_empty() => key.trim().to_string(),
        Some(Err(_)) => {
            return ServiceResponse::error(
                StatusCode::BAD_REQUEST,
                format!("`{API_KEY_HEADER}` header is not valid text"),
            );
        }
        _ => {
            return ServiceResponse::error(
                StatusCode::BAD_REQUEST,
                format!("`{API_KEY_HEADER}` header missing"),
            );
        }
    };

    match state.search.search(&query, &key).await {
        Ok(answer) => {
            log::debug!(
                "fastgpt answer for {query:?}: {} tokens, {} references",
                answer.token_count,
                answer.references.len()
            );
            ServiceResponse::ok(
                MSG_FETCHED,
                SearchDigest {
                    content: formatter::format(&query, &answer),
                },
            )
        }
        Err(e) if e.is_caller_error() => ServiceResponse::error(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            log::error!("fastgpt search failed: {e}");
            ServiceResponse::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
