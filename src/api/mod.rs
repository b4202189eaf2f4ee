use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, ConfigError, ConverterKind};
use crate::converter::{MarkdownConverter, MarkupConverter, PlainTextConverter};
use crate::extractor::ReadabilityExtractor;
use crate::fetcher::HttpFetcher;
use crate::reader::PageReader;
use crate::search::FastGptClient;

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<PageReader>,
    pub search: Arc<FastGptClient>,
}

impl AppState {
    pub fn new(reader: PageReader, search: FastGptClient) -> AppState {
        AppState {
            reader: Arc::new(reader),
            search: Arc::new(search),
        }
    }

    /// Wires the default engines from configuration.
    pub fn from_config(config: &Config) -> reqwest::Result<AppState> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        let converter: Arc<dyn MarkupConverter> = match config.converter {
            ConverterKind::Markdown => Arc::new(MarkdownConverter),
            ConverterKind::Text => Arc::new(PlainTextConverter {
                width: config.text_width,
            }),
        };
        let reader = PageReader::new(
            Arc::new(HttpFetcher::new(client.clone(), config.fetch_timeout)),
            Arc::new(ReadabilityExtractor::default()),
            converter,
        );
        let search = FastGptClient::new(client, config.fastgpt_api_url.clone(), config.search_timeout);

        Ok(AppState::new(reader, search))
    }
}

pub fn plugin_routes() -> Router<AppState> {
    Router::new()
        .route("/web-page-reader/get-content", get(handlers::get_content_handler))
        .route("/web-search/fastgpt", get(handlers::fastgpt_handler))
}

pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|_| ConfigError::Invalid {
                key: "CORS_ALLOW_ORIGINS",
                value: o.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

pub fn create_router(state: AppState, config: &Config) -> Result<Router, ConfigError> {
    let routes = plugin_routes().layer(cors_layer(&config.cors_allow_origins)?);

    let router = match config.route_prefix() {
        Some(prefix) => Router::new().nest(&prefix, routes),
        None => routes,
    };

    Ok(router.layer(TraceLayer::new_for_http()).with_state(state))
}
