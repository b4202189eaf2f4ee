pub mod api;
pub mod config;
pub mod converter;
pub mod data_models;
pub mod extractor;
pub mod fetcher;
pub mod formatter;
pub mod reader;
pub mod search;
