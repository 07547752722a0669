//! Domain services module

pub mod crawling_services;

pub use crawling_services::{
    CatalogSink, FetchError, FetchedPage, PageSource, RecordExtractor, RunArtifacts, SinkError,
};
