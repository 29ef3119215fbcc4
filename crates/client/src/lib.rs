//! Client code for folio.
//!
//! This crate provides the HTTP fetch pipeline, the link preview fetcher,
//! and the offline worker's cache dispatcher used by the edge server.

pub mod fetch;
pub mod preview;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use preview::{OgMetadata, PreviewFetcher, extract_metadata, resolve_url};
pub use worker::{
    CacheDispatcher, Destination, DispatchError, InterceptedRequest, Network, Outcome, Strategy, WorkerConfig,
    WorkerState,
};
