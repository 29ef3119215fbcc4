//! Link preview fetching.
//!
//! Given a URL supplied by a caller, fetch its HTML once and extract a
//! best-effort set of Open Graph fields for a hover card. Each field is
//! independently optional; partial extraction is not an error.

pub mod meta;
pub mod resolve;

pub use meta::{extract_metadata, meta_content};
pub use resolve::resolve_url;

use folio_core::Error;
use serde::{Deserialize, Serialize};

use crate::fetch::{FetchClient, FetchConfig, parse_target};

/// Preview metadata for one page. `None` fields are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Fetches pages and turns them into [`OgMetadata`].
pub struct PreviewFetcher {
    client: FetchClient,
}

impl PreviewFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        Ok(Self { client: FetchClient::new(config)? })
    }

    /// Fetch `input` and extract its preview metadata.
    ///
    /// Exactly one outbound request is made; nothing is retried.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidUrl` if `input` is not an absolute http(s) URL
    ///   (no request is made)
    /// - `Error::SsrfBlocked`, `Error::FetchTimeout`, `Error::HttpError`,
    ///   or `Error::FetchTooLarge` from the fetch itself
    pub async fn preview(&self, input: &str) -> Result<OgMetadata, Error> {
        let target = parse_target(input).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self.client.fetch(&target).await?;
        let html = response.text();

        let metadata = extract_metadata(&html, &target, input.trim());
        tracing::debug!(url = %target, fetch_ms = response.fetch_ms, has_title = metadata.title.is_some(), "extracted preview");

        Ok(metadata)
    }
}
