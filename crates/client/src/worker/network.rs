//! The network seam used by the worker.

use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{Error, StoredResponse};

use super::request::InterceptedRequest;
use crate::fetch::FetchClient;

/// Sends a request to the network and returns whatever came back.
///
/// Only transport failures are errors; a 404 or 500 is a response.
#[async_trait]
pub trait Network: Send + Sync {
    async fn send(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error>;
}

#[async_trait]
impl Network for FetchClient {
    async fn send(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error> {
        let response = self
            .forward(&request.method, &request.url, &request.headers, request.body.clone())
            .await?;
        Ok(response.into_stored())
    }
}

#[async_trait]
impl<T: Network + ?Sized> Network for Arc<T> {
    async fn send(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error> {
        (**self).send(request).await
    }
}
