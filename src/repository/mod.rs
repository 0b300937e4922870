//! Access to the remote systems backing the dashboard.

use async_trait::async_trait;

use crate::domain::client::{ClientData, ClientSummary, NewClient};
use crate::domain::types::ClientCuid;
use crate::models::blob::UploadedBlob;
use crate::repository::errors::RepositoryResult;

pub mod admin_api;
pub mod blob;
pub mod cache;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod probe;

pub use admin_api::AdminApiRepository;
pub use blob::BlobStore;
pub use probe::HttpProbe;

/// Whether a read may be answered from the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    Cached,
    Refresh,
}

#[async_trait]
pub trait ClientReader: Send + Sync {
    async fn list_clients(&self, freshness: Freshness) -> RepositoryResult<Vec<ClientSummary>>;
    async fn get_client(
        &self,
        cuid: &ClientCuid,
        freshness: Freshness,
    ) -> RepositoryResult<ClientData>;
}

#[async_trait]
pub trait ClientWriter: Send + Sync {
    async fn create_client(&self, new_client: &NewClient) -> RepositoryResult<()>;
    /// Replaces the whole record and returns it as the API echoed it back.
    async fn update_client(
        &self,
        cuid: &ClientCuid,
        data: &ClientData,
    ) -> RepositoryResult<ClientData>;
    async fn delete_client(&self, cuid: &ClientCuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RepositoryResult<UploadedBlob>;
    async fn delete_image(&self, url: &str) -> RepositoryResult<()>;
    /// Whether the URL points at an object this store can delete.
    fn is_managed_url(&self, url: &str) -> bool;
}

#[async_trait]
pub trait UrlProbe: Send + Sync {
    /// Any HTTP response counts as reachable.
    async fn is_reachable(&self, url: &str) -> bool;
}
