//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::client::{ClientData, ClientSummary, NewClient};
use crate::domain::types::ClientCuid;
use crate::models::blob::UploadedBlob;
use crate::repository::errors::RepositoryResult;
use crate::repository::{ClientReader, ClientWriter, Freshness, ImageStore, UrlProbe};

mock! {
    pub Repository {}

    #[async_trait]
    impl ClientReader for Repository {
        async fn list_clients(&self, freshness: Freshness) -> RepositoryResult<Vec<ClientSummary>>;
        async fn get_client(
            &self,
            cuid: &ClientCuid,
            freshness: Freshness,
        ) -> RepositoryResult<ClientData>;
    }

    #[async_trait]
    impl ClientWriter for Repository {
        async fn create_client(&self, new_client: &NewClient) -> RepositoryResult<()>;
        async fn update_client(
            &self,
            cuid: &ClientCuid,
            data: &ClientData,
        ) -> RepositoryResult<ClientData>;
        async fn delete_client(&self, cuid: &ClientCuid) -> RepositoryResult<()>;
    }
}

mock! {
    pub Images {}

    #[async_trait]
    impl ImageStore for Images {
        async fn upload_image(
            &self,
            file_name: &str,
            content_type: &str,
            bytes: Vec<u8>,
        ) -> RepositoryResult<UploadedBlob>;
        async fn delete_image(&self, url: &str) -> RepositoryResult<()>;
        fn is_managed_url(&self, url: &str) -> bool;
    }
}

mock! {
    pub Probe {}

    #[async_trait]
    impl UrlProbe for Probe {
        async fn is_reachable(&self, url: &str) -> bool;
    }
}
