use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};

use crate::domain::client::{ClientData, ClientSummary, NewClient};
use crate::domain::types::ClientCuid;
use crate::models::admin_api::{
    ApiClient, ApiClientPayload, ApiClientSummary, ApiErrorBody, NewClientRequest,
    UpdateClientRequest,
};
use crate::repository::cache::TtlCache;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClientReader, ClientWriter, Freshness};

/// Client records served by the remote admin-data API, with a short-lived cache.
#[derive(Clone)]
pub struct AdminApiRepository {
    client: Client,
    endpoint: String,
    list_timeout: Duration,
    client_timeout: Duration,
    clients: Arc<TtlCache<(), Vec<ClientSummary>>>,
    records: Arc<TtlCache<String, ClientData>>,
}

impl AdminApiRepository {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/getAdminData", base_url.as_ref().trim_end_matches('/')),
            list_timeout: Duration::from_secs(10),
            client_timeout: Duration::from_secs(8),
            clients: Arc::new(TtlCache::new(Duration::from_secs(300))),
            records: Arc::new(TtlCache::new(Duration::from_secs(180))),
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, list: Duration, single: Duration) -> Self {
        self.list_timeout = list;
        self.client_timeout = single;
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, list: Duration, single: Duration) -> Self {
        self.clients = Arc::new(TtlCache::new(list));
        self.records = Arc::new(TtlCache::new(single));
        self
    }

    fn forget(&self, cuid: &ClientCuid) {
        self.clients.clear();
        self.records.invalidate(&cuid.to_string());
    }
}

/// Maps non-success statuses to repository errors, keeping the API's message.
async fn ensure_success(response: Response) -> RepositoryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(RepositoryError::NotFound);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    Err(RepositoryError::Remote {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ClientReader for AdminApiRepository {
    async fn list_clients(&self, freshness: Freshness) -> RepositoryResult<Vec<ClientSummary>> {
        if freshness == Freshness::Cached
            && let Some(clients) = self.clients.get(&())
        {
            return Ok(clients);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.list_timeout)
            .send()
            .await?;
        let items = ensure_success(response)
            .await?
            .json::<Option<Vec<ApiClientSummary>>>()
            .await?
            .unwrap_or_default();

        let clients: Vec<ClientSummary> = items.into_iter().map(ClientSummary::from).collect();
        self.clients.insert((), clients.clone());
        Ok(clients)
    }

    async fn get_client(
        &self,
        cuid: &ClientCuid,
        freshness: Freshness,
    ) -> RepositoryResult<ClientData> {
        let key = cuid.to_string();
        if freshness == Freshness::Cached
            && let Some(data) = self.records.get(&key)
        {
            return Ok(data);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("clientCuid", cuid.as_str())])
            .timeout(self.client_timeout)
            .send()
            .await?;
        let api = ensure_success(response).await?.json::<ApiClient>().await?;

        let mut data = api.into_domain(Utc::now());
        if data.access_key.is_empty() {
            data.access_key = key.clone();
        }
        self.records.insert(key, data.clone());
        Ok(data)
    }
}

#[async_trait]
impl ClientWriter for AdminApiRepository {
    async fn create_client(&self, new_client: &NewClient) -> RepositoryResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NewClientRequest::from(new_client))
            .timeout(self.client_timeout)
            .send()
            .await?;
        ensure_success(response).await?;
        self.clients.clear();
        Ok(())
    }

    async fn update_client(
        &self,
        cuid: &ClientCuid,
        data: &ClientData,
    ) -> RepositoryResult<ClientData> {
        let body = UpdateClientRequest {
            client_cuid: cuid.as_str(),
            data: ApiClientPayload::from(data),
        };
        let response = self
            .client
            .put(&self.endpoint)
            .json(&body)
            .timeout(self.client_timeout)
            .send()
            .await?;
        let bytes = ensure_success(response).await?.bytes().await?;
        self.forget(cuid);

        let saved = if bytes.iter().all(u8::is_ascii_whitespace) {
            data.clone()
        } else {
            serde_json::from_slice::<ApiClient>(&bytes)?.merge_into(data.clone())
        };
        self.records.insert(cuid.to_string(), saved.clone());
        Ok(saved)
    }

    async fn delete_client(&self, cuid: &ClientCuid) -> RepositoryResult<()> {
        let response = self
            .client
            .delete(&self.endpoint)
            .query(&[("clientCuid", cuid.as_str())])
            .timeout(self.client_timeout)
            .send()
            .await?;
        ensure_success(response).await?;
        self.forget(cuid);
        Ok(())
    }
}
