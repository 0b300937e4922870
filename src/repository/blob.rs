use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use uuid::Uuid;

use crate::models::blob::{DeleteBlobsRequest, UploadedBlob};
use crate::repository::ImageStore;
use crate::repository::errors::{RepositoryError, RepositoryResult};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Image storage on a blob service addressed with a bearer token.
#[derive(Clone)]
pub struct BlobStore {
    client: Client,
    api_url: String,
    token: String,
    public_host: String,
}

impl BlobStore {
    pub fn new(
        api_url: impl AsRef<str>,
        token: impl Into<String>,
        public_host: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.as_ref().trim_end_matches('/').to_string(),
            token: token.into(),
            public_host: public_host.into(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Keeps ASCII letters, digits, dots, dashes and underscores.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

fn url_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    Some(host.split(':').next().unwrap_or(host))
}

#[async_trait]
impl ImageStore for BlobStore {
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RepositoryResult<UploadedBlob> {
        let pathname = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let response = self
            .client
            .put(format!("{}/{pathname}", self.api_url))
            .header(AUTHORIZATION, self.bearer())
            .header(CONTENT_TYPE, content_type)
            .header("x-content-type", content_type)
            .body(bytes)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let blob = response.json::<UploadedBlob>().await?;
        if blob.url.is_empty() {
            return Err(RepositoryError::DecodeError(
                "blob store returned no url".to_string(),
            ));
        }
        Ok(blob)
    }

    async fn delete_image(&self, url: &str) -> RepositoryResult<()> {
        if !self.is_managed_url(url) {
            return Err(RepositoryError::ValidationError(
                "only blob-hosted images can be deleted".to_string(),
            ));
        }

        self.client
            .post(format!("{}/delete", self.api_url))
            .header(AUTHORIZATION, self.bearer())
            .json(&DeleteBlobsRequest { urls: &[url] })
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn is_managed_url(&self, url: &str) -> bool {
        if self.public_host.is_empty() {
            return false;
        }
        url_host(url).is_some_and(|host| {
            host == self.public_host || host.ends_with(&format!(".{}", self.public_host))
        })
    }
}
