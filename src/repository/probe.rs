use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::repository::UrlProbe;

/// Checks whether a production site answers HTTP requests at all.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    async fn answers(&self, url: &str) -> bool {
        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(_) => true,
            Err(err) => {
                log::debug!("Probe of {url} failed: {err}");
                false
            }
        }
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        let base = url.trim_end_matches('/');
        self.answers(&format!("{base}/favicon.ico")).await || self.answers(url).await
    }
}
