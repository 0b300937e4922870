//! Background probing of client production sites.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::future::join_all;

use crate::domain::client::ClientSummary;
use crate::repository::{ClientReader, Freshness, UrlProbe};

/// Latest probe result per production URL.
#[derive(Clone, Debug, Default)]
pub struct ReachabilityBoard {
    results: Arc<RwLock<HashMap<String, bool>>>,
}

impl ReachabilityBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the URL has not been probed yet.
    pub fn status(&self, url: &str) -> Option<bool> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
    }

    pub fn record(&self, url: String, reachable: bool) {
        self.results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, reachable);
    }

    /// Probes every distinct production URL concurrently.
    pub async fn refresh<P>(&self, probe: &P, clients: &[ClientSummary])
    where
        P: UrlProbe + ?Sized,
    {
        let mut urls: Vec<&str> = clients
            .iter()
            .filter_map(|c| c.production_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .collect();
        urls.sort_unstable();
        urls.dedup();

        let results = join_all(urls.iter().map(|url| probe.is_reachable(url))).await;
        for (url, reachable) in urls.into_iter().zip(results) {
            self.record(url.to_string(), reachable);
        }
    }
}

/// Re-probes all production sites every `interval` on the current actix runtime.
pub fn spawn_probe_loop<R, P>(
    board: ReachabilityBoard,
    repo: Arc<R>,
    probe: Arc<P>,
    interval: Duration,
) where
    R: ClientReader + 'static,
    P: UrlProbe + 'static,
{
    if interval.is_zero() {
        log::info!("Reachability probing disabled");
        return;
    }

    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(interval);
        loop {
            ticker.tick().await;
            match repo.list_clients(Freshness::Cached).await {
                Ok(clients) => board.refresh(probe.as_ref(), &clients).await,
                Err(err) => log::warn!("Skipping reachability probe: {err}"),
            }
        }
    });
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::client::ClientStatus;
    use crate::repository::mock::MockProbe;

    fn summary(cuid: &str, url: Option<&str>) -> ClientSummary {
        ClientSummary {
            id: cuid.into(),
            cuid: cuid.into(),
            name: cuid.into(),
            email: format!("{cuid}@example.com"),
            updated_at: None,
            status: ClientStatus::Production,
            integration: None,
            production_url: url.map(str::to_string),
        }
    }

    #[actix_web::test]
    async fn refresh_records_each_distinct_url_once() {
        let mut probe = MockProbe::new();
        probe
            .expect_is_reachable()
            .withf(|url| url == "https://up.example")
            .times(1)
            .returning(|_| true);
        probe
            .expect_is_reachable()
            .withf(|url| url == "https://down.example")
            .times(1)
            .returning(|_| false);

        let board = ReachabilityBoard::new();
        let clients = vec![
            summary("a", Some("https://up.example")),
            summary("b", Some("https://up.example")),
            summary("c", Some("https://down.example")),
            summary("d", None),
            summary("e", Some("  ")),
        ];

        board.refresh(&probe, &clients).await;

        assert_eq!(board.status("https://up.example"), Some(true));
        assert_eq!(board.status("https://down.example"), Some(false));
        assert_eq!(board.status("https://unknown.example"), None);
    }
}
