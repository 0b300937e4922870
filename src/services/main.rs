//! Dashboard statistics and activity feed.

use chrono::{DateTime, Utc};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::client::{ClientStatus, ClientSummary};
use crate::dto::main::{DashboardPageData, DashboardStats, RecentActivity, StatusStat};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ClientReader, Freshness};
use crate::services::{ServiceError, ServiceResult, ensure_role};

const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Loads the dashboard. Remote failures produce empty data with an error
/// message instead of failing the page.
pub async fn load_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: DateTime<Utc>,
) -> ServiceResult<DashboardPageData>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let (clients, error) = match repo.list_clients(Freshness::Cached).await {
        Ok(clients) => (clients, None),
        Err(err) => {
            log::error!("Failed to load clients for the dashboard: {err}");
            (Vec::new(), Some(ServiceError::from(err).user_message()))
        }
    };

    Ok(DashboardPageData {
        stats: client_stats(&clients),
        recent: recent_activity(&clients, now),
        error,
    })
}

pub fn client_stats(clients: &[ClientSummary]) -> DashboardStats {
    let total = clients.len();
    let by_status = [
        ClientStatus::Production,
        ClientStatus::Testing,
        ClientStatus::Development,
        ClientStatus::Inactive,
    ]
    .into_iter()
    .map(|status| {
        let count = clients.iter().filter(|c| c.status == status).count();
        StatusStat {
            status: status.as_str(),
            count,
            percent: percent(count, total),
        }
    })
    .collect();

    DashboardStats { total, by_status }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// The most recently updated clients, newest first.
pub fn recent_activity(clients: &[ClientSummary], now: DateTime<Utc>) -> Vec<RecentActivity> {
    let mut dated: Vec<(&ClientSummary, DateTime<Utc>)> = clients
        .iter()
        .filter_map(|c| c.updated_at.map(|at| (c, at)))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1));

    dated
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(client, at)| RecentActivity {
            cuid: client.cuid.clone(),
            name: client.name.clone(),
            action: if client.status == ClientStatus::Production {
                "Client activated"
            } else {
                "Status updated"
            },
            when: relative_time(at, now),
        })
        .collect()
}

/// "N day(s) ago", "N hour(s) ago", or "Recently" within the last hour.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let days = elapsed.num_days();
    let hours = elapsed.num_hours();

    if days > 0 {
        format!("{days} day{} ago", if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("{hours} hour{} ago", if hours == 1 { "" } else { "s" })
    } else {
        "Recently".to_string()
    }
}
