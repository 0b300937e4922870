//! Client list browsing and lifecycle.

use std::cmp::Ordering;

use crate::domain::client::{ClientStatus, ClientSummary, Integration, NewClient};
use crate::dto::clients::{AppliedFilters, ClientRow, ClientsPageData, ClientsQuery};
use crate::forms::clients::{AddClientForm, RemoveClientsForm, RemoveClientsPayload};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ClientReader, ClientWriter, Freshness};
use crate::services::reachability::ReachabilityBoard;
use crate::services::{ServiceError, ServiceResult, ensure_role};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

pub const DEFAULT_SORT: &str = "-updated,status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Email,
    Integration,
    Status,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// Parses `"-updated,status"` style sort strings. Unknown keys are skipped and
/// an empty result falls back to [`DEFAULT_SORT`].
pub fn parse_sort(sort: &str) -> Vec<SortKey> {
    let keys: Vec<SortKey> = sort
        .split(',')
        .filter_map(|raw| {
            let raw = raw.trim();
            let (descending, name) = match raw.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let field = match name.to_ascii_lowercase().as_str() {
                "name" => SortField::Name,
                "email" => SortField::Email,
                "integration" => SortField::Integration,
                "status" => SortField::Status,
                "updated" | "updatedat" | "last_active" => SortField::Updated,
                _ => return None,
            };
            Some(SortKey { field, descending })
        })
        .collect();

    if keys.is_empty() && sort != DEFAULT_SORT {
        parse_sort(DEFAULT_SORT)
    } else {
        keys
    }
}

fn compare_by(field: SortField, a: &ClientSummary, b: &ClientSummary) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        SortField::Integration => a.integration_name().cmp(b.integration_name()),
        SortField::Status => a.status.sort_rank().cmp(&b.status.sort_rank()),
        SortField::Updated => a.updated_at.cmp(&b.updated_at),
    }
}

/// Stable multi-key sort; later keys break ties of earlier ones.
pub fn sort_clients(clients: &mut [ClientSummary], keys: &[SortKey]) {
    clients.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ordering = compare_by(key.field, a, b);
                if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Row filter built from the page query.
#[derive(Debug, Default, Clone)]
pub struct ClientFilter {
    search: String,
    status: Option<ClientStatus>,
    integration: IntegrationFilter,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum IntegrationFilter {
    #[default]
    All,
    Known(Integration),
    Unknown,
}

impl ClientFilter {
    pub fn new(search: &str, status: &str, integration: &str) -> Self {
        let status = ClientStatus::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(status.trim()));
        let integration = match integration.trim().to_ascii_lowercase().as_str() {
            "unknown" => IntegrationFilter::Unknown,
            label => Integration::from_label(label)
                .map_or(IntegrationFilter::All, IntegrationFilter::Known),
        };
        Self {
            search: search.trim().to_lowercase(),
            status,
            integration,
        }
    }

    pub fn matches(&self, client: &ClientSummary) -> bool {
        if self.status.is_some_and(|status| client.status != status) {
            return false;
        }
        let integration_ok = match self.integration {
            IntegrationFilter::All => true,
            IntegrationFilter::Known(integration) => client.integration == Some(integration),
            IntegrationFilter::Unknown => client.integration.is_none(),
        };
        if !integration_ok {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        [
            client.name.as_str(),
            client.email.as_str(),
            client.integration_name(),
            client.status.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.search))
    }
}

/// Loads, filters, sorts and paginates the client list. Remote failures
/// produce an empty page carrying the error message.
pub async fn load_clients_page<R>(
    repo: &R,
    board: &ReachabilityBoard,
    user: &AuthenticatedUser,
    query: ClientsQuery,
) -> ServiceResult<ClientsPageData>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let filters = AppliedFilters {
        search: query.search.unwrap_or_default().trim().to_string(),
        status: query.status.unwrap_or_else(|| "all".to_string()),
        integration: query.integration.unwrap_or_else(|| "all".to_string()),
        sort: query
            .sort
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SORT.to_string()),
    };

    let freshness = if query.refresh.unwrap_or(false) {
        Freshness::Refresh
    } else {
        Freshness::Cached
    };

    let (clients, error) = match repo.list_clients(freshness).await {
        Ok(clients) => (clients, None),
        Err(err) => {
            log::error!("Failed to list clients: {err}");
            (Vec::new(), Some(ServiceError::from(err).user_message()))
        }
    };
    let total = clients.len();

    let filter = ClientFilter::new(&filters.search, &filters.status, &filters.integration);
    let mut filtered: Vec<ClientSummary> =
        clients.into_iter().filter(|c| filter.matches(c)).collect();
    sort_clients(&mut filtered, &parse_sort(&filters.sort));
    let filtered_total = filtered.len();

    let rows = filtered
        .iter()
        .map(|client| {
            let reachable = client
                .production_url
                .as_deref()
                .and_then(|url| board.status(url.trim()));
            ClientRow::new(client, reachable)
        })
        .collect();
    let clients = Paginated::from_items(rows, query.page.unwrap_or(1), DEFAULT_ITEMS_PER_PAGE);

    Ok(ClientsPageData {
        shown: clients.items.len(),
        clients,
        filtered_total,
        total,
        filters,
        error,
    })
}

/// Validates the add-client form and creates the client remotely.
pub async fn add_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddClientForm,
) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let new_client = NewClient::try_from(form)?;

    repo.create_client(&new_client).await.map_err(|err| {
        log::error!("Failed to add a client: {err}");
        ServiceError::from(err)
    })
}

/// Deletes the selected clients one by one, stopping at the first failure.
/// Returns how many were removed.
pub async fn remove_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: RemoveClientsForm,
) -> ServiceResult<usize>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let payload = RemoveClientsPayload::try_from(form)?;

    for (removed, cuid) in payload.cuids.iter().enumerate() {
        if let Err(err) = repo.delete_client(cuid).await {
            log::error!("Failed to remove client {cuid}: {err}");
            let reason = ServiceError::from(err).user_message();
            return Err(ServiceError::Form(format!(
                "Removed {removed} client(s); failed to remove {cuid}: {reason}"
            )));
        }
    }

    Ok(payload.cuids.len())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn summary(
        name: &str,
        status: ClientStatus,
        integration: Option<Integration>,
        day: u32,
    ) -> ClientSummary {
        ClientSummary {
            id: name.to_lowercase(),
            cuid: name.to_lowercase(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap()),
            status,
            integration,
            production_url: None,
        }
    }

    fn fixtures() -> Vec<ClientSummary> {
        vec![
            summary("Alpine", ClientStatus::Testing, Some(Integration::Guesty), 3),
            summary("Bay", ClientStatus::Production, Some(Integration::Lodgify), 1),
            summary("Cove", ClientStatus::Production, None, 3),
            summary("Dune", ClientStatus::Inactive, Some(Integration::Hostaway), 2),
        ]
    }

    fn names(clients: &[ClientSummary]) -> Vec<&str> {
        clients.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn sort_string_parsing() {
        assert_eq!(
            parse_sort("-updated,status"),
            vec![
                SortKey {
                    field: SortField::Updated,
                    descending: true
                },
                SortKey {
                    field: SortField::Status,
                    descending: false
                },
            ]
        );
        assert_eq!(parse_sort("bogus"), parse_sort(DEFAULT_SORT));
        assert_eq!(parse_sort(" name , -bogus ").len(), 1);
    }

    #[test]
    fn default_sort_is_newest_then_status_rank() {
        let mut clients = fixtures();
        sort_clients(&mut clients, &parse_sort(DEFAULT_SORT));
        assert_eq!(names(&clients), vec!["Cove", "Alpine", "Dune", "Bay"]);
    }

    #[test]
    fn descending_name_sort() {
        let mut clients = fixtures();
        sort_clients(&mut clients, &parse_sort("-name"));
        assert_eq!(names(&clients), vec!["Dune", "Cove", "Bay", "Alpine"]);
    }

    #[test]
    fn filters_combine_search_status_and_integration() {
        let clients = fixtures();
        let apply = |filter: ClientFilter| -> Vec<&str> {
            clients
                .iter()
                .filter(|c| filter.matches(c))
                .map(|c| c.name.as_str())
                .collect()
        };

        assert_eq!(apply(ClientFilter::new("", "all", "all")).len(), 4);
        assert_eq!(apply(ClientFilter::new("", "production", "all")), vec!["Bay", "Cove"]);
        assert_eq!(apply(ClientFilter::new("", "all", "unknown")), vec!["Cove"]);
        assert_eq!(apply(ClientFilter::new("", "all", "hostaway")), vec!["Dune"]);
        assert_eq!(apply(ClientFilter::new("LODGIFY", "all", "all")), vec!["Bay"]);
        assert_eq!(apply(ClientFilter::new("inactive", "all", "all")), vec!["Dune"]);
        assert_eq!(apply(ClientFilter::new("bay@", "Testing", "all")).len(), 0);
    }
}
