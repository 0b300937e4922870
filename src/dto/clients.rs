use serde::{Deserialize, Serialize};

use crate::domain::client::ClientSummary;
use crate::pagination::Paginated;

/// Query string of the clients page.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ClientsQuery {
    pub search: Option<String>,
    /// `all` or a status name.
    pub status: Option<String>,
    /// `all`, an integration label or `unknown`.
    pub integration: Option<String>,
    /// Comma separated keys, `-` prefix for descending.
    pub sort: Option<String>,
    pub page: Option<usize>,
    /// Bypass the cached list.
    pub refresh: Option<bool>,
}

/// Client list row as shown in the table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientRow {
    pub cuid: String,
    pub name: String,
    pub email: String,
    pub status: &'static str,
    pub integration: &'static str,
    pub last_active: String,
    pub production_url: Option<String>,
    /// `None` until the site has been probed.
    pub reachable: Option<bool>,
}

impl ClientRow {
    pub fn new(summary: &ClientSummary, reachable: Option<bool>) -> Self {
        Self {
            cuid: summary.cuid.clone(),
            name: summary.name.clone(),
            email: summary.email.clone(),
            status: summary.status.as_str(),
            integration: summary.integration_name(),
            last_active: summary.last_active(),
            production_url: summary.production_url.clone(),
            reachable,
        }
    }
}

/// Filters echoed back to the template.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppliedFilters {
    pub search: String,
    pub status: String,
    pub integration: String,
    pub sort: String,
}

/// Data required to render the clients template.
#[derive(Debug, Serialize)]
pub struct ClientsPageData {
    pub clients: Paginated<ClientRow>,
    pub shown: usize,
    pub filtered_total: usize,
    pub total: usize,
    pub filters: AppliedFilters,
    pub error: Option<String>,
}
