//! DTOs exposed by the JSON API endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::client::ClientSummary;

/// Query parameters accepted by `/api/v1/clients`.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiClientItem {
    pub cuid: String,
    pub name: String,
    pub email: String,
    pub status: &'static str,
    pub integration: &'static str,
    pub last_active: String,
}

impl From<&ClientSummary> for ApiClientItem {
    fn from(summary: &ClientSummary) -> Self {
        Self {
            cuid: summary.cuid.clone(),
            name: summary.name.clone(),
            email: summary.email.clone(),
            status: summary.status.as_str(),
            integration: summary.integration_name(),
            last_active: summary.last_active(),
        }
    }
}
