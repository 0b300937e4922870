use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::todo::Todo;
use crate::domain::types::{ClientEmail, ClientName, Credential};

/// Lifecycle state of a client as reported by the admin API.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ClientStatus {
    Production,
    Testing,
    Development,
    #[default]
    Inactive,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 4] = [
        ClientStatus::Production,
        ClientStatus::Testing,
        ClientStatus::Development,
        ClientStatus::Inactive,
    ];

    /// Unknown values are treated as inactive.
    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "Production" => ClientStatus::Production,
            "Testing" => ClientStatus::Testing,
            "Development" => ClientStatus::Development,
            _ => ClientStatus::Inactive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Production => "Production",
            ClientStatus::Testing => "Testing",
            ClientStatus::Development => "Development",
            ClientStatus::Inactive => "Inactive",
        }
    }

    /// Position used when sorting by status.
    pub fn sort_rank(&self) -> u8 {
        match self {
            ClientStatus::Production => 1,
            ClientStatus::Testing => 2,
            ClientStatus::Development => 3,
            ClientStatus::Inactive => 4,
        }
    }
}

impl Display for ClientStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream booking system a client is connected to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Integration {
    Guesty,
    Lodgify,
    Hostaway,
}

impl Integration {
    pub const ALL: [Integration; 3] = [
        Integration::Guesty,
        Integration::Lodgify,
        Integration::Hostaway,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Integration::Guesty),
            2 => Some(Integration::Lodgify),
            3 => Some(Integration::Hostaway),
            _ => None,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Integration::Guesty => 1,
            Integration::Lodgify => 2,
            Integration::Hostaway => 3,
        }
    }

    /// Lower-case label sent to the hosted widget as `INTEGRATION_TYPE`.
    pub fn label(&self) -> &'static str {
        match self {
            Integration::Guesty => "guesty",
            Integration::Lodgify => "lodgify",
            Integration::Hostaway => "hostaway",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Integration::Guesty => "Guesty",
            Integration::Lodgify => "Lodgify",
            Integration::Hostaway => "Hostaway",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|integration| integration.label().eq_ignore_ascii_case(value.trim()))
    }

    /// Lodgify authenticates with an API key, the others with OAuth client credentials.
    pub fn uses_api_key(&self) -> bool {
        matches!(self, Integration::Lodgify)
    }
}

/// Display name for an optional integration.
pub fn integration_display_name(integration: Option<Integration>) -> &'static str {
    integration.map_or("Unknown", |i| i.display_name())
}

/// Row of the client list.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClientSummary {
    pub id: String,
    pub cuid: String,
    pub name: String,
    pub email: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: ClientStatus,
    pub integration: Option<Integration>,
    pub production_url: Option<String>,
}

impl ClientSummary {
    pub fn integration_name(&self) -> &'static str {
        integration_display_name(self.integration)
    }

    /// Date part of the last update, as shown in the list.
    pub fn last_active(&self) -> String {
        self.updated_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Styling and integration settings that drive the generated widget code.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientPreferences {
    pub location_filter: bool,
    pub lodgify_ws_url: String,
    pub lodgify_ws_id: String,
    pub heading_font: String,
    pub body_font: String,
    pub font_link: String,
    pub currencies: Vec<String>,
    pub img_link: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub booking_footer_color: String,
    pub button_font_color_on_hover: String,
    pub custom_domain: String,
    pub production_url: String,
    pub channel_manager_site_url: String,
    pub wix_cms_url: String,
    pub max_guests: u32,
    pub language: String,
    pub dev_mode: bool,
    pub todos: Vec<Todo>,
}

/// Full record of one client tenant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientData {
    pub status: ClientStatus,
    /// The client's cuid.
    pub access_key: String,
    pub name: String,
    pub email: String,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub integration_id: Option<i64>,
    pub preferences: ClientPreferences,
}

impl ClientData {
    pub fn integration(&self) -> Option<Integration> {
        self.integration_id.and_then(Integration::from_id)
    }

    /// Always derived from `integration_id`; empty for unknown ids.
    pub fn integration_label(&self) -> &'static str {
        self.integration().map_or("", |i| i.label())
    }

    pub fn integration_name(&self) -> &'static str {
        integration_display_name(self.integration())
    }
}

/// Credentials required to connect a new client to its integration.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegrationCredentials {
    ApiKey(Credential),
    OAuthClient {
        client_id: Credential,
        client_secret: Credential,
    },
}

/// Validated input for creating a client on the admin API.
#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub name: ClientName,
    pub email: ClientEmail,
    pub integration: Integration,
    pub credentials: IntegrationCredentials,
}
