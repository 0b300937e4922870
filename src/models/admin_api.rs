//! Wire representations exchanged with the remote admin-data API.
//!
//! Incoming records are read leniently: every field is optional and loosely
//! typed, and conversion into the domain fills the gaps with defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::client::{
    ClientData, ClientPreferences, ClientStatus, ClientSummary, Integration,
    IntegrationCredentials, NewClient,
};
use crate::domain::todo::Todo;

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => Some(n.as_f64().is_some_and(|v| v != 0.0)),
        Some(Value::String(s)) => Some(!s.is_empty()),
        Some(Value::Null) | None => None,
        Some(_) => Some(true),
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .or(Some(0)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        Some(Value::Null) | None => None,
        Some(_) => Some(Vec::new()),
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// Item of `GET /api/getAdminData`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cuid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub integration_id: Option<i64>,
    #[serde(default)]
    pub preferences: Option<ApiSummaryPreferences>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummaryPreferences {
    #[serde(default, deserialize_with = "lenient_string")]
    pub production_url: Option<String>,
}

impl From<ApiClientSummary> for ClientSummary {
    fn from(api: ApiClientSummary) -> Self {
        let id = api.id.unwrap_or_default();
        let cuid = api.cuid.filter(|c| !c.is_empty()).unwrap_or_else(|| id.clone());
        ClientSummary {
            cuid,
            id,
            name: api.name.unwrap_or_default(),
            email: api.email.unwrap_or_default(),
            updated_at: api.updated_at,
            status: ClientStatus::from_wire(api.status.as_deref().unwrap_or_default()),
            integration: api.integration_id.and_then(Integration::from_id),
            production_url: api
                .preferences
                .and_then(|p| p.production_url)
                .filter(|url| !url.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiTodo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ApiTodo {
    fn into_domain(self, index: usize) -> Todo {
        Todo {
            id: self.id.unwrap_or_else(|| format!("todo-{}", index + 1)),
            text: self.text.unwrap_or_default(),
            completed: self.completed.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            completed_at: self.completed_at,
        }
    }
}

impl From<&Todo> for ApiTodo {
    fn from(todo: &Todo) -> Self {
        ApiTodo {
            id: Some(todo.id.clone()),
            text: Some(todo.text.clone()),
            completed: Some(todo.completed),
            created_at: Some(todo.created_at),
            completed_at: todo.completed_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPreferences {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub location_filter: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lodgify_ws_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lodgify_ws_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub heading_font: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_font: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub font_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub currencies: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub img_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub secondary_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub booking_footer_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub button_font_color_on_hover: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub custom_domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub production_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub channel_manager_site_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wix_cms_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub max_guests: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub dev_mode: Option<bool>,
    #[serde(default)]
    pub todos: Option<Vec<ApiTodo>>,
}

macro_rules! overlay {
    ($source:expr, $target:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $source.$field {
                $target.$field = value;
            }
        )+
    };
}

impl ApiPreferences {
    /// Copies every field present on the wire over `target`.
    pub fn overlay(self, target: &mut ClientPreferences) {
        overlay!(self, target;
            location_filter,
            lodgify_ws_url,
            lodgify_ws_id,
            heading_font,
            body_font,
            font_link,
            currencies,
            img_link,
            primary_color,
            secondary_color,
            booking_footer_color,
            button_font_color_on_hover,
            custom_domain,
            production_url,
            channel_manager_site_url,
            wix_cms_url,
            max_guests,
            language,
            dev_mode,
        );
        if let Some(todos) = self.todos {
            target.todos = todos
                .into_iter()
                .enumerate()
                .map(|(index, todo)| todo.into_domain(index))
                .collect();
        }
    }
}

/// Single record from `GET /api/getAdminData?clientCuid=` and the PUT response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClient {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cuid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub access_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(rename = "ApiKey", default, deserialize_with = "lenient_string")]
    pub api_key: Option<String>,
    #[serde(rename = "clientID", default, deserialize_with = "lenient_string")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub client_secret: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub integration_id: Option<i64>,
    #[serde(default)]
    pub preferences: Option<ApiPreferences>,
}

impl ApiClient {
    /// Fields present in `self` override the corresponding fields of `base`,
    /// nested preferences included.
    pub fn merge_into(self, mut base: ClientData) -> ClientData {
        if let Some(status) = self.status {
            base.status = ClientStatus::from_wire(&status);
        }
        if let Some(key) = self.cuid.or(self.access_key) {
            base.access_key = key;
        }
        overlay!(self, base; name, email);
        if self.api_key.is_some() {
            base.api_key = self.api_key;
        }
        if self.client_id.is_some() {
            base.client_id = self.client_id;
        }
        if self.client_secret.is_some() {
            base.client_secret = self.client_secret;
        }
        if self.integration_id.is_some() {
            base.integration_id = self.integration_id;
        }
        if let Some(preferences) = self.preferences {
            preferences.overlay(&mut base.preferences);
        }
        base
    }

    /// Builds a complete record, defaulting whatever the API left out.
    pub fn into_domain(self, now: DateTime<Utc>) -> ClientData {
        let mut data = self.merge_into(ClientData::default());
        data.preferences.ensure_todos(now);
        data
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPreferencesPayload<'a> {
    pub integration_label: &'static str,
    pub location_filter: bool,
    pub lodgify_ws_url: &'a str,
    pub lodgify_ws_id: &'a str,
    pub heading_font: &'a str,
    pub body_font: &'a str,
    pub font_link: &'a str,
    pub currencies: &'a [String],
    pub img_link: &'a str,
    pub primary_color: &'a str,
    pub secondary_color: &'a str,
    pub booking_footer_color: &'a str,
    pub button_font_color_on_hover: &'a str,
    pub custom_domain: &'a str,
    pub production_url: &'a str,
    pub channel_manager_site_url: &'a str,
    pub wix_cms_url: &'a str,
    pub max_guests: u32,
    pub language: &'a str,
    pub dev_mode: bool,
    pub todos: Vec<ApiTodo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientPayload<'a> {
    pub status: &'static str,
    pub access_key: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    #[serde(rename = "ApiKey")]
    pub api_key: &'a str,
    #[serde(rename = "clientID")]
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub integration_id: Option<i64>,
    pub preferences: ApiPreferencesPayload<'a>,
}

impl<'a> From<&'a ClientData> for ApiClientPayload<'a> {
    fn from(data: &'a ClientData) -> Self {
        let prefs = &data.preferences;
        ApiClientPayload {
            status: data.status.as_str(),
            access_key: &data.access_key,
            name: &data.name,
            email: &data.email,
            api_key: data.api_key.as_deref().unwrap_or_default(),
            client_id: data.client_id.as_deref().unwrap_or_default(),
            client_secret: data.client_secret.as_deref().unwrap_or_default(),
            integration_id: data.integration_id,
            preferences: ApiPreferencesPayload {
                integration_label: data.integration_label(),
                location_filter: prefs.location_filter,
                lodgify_ws_url: &prefs.lodgify_ws_url,
                lodgify_ws_id: &prefs.lodgify_ws_id,
                heading_font: &prefs.heading_font,
                body_font: &prefs.body_font,
                font_link: &prefs.font_link,
                currencies: &prefs.currencies,
                img_link: &prefs.img_link,
                primary_color: &prefs.primary_color,
                secondary_color: &prefs.secondary_color,
                booking_footer_color: &prefs.booking_footer_color,
                button_font_color_on_hover: &prefs.button_font_color_on_hover,
                custom_domain: &prefs.custom_domain,
                production_url: &prefs.production_url,
                channel_manager_site_url: &prefs.channel_manager_site_url,
                wix_cms_url: &prefs.wix_cms_url,
                max_guests: prefs.max_guests,
                language: &prefs.language,
                dev_mode: prefs.dev_mode,
                todos: prefs.todos.iter().map(ApiTodo::from).collect(),
            },
        }
    }
}

/// Body of `PUT /api/getAdminData`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest<'a> {
    pub client_cuid: &'a str,
    pub data: ApiClientPayload<'a>,
}

/// Body of `POST /api/getAdminData`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewClientRequest {
    pub name: String,
    pub email: String,
    pub integration_id: i64,
    #[serde(rename = "apikey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "clientID", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl From<&NewClient> for NewClientRequest {
    fn from(client: &NewClient) -> Self {
        let (api_key, client_id, client_secret) = match &client.credentials {
            IntegrationCredentials::ApiKey(key) => (Some(key.to_string()), None, None),
            IntegrationCredentials::OAuthClient {
                client_id,
                client_secret,
            } => (
                None,
                Some(client_id.to_string()),
                Some(client_secret.to_string()),
            ),
        };
        NewClientRequest {
            name: client.name.to_string(),
            email: client.email.to_string(),
            integration_id: client.integration.id(),
            api_key,
            client_id,
            client_secret,
        }
    }
}

/// Error body returned by the admin API on failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn summary_is_read_leniently() {
        let api: ApiClientSummary = serde_json::from_value(json!({
            "id": 7,
            "name": "Chalets",
            "email": "owner@chalets.test",
            "updatedAt": "2024-04-30T08:15:00.000Z",
            "status": "Testing",
            "integrationId": "2",
            "preferences": { "productionUrl": "https://chalets.test" }
        }))
        .unwrap();

        let summary = ClientSummary::from(api);
        assert_eq!(summary.id, "7");
        assert_eq!(summary.cuid, "7");
        assert_eq!(summary.status, ClientStatus::Testing);
        assert_eq!(summary.integration, Some(Integration::Lodgify));
        assert_eq!(summary.last_active(), "2024-04-30");
        assert_eq!(summary.production_url.as_deref(), Some("https://chalets.test"));
    }

    #[test]
    fn missing_fields_get_defaults() {
        let api: ApiClient = serde_json::from_value(json!({
            "cuid": "ck1",
            "name": "Chalets",
            "integrationId": 1,
            "preferences": { "maxGuests": null, "currencies": "USD" }
        }))
        .unwrap();

        let data = api.into_domain(now());
        assert_eq!(data.access_key, "ck1");
        assert_eq!(data.status, ClientStatus::Inactive);
        assert_eq!(data.email, "");
        assert_eq!(data.preferences.max_guests, 0);
        assert!(data.preferences.currencies.is_empty());
        assert_eq!(data.preferences.todos.len(), 10);
        assert_eq!(data.integration_label(), "guesty");
    }

    #[test]
    fn response_fields_override_the_edited_copy() {
        let mut edited = ClientData {
            name: "Edited".into(),
            email: "edited@test.dev".into(),
            ..ClientData::default()
        };
        edited.preferences.heading_font = "Lora".into();
        edited.preferences.body_font = "Inter".into();

        let response: ApiClient = serde_json::from_value(json!({
            "name": "Server",
            "preferences": { "headingFont": "Roboto" }
        }))
        .unwrap();

        let merged = response.merge_into(edited);
        assert_eq!(merged.name, "Server");
        assert_eq!(merged.email, "edited@test.dev");
        assert_eq!(merged.preferences.heading_font, "Roboto");
        assert_eq!(merged.preferences.body_font, "Inter");
    }

    #[test]
    fn outgoing_payload_recomputes_integration_label() {
        let data = ClientData {
            access_key: "ck1".into(),
            integration_id: Some(3),
            ..ClientData::default()
        };
        let body = serde_json::to_value(UpdateClientRequest {
            client_cuid: "ck1",
            data: ApiClientPayload::from(&data),
        })
        .unwrap();

        assert_eq!(body["clientCuid"], "ck1");
        assert_eq!(body["data"]["accessKey"], "ck1");
        assert_eq!(body["data"]["integrationId"], 3);
        assert_eq!(body["data"]["preferences"]["integrationLabel"], "hostaway");
        assert_eq!(body["data"]["status"], "Inactive");
    }

    #[test]
    fn error_body_prefers_error_field() {
        let body: ApiErrorBody =
            serde_json::from_value(json!({ "error": "Client not found", "message": "x" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Client not found"));
        assert_eq!(ApiErrorBody::default().into_message(), None);
    }
}
