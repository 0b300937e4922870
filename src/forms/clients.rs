//! Forms for adding and removing clients.

use serde::Deserialize;

use crate::domain::client::{Integration, IntegrationCredentials, NewClient};
use crate::domain::types::{ClientCuid, ClientEmail, ClientName, Credential};
use crate::forms::{FormError, non_blank};

/// New client details with the credentials for the chosen integration.
#[derive(Debug, Deserialize)]
pub struct AddClientForm {
    pub name: String,
    pub email: String,
    /// Integration id as submitted by the select box.
    pub integration_id: String,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl TryFrom<AddClientForm> for NewClient {
    type Error = FormError;

    fn try_from(form: AddClientForm) -> Result<Self, Self::Error> {
        let name = ClientName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let email = ClientEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?;
        let integration = form
            .integration_id
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(Integration::from_id)
            .ok_or(FormError::InvalidIntegration)?;

        let credential = |value: Option<String>, label: &'static str| {
            non_blank(value)
                .and_then(|v| Credential::new(v).ok())
                .ok_or(FormError::MissingCredential(label))
        };

        let credentials = if integration.uses_api_key() {
            IntegrationCredentials::ApiKey(credential(form.api_key, "API key")?)
        } else {
            IntegrationCredentials::OAuthClient {
                client_id: credential(form.client_id, "Client ID")?,
                client_secret: credential(form.client_secret, "Client secret")?,
            }
        };

        Ok(NewClient {
            name,
            email,
            integration,
            credentials,
        })
    }
}

/// Selection of clients to delete. Decoded with `serde_html_form` so the
/// repeated `cuids` checkboxes collect into a list.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveClientsForm {
    #[serde(default)]
    pub cuids: Vec<String>,
}

impl RemoveClientsForm {
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, FormError> {
        serde_html_form::from_bytes(body).map_err(|_| FormError::Malformed)
    }
}

/// Validated, de-duplicated list of clients to delete, in submission order.
#[derive(Debug)]
pub struct RemoveClientsPayload {
    pub cuids: Vec<ClientCuid>,
}

impl TryFrom<RemoveClientsForm> for RemoveClientsPayload {
    type Error = FormError;

    fn try_from(form: RemoveClientsForm) -> Result<Self, Self::Error> {
        let mut cuids: Vec<ClientCuid> = Vec::with_capacity(form.cuids.len());
        for raw in form.cuids {
            let cuid = ClientCuid::new(raw).map_err(|_| FormError::InvalidClientCuid)?;
            if !cuids.contains(&cuid) {
                cuids.push(cuid);
            }
        }
        if cuids.is_empty() {
            return Err(FormError::NoClientsSelected);
        }
        Ok(Self { cuids })
    }
}
