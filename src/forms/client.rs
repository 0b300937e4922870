//! Forms posted by the client preferences editor.

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;

use crate::domain::client::{ClientData, ClientPreferences, ClientStatus};
use crate::domain::types::{ClientEmail, ClientName, CurrencyCode, OptionalUrl, RgbColor};
use crate::forms::{FormError, is_checked, non_blank};

/// Largest image accepted by the upload form.
pub const MAX_IMAGE_BYTES: usize = 3 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Every editable field of a client record. Decoded with `serde_html_form`
/// because `currencies` repeats.
#[derive(Debug, Default, Deserialize)]
pub struct SavePreferencesForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub integration_id: String,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub location_filter: Option<String>,
    #[serde(default)]
    pub lodgify_ws_url: String,
    #[serde(default)]
    pub lodgify_ws_id: String,
    #[serde(default)]
    pub heading_font: String,
    #[serde(default)]
    pub body_font: String,
    #[serde(default)]
    pub font_link: String,
    #[serde(default)]
    pub currencies: Vec<String>,
    #[serde(default)]
    pub img_link: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
    #[serde(default)]
    pub booking_footer_color: String,
    #[serde(default)]
    pub button_font_color_on_hover: String,
    #[serde(default)]
    pub custom_domain: String,
    #[serde(default)]
    pub production_url: String,
    #[serde(default)]
    pub channel_manager_site_url: String,
    #[serde(default)]
    pub wix_cms_url: String,
    #[serde(default)]
    pub max_guests: String,
    #[serde(default)]
    pub language: String,
    pub dev_mode: Option<String>,
}

impl SavePreferencesForm {
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, FormError> {
        serde_html_form::from_bytes(body).map_err(|_| FormError::Malformed)
    }
}

/// Validated editor input. Fields the editor does not own, such as the
/// access key and the todo list, are taken from the record being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferencesPayload {
    pub name: ClientName,
    pub email: ClientEmail,
    pub status: ClientStatus,
    pub integration_id: Option<i64>,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub location_filter: bool,
    pub lodgify_ws_url: String,
    pub lodgify_ws_id: String,
    pub heading_font: String,
    pub body_font: String,
    pub font_link: String,
    pub currencies: Vec<CurrencyCode>,
    pub img_link: String,
    pub primary_color: RgbColor,
    pub secondary_color: RgbColor,
    pub booking_footer_color: RgbColor,
    pub button_font_color_on_hover: RgbColor,
    pub custom_domain: String,
    pub production_url: OptionalUrl,
    pub channel_manager_site_url: OptionalUrl,
    pub wix_cms_url: OptionalUrl,
    pub max_guests: u32,
    pub language: String,
    pub dev_mode: bool,
}

/// Empty input means black.
fn color(value: &str, field: &'static str) -> Result<RgbColor, FormError> {
    if value.trim().is_empty() {
        return Ok(RgbColor::default());
    }
    RgbColor::parse(value).map_err(|_| FormError::InvalidColor(field))
}

fn url(value: String, field: &'static str) -> Result<OptionalUrl, FormError> {
    OptionalUrl::new(value).map_err(|_| FormError::InvalidUrl(field))
}

impl TryFrom<SavePreferencesForm> for PreferencesPayload {
    type Error = FormError;

    fn try_from(form: SavePreferencesForm) -> Result<Self, Self::Error> {
        let name = ClientName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let email = ClientEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?;

        let integration_id = match form.integration_id.trim() {
            "" => None,
            raw => Some(
                raw.parse::<i64>()
                    .map_err(|_| FormError::InvalidIntegration)?,
            ),
        };

        let mut currencies: Vec<CurrencyCode> = Vec::with_capacity(form.currencies.len());
        for raw in form.currencies.iter().filter(|c| !c.trim().is_empty()) {
            let code = CurrencyCode::new(raw.as_str())?;
            if !currencies.contains(&code) {
                currencies.push(code);
            }
        }

        let max_guests = match form.max_guests.trim() {
            "" => 0,
            raw => raw.parse::<u32>().map_err(|_| FormError::InvalidMaxGuests)?,
        };

        Ok(Self {
            name,
            email,
            status: ClientStatus::from_wire(form.status.trim()),
            integration_id,
            api_key: non_blank(form.api_key),
            client_id: non_blank(form.client_id),
            client_secret: non_blank(form.client_secret),
            location_filter: is_checked(&form.location_filter),
            lodgify_ws_url: form.lodgify_ws_url.trim().to_string(),
            lodgify_ws_id: form.lodgify_ws_id.trim().to_string(),
            heading_font: form.heading_font.trim().to_string(),
            body_font: form.body_font.trim().to_string(),
            font_link: form.font_link.trim().to_string(),
            currencies,
            img_link: form.img_link.trim().to_string(),
            primary_color: color(&form.primary_color, "primary color")?,
            secondary_color: color(&form.secondary_color, "secondary color")?,
            booking_footer_color: color(&form.booking_footer_color, "booking footer color")?,
            button_font_color_on_hover: color(
                &form.button_font_color_on_hover,
                "button font color on hover",
            )?,
            custom_domain: form.custom_domain.trim().to_string(),
            production_url: url(form.production_url, "production URL")?,
            channel_manager_site_url: url(
                form.channel_manager_site_url,
                "channel manager site URL",
            )?,
            wix_cms_url: url(form.wix_cms_url, "Wix CMS URL")?,
            max_guests,
            language: form.language.trim().to_string(),
            dev_mode: is_checked(&form.dev_mode),
        })
    }
}

/// The stored spelling wins when the edit only differs by surrounding
/// whitespace.
fn keep_text(stored: &str, edited: String) -> String {
    if stored.trim() == edited {
        stored.to_string()
    } else {
        edited
    }
}

/// The color input only round-trips the parsed value, so any stored spelling
/// of the same color (or an unparsable one shown as black) is kept.
fn keep_color(stored: &str, edited: RgbColor) -> String {
    if RgbColor::parse(stored).unwrap_or_default() == edited {
        stored.to_string()
    } else {
        edited.to_string()
    }
}

fn keep_optional(stored: &Option<String>, edited: Option<String>) -> Option<String> {
    if non_blank(stored.clone()) == edited {
        stored.clone()
    } else {
        edited
    }
}

fn keep_email(stored: &str, edited: ClientEmail) -> String {
    if ClientEmail::new(stored).is_ok_and(|email| email == edited) {
        stored.to_string()
    } else {
        edited.into_inner()
    }
}

fn keep_currencies(stored: &[String], edited: Vec<CurrencyCode>) -> Vec<String> {
    let mut normalized: Vec<CurrencyCode> = Vec::with_capacity(stored.len());
    for code in stored.iter().filter_map(|c| CurrencyCode::new(c.as_str()).ok()) {
        if !normalized.contains(&code) {
            normalized.push(code);
        }
    }
    if normalized == edited {
        stored.to_vec()
    } else {
        edited.into_iter().map(CurrencyCode::into_inner).collect()
    }
}

impl PreferencesPayload {
    /// Builds the working copy by laying the edited fields over `base`.
    ///
    /// Fields whose edited value normalizes to the stored one keep the stored
    /// text, so an untouched form reproduces `base` exactly.
    pub fn apply_to(self, base: &ClientData) -> ClientData {
        let stored = &base.preferences;
        let integration_id = match self.integration_id {
            None if base.integration().is_none() => base.integration_id,
            edited => edited,
        };

        ClientData {
            status: self.status,
            access_key: base.access_key.clone(),
            name: keep_text(&base.name, self.name.into_inner()),
            email: keep_email(&base.email, self.email),
            api_key: keep_optional(&base.api_key, self.api_key),
            client_id: keep_optional(&base.client_id, self.client_id),
            client_secret: keep_optional(&base.client_secret, self.client_secret),
            integration_id,
            preferences: ClientPreferences {
                location_filter: self.location_filter,
                lodgify_ws_url: keep_text(&stored.lodgify_ws_url, self.lodgify_ws_url),
                lodgify_ws_id: keep_text(&stored.lodgify_ws_id, self.lodgify_ws_id),
                heading_font: keep_text(&stored.heading_font, self.heading_font),
                body_font: keep_text(&stored.body_font, self.body_font),
                font_link: keep_text(&stored.font_link, self.font_link),
                currencies: keep_currencies(&stored.currencies, self.currencies),
                img_link: keep_text(&stored.img_link, self.img_link),
                primary_color: keep_color(&stored.primary_color, self.primary_color),
                secondary_color: keep_color(&stored.secondary_color, self.secondary_color),
                booking_footer_color: keep_color(
                    &stored.booking_footer_color,
                    self.booking_footer_color,
                ),
                button_font_color_on_hover: keep_color(
                    &stored.button_font_color_on_hover,
                    self.button_font_color_on_hover,
                ),
                custom_domain: keep_text(&stored.custom_domain, self.custom_domain),
                production_url: keep_text(
                    &stored.production_url,
                    self.production_url.into_inner(),
                ),
                channel_manager_site_url: keep_text(
                    &stored.channel_manager_site_url,
                    self.channel_manager_site_url.into_inner(),
                ),
                wix_cms_url: keep_text(&stored.wix_cms_url, self.wix_cms_url.into_inner()),
                max_guests: self.max_guests,
                language: keep_text(&stored.language, self.language),
                dev_mode: self.dev_mode,
                todos: stored.todos.clone(),
            },
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadImageForm {
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

/// Image read from the upload form after size and type checks.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Checks size and MIME type before any bytes are read.
    pub fn validate(content_type: &str, size: usize) -> Result<(), FormError> {
        if size > MAX_IMAGE_BYTES {
            return Err(FormError::ImageTooLarge);
        }
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(FormError::UnsupportedImageType(content_type.to_string()));
        }
        Ok(())
    }
}

impl TryFrom<UploadImageForm> for ImageUpload {
    type Error = FormError;

    fn try_from(form: UploadImageForm) -> Result<Self, Self::Error> {
        let file = form
            .image
            .filter(|f| f.size > 0)
            .ok_or(FormError::MissingImage)?;

        let content_type = file
            .content_type
            .as_ref()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        Self::validate(&content_type, file.size)?;

        let bytes = std::fs::read(file.file.path()).map_err(|_| FormError::UnreadableImage)?;

        Ok(Self {
            file_name: file.file_name.unwrap_or_else(|| "image".to_string()),
            content_type,
            bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTodoForm {
    #[serde(default)]
    pub text: String,
}

impl AddTodoForm {
    /// Strips markup and surrounding whitespace.
    pub fn sanitized_text(&self) -> Result<String, FormError> {
        let text = ammonia::clean(&self.text).trim().to_string();
        if text.is_empty() {
            Err(FormError::EmptyTodo)
        } else {
            Ok(text)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TodoForm {
    pub todo_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> SavePreferencesForm {
        SavePreferencesForm {
            name: "Chalets Alpins".into(),
            email: "team@chalets.test".into(),
            status: "Testing".into(),
            integration_id: "2".into(),
            api_key: Some(" key ".into()),
            currencies: vec!["eur".into(), "CHF".into(), "EUR".into(), "".into()],
            primary_color: "#0a141e".into(),
            secondary_color: "1, 2, 3".into(),
            production_url: "https://chalets.test".into(),
            max_guests: "12".into(),
            dev_mode: Some("on".into()),
            ..Default::default()
        }
    }

    #[test]
    fn repeated_currencies_decode_from_urlencoded_body() {
        let body = b"name=A&email=a%40b.test&currencies=USD&currencies=EUR&dev_mode=on";
        let form = SavePreferencesForm::from_urlencoded(body).unwrap();
        assert_eq!(form.currencies, vec!["USD", "EUR"]);
        assert!(is_checked(&form.dev_mode));
        assert!(!is_checked(&form.location_filter));
    }

    #[test]
    fn payload_normalizes_colors_and_currencies() {
        let payload = PreferencesPayload::try_from(filled_form()).unwrap();
        let base = ClientData {
            access_key: "ckey".into(),
            ..Default::default()
        };

        let data = payload.apply_to(&base);
        assert_eq!(data.access_key, "ckey");
        assert_eq!(data.status, ClientStatus::Testing);
        assert_eq!(data.integration_id, Some(2));
        assert_eq!(data.api_key.as_deref(), Some("key"));
        assert_eq!(data.preferences.currencies, vec!["EUR", "CHF"]);
        assert_eq!(data.preferences.primary_color, "10, 20, 30");
        assert_eq!(data.preferences.secondary_color, "1, 2, 3");
        // Left black in the form, so the stored (empty) value stays.
        assert_eq!(data.preferences.booking_footer_color, "");
        assert_eq!(data.preferences.max_guests, 12);
        assert!(data.preferences.dev_mode);
    }

    #[test]
    fn untouched_fields_keep_their_stored_spelling() {
        let mut base = ClientData {
            name: "Chalets".into(),
            email: "Owner@Chalets.test".into(),
            api_key: Some(String::new()),
            integration_id: Some(9),
            ..Default::default()
        };
        base.preferences.primary_color = "12,34,56".into();
        base.preferences.secondary_color = "0,0,0".into();
        base.preferences.booking_footer_color = "navy".into();
        base.preferences.heading_font = " Lora ".into();
        base.preferences.currencies = vec!["usd".into()];

        let form = SavePreferencesForm {
            name: "Chalets".into(),
            email: "Owner@Chalets.test".into(),
            status: "Inactive".into(),
            api_key: Some(String::new()),
            primary_color: "#0c2238".into(),
            secondary_color: "#000000".into(),
            booking_footer_color: "#000000".into(),
            button_font_color_on_hover: "#000000".into(),
            heading_font: " Lora ".into(),
            currencies: vec!["usd".into()],
            max_guests: "0".into(),
            ..Default::default()
        };

        let data = PreferencesPayload::try_from(form).unwrap().apply_to(&base);
        assert_eq!(data, base);
    }

    #[test]
    fn edited_fields_are_normalized() {
        let mut base = ClientData {
            email: "Owner@Chalets.test".into(),
            ..Default::default()
        };
        base.preferences.primary_color = "12,34,56".into();

        let form = SavePreferencesForm {
            name: "Chalets".into(),
            email: "New@Chalets.test".into(),
            primary_color: "#0c2239".into(),
            ..Default::default()
        };

        let data = PreferencesPayload::try_from(form).unwrap().apply_to(&base);
        assert_eq!(data.email, "new@chalets.test");
        assert_eq!(data.preferences.primary_color, "12, 34, 57");
    }

    #[test]
    fn invalid_fields_are_reported() {
        let mut form = filled_form();
        form.primary_color = "teal".into();
        assert!(matches!(
            PreferencesPayload::try_from(form).unwrap_err(),
            FormError::InvalidColor("primary color")
        ));

        let mut form = filled_form();
        form.currencies = vec!["EURO".into()];
        assert!(matches!(
            PreferencesPayload::try_from(form).unwrap_err(),
            FormError::InvalidCurrency(_)
        ));

        let mut form = filled_form();
        form.production_url = "chalets".into();
        assert!(matches!(
            PreferencesPayload::try_from(form).unwrap_err(),
            FormError::InvalidUrl("production URL")
        ));
    }

    #[test]
    fn image_validation_checks_size_and_type() {
        assert!(ImageUpload::validate("image/png", 1024).is_ok());
        assert!(ImageUpload::validate("image/webp", MAX_IMAGE_BYTES).is_ok());
        assert!(matches!(
            ImageUpload::validate("image/png", MAX_IMAGE_BYTES + 1),
            Err(FormError::ImageTooLarge)
        ));
        assert!(matches!(
            ImageUpload::validate("image/svg+xml", 10),
            Err(FormError::UnsupportedImageType(_))
        ));
    }

    #[test]
    fn todo_text_is_sanitized() {
        let form = AddTodoForm {
            text: " <script>alert(1)</script>Check <b>fonts</b> ".into(),
        };
        assert_eq!(form.sanitized_text().unwrap(), "Check <b>fonts</b>");

        let blank = AddTodoForm { text: "  ".into() };
        assert!(matches!(blank.sanitized_text(), Err(FormError::EmptyTodo)));
    }
}
