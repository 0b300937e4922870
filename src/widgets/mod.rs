//! Embeddable widget code generated from a client's preferences.
//!
//! Every artifact is rendered from a fixed template. Interpolated values are
//! always emitted as JavaScript literals through the `js` filter, so no
//! user-supplied string can terminate a literal or the enclosing `<script>`.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tera::{Context, Tera, Value};
use thiserror::Error;

use crate::domain::client::ClientData;

const TEMPLATES: [(&str, &str); 5] = [
    ("all_listings.html", include_str!("templates/all_listings.html")),
    ("single_listing.js", include_str!("templates/single_listing.js")),
    ("wix_home.js", include_str!("templates/wix_home.js")),
    ("wix_book_now.js", include_str!("templates/wix_book_now.js")),
    ("wix_dynamic.js", include_str!("templates/wix_dynamic.js")),
];

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// The five artifacts a client can paste into their site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WidgetVariant {
    AllListings,
    SingleListing,
    WixHomePage,
    WixBookNow,
    WixDynamicPage,
}

impl WidgetVariant {
    pub const ALL: [WidgetVariant; 5] = [
        WidgetVariant::AllListings,
        WidgetVariant::SingleListing,
        WidgetVariant::WixHomePage,
        WidgetVariant::WixBookNow,
        WidgetVariant::WixDynamicPage,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            WidgetVariant::AllListings => "all-listings",
            WidgetVariant::SingleListing => "single-listing",
            WidgetVariant::WixHomePage => "wix-home",
            WidgetVariant::WixBookNow => "wix-book-now",
            WidgetVariant::WixDynamicPage => "wix-dynamic",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WidgetVariant::AllListings => "All listings",
            WidgetVariant::SingleListing => "Single listing",
            WidgetVariant::WixHomePage => "Wix home page",
            WidgetVariant::WixBookNow => "Wix book now page",
            WidgetVariant::WixDynamicPage => "Wix dynamic page",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            WidgetVariant::AllListings => "all_listings.html",
            WidgetVariant::SingleListing => "single_listing.js",
            WidgetVariant::WixHomePage => "wix_home.js",
            WidgetVariant::WixBookNow => "wix_book_now.js",
            WidgetVariant::WixDynamicPage => "wix_dynamic.js",
        }
    }

    /// MIME type of the generated text.
    pub fn content_type(&self) -> &'static str {
        match self {
            WidgetVariant::AllListings => "text/html; charset=utf-8",
            _ => "text/javascript; charset=utf-8",
        }
    }
}

impl Display for WidgetVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for WidgetVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.slug() == s)
            .ok_or_else(|| format!("unknown widget variant: {s}"))
    }
}

/// Where the hosted booking app lives and how Wix pages talk to it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WidgetSettings {
    /// Origin of the hosted booking app loaded in the iframe.
    pub origin: String,
    pub listings_path: String,
    /// Origins the all-listings page accepts search messages from.
    pub allowed_origins: Vec<String>,
    /// Wix page the home page search redirects to.
    pub results_path: String,
    /// Wix CMS collection holding one item per listing.
    pub cms_collection: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            origin: "https://beyondbooking.vercel.app".to_string(),
            listings_path: "/listings".to_string(),
            allowed_origins: vec![
                "https://beyondbooking.vercel.app".to_string(),
                "http://localhost:3000".to_string(),
                "https://editor.wix.com".to_string(),
                "https://beyondbooking.wixstudio.com".to_string(),
            ],
            results_path: "/nos-chalets".to_string(),
            cms_collection: "Chalets".to_string(),
        }
    }
}

/// Escapes a JSON text so it can sit inside an HTML `<script>` element.
fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders any JSON value as a JavaScript literal safe for inline scripts.
pub fn js_literal(value: &Value) -> String {
    escape_for_script(&value.to_string())
}

fn js_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(js_literal(value)))
}

/// Escapes text for a double-quoted HTML attribute.
fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn attr_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Ok(Value::String(escape_attribute(&text)))
}

#[derive(Serialize)]
struct WidgetView<'a> {
    client_name: &'a str,
    access_key: &'a str,
    integration_label: &'static str,
    currencies: &'a [String],
    location_filter: bool,
    wix_cms_url: &'a str,
    lodgify_ws_url: &'a str,
    lodgify_ws_id: &'a str,
    font_link: &'a str,
    heading_font: &'a str,
    body_font: &'a str,
    hero_img: &'a str,
    show_logo: bool,
    max_guests: u32,
    language: &'a str,
    custom_domain: &'a str,
    button_icon_color_on_hover: &'a str,
    primary_palette: Vec<String>,
    secondary_palette: Vec<String>,
    neutral_palette: Vec<String>,
    primary_rgb: String,
    secondary_rgb: String,
    booking_footer_rgb: String,
    button_hover_rgb: String,
    allowed_origins: Vec<&'a str>,
    listings_url: String,
    widget_origin: &'a str,
    results_path: &'a str,
    cms_collection: &'a str,
}

fn palette(name: &str, entries: [(u16, &str); 10]) -> Vec<String> {
    entries
        .iter()
        .map(|(shade, rgb)| format!("--c-{name}-{shade}: {rgb}"))
        .collect()
}

impl<'a> WidgetView<'a> {
    fn new(data: &'a ClientData, settings: &'a WidgetSettings) -> Self {
        let prefs = &data.preferences;

        let mut allowed_origins: Vec<&str> =
            settings.allowed_origins.iter().map(String::as_str).collect();
        if !prefs.wix_cms_url.is_empty() {
            allowed_origins.push(&prefs.wix_cms_url);
        }

        WidgetView {
            client_name: &data.name,
            access_key: &data.access_key,
            integration_label: data.integration_label(),
            currencies: &prefs.currencies,
            location_filter: prefs.location_filter,
            wix_cms_url: &prefs.wix_cms_url,
            lodgify_ws_url: &prefs.lodgify_ws_url,
            lodgify_ws_id: &prefs.lodgify_ws_id,
            font_link: &prefs.font_link,
            heading_font: &prefs.heading_font,
            body_font: &prefs.body_font,
            hero_img: &prefs.img_link,
            show_logo: !prefs.img_link.is_empty(),
            max_guests: prefs.max_guests,
            language: &prefs.language,
            custom_domain: &prefs.custom_domain,
            button_icon_color_on_hover: &prefs.button_font_color_on_hover,
            primary_palette: palette(
                "primary",
                [
                    (50, "248, 250, 252"),
                    (100, "241, 245, 249"),
                    (200, "10, 232, 240"),
                    (300, "15, 213, 225"),
                    (400, "10, 163, 184"),
                    (500, prefs.primary_color.as_str()),
                    (600, prefs.primary_color.as_str()),
                    (700, prefs.secondary_color.as_str()),
                    (800, "66, 41, 59"),
                    (900, "22, 23, 42"),
                ],
            ),
            secondary_palette: palette(
                "secondary",
                [
                    (50, "248, 250, 252"),
                    (100, "241, 245, 249"),
                    (200, "226, 232, 240"),
                    (300, "203, 213, 225"),
                    (400, prefs.booking_footer_color.as_str()),
                    (500, "100, 116, 139"),
                    (600, "71, 85, 105"),
                    (700, "29, 65, 29"),
                    (800, "30, 41, 59"),
                    (900, "15, 23, 42"),
                ],
            ),
            neutral_palette: palette(
                "neutral",
                [
                    (50, "255,255,255"),
                    (100, "241, 245, 249"),
                    (200, "226, 232, 240"),
                    (300, "203, 213, 225"),
                    (400, "148, 163, 184"),
                    (500, "0, 0, 0"),
                    (600, "0, 0, 0"),
                    (700, "51, 65, 85"),
                    (800, "30, 41, 59"),
                    (900, "0, 0, 0"),
                ],
            ),
            primary_rgb: format!("rgb({})", prefs.primary_color),
            secondary_rgb: format!("rgb({})", prefs.secondary_color),
            booking_footer_rgb: format!("rgb({})", prefs.booking_footer_color),
            button_hover_rgb: format!("rgb({})", prefs.button_font_color_on_hover),
            allowed_origins,
            listings_url: format!("{}{}", settings.origin, settings.listings_path),
            widget_origin: &settings.origin,
            results_path: &settings.results_path,
            cms_collection: &settings.cms_collection,
        }
    }
}

/// One rendered artifact, ready for display.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GeneratedCode {
    pub variant: WidgetVariant,
    pub slug: &'static str,
    pub title: &'static str,
    pub code: String,
}

/// Compiles the widget templates once and renders them on demand.
#[derive(Clone, Debug)]
pub struct WidgetRenderer {
    tera: Tera,
    settings: WidgetSettings,
}

impl WidgetRenderer {
    pub fn new(settings: WidgetSettings) -> Result<Self, WidgetError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        tera.autoescape_on(vec![]);
        tera.register_filter("js", js_filter);
        tera.register_filter("attr", attr_filter);
        Ok(Self { tera, settings })
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    /// Renders one artifact. The output only depends on `data` and the settings.
    pub fn render(&self, variant: WidgetVariant, data: &ClientData) -> Result<String, WidgetError> {
        let mut context = Context::new();
        context.insert("view", &WidgetView::new(data, &self.settings));
        let code = self.tera.render(variant.template(), &context)?;
        Ok(code.trim().to_string())
    }

    pub fn render_all(&self, data: &ClientData) -> Result<Vec<GeneratedCode>, WidgetError> {
        WidgetVariant::ALL
            .into_iter()
            .map(|variant| {
                Ok(GeneratedCode {
                    variant,
                    slug: variant.slug(),
                    title: variant.title(),
                    code: self.render(variant, data)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientPreferences;

    fn renderer() -> WidgetRenderer {
        WidgetRenderer::new(WidgetSettings::default()).unwrap()
    }

    fn sample() -> ClientData {
        ClientData {
            access_key: "ckx1a2b3c".into(),
            name: "Chalets Lodge".into(),
            integration_id: Some(2),
            preferences: ClientPreferences {
                currencies: vec!["USD".into(), "EUR".into()],
                primary_color: "12, 34, 56".into(),
                secondary_color: "1, 2, 3".into(),
                booking_footer_color: "9, 9, 9".into(),
                max_guests: 8,
                location_filter: true,
                language: "fr".into(),
                ..ClientPreferences::default()
            },
            ..ClientData::default()
        }
    }

    #[test]
    fn js_literal_escapes_script_breakouts() {
        let literal = js_literal(&Value::String("</script><b>\"'`&\u{2028}".into()));
        assert_eq!(
            literal,
            "\"\\u003c/script\\u003e\\u003cb\\u003e\\\"'`\\u0026\\u2028\""
        );
    }

    #[test]
    fn iframe_source_is_attribute_escaped() {
        let settings = WidgetSettings {
            origin: "https://widgets.example/\"><script>x()</script>".into(),
            ..WidgetSettings::default()
        };
        let code = WidgetRenderer::new(settings)
            .unwrap()
            .render(WidgetVariant::AllListings, &ClientData::default())
            .unwrap();

        assert!(code.contains(
            "src=\"https://widgets.example/&quot;&gt;&lt;script&gt;x()&lt;/script&gt;/listings\""
        ));
        assert!(!code.contains("\"><script>x()"));
    }

    #[test]
    fn variants_parse_from_slugs() {
        for variant in WidgetVariant::ALL {
            assert_eq!(variant.slug().parse::<WidgetVariant>(), Ok(variant));
        }
        assert!("bogus".parse::<WidgetVariant>().is_err());
    }

    #[test]
    fn all_listings_embeds_client_values() {
        let code = renderer()
            .render(WidgetVariant::AllListings, &sample())
            .unwrap();

        assert!(code.starts_with("<!DOCTYPE html>"));
        assert!(code.contains("const CLIENT_NAME = \"Chalets Lodge\";"));
        assert!(code.contains("const CURRENCIES = [\"USD\",\"EUR\"];"));
        assert!(code.contains("const LOCATION_FILTER = true;"));
        assert!(code.contains("const MAX_GUESTS = 8;"));
        assert!(code.contains("ACCESS_KEY: \"ckx1a2b3c\""));
        assert!(code.contains("INTEGRATION_TYPE: \"lodgify\""));
        assert!(code.contains("\"--c-primary-500: 12, 34, 56\""));
        assert!(code.contains("\"--c-primary-700: 1, 2, 3\""));
        assert!(code.contains("\"--c-secondary-400: 9, 9, 9\""));
        assert!(code.contains("src=\"https://beyondbooking.vercel.app/listings\""));
    }

    #[test]
    fn empty_name_renders_empty_single_quoted_literal() {
        let data = ClientData::default();
        let code = renderer().render(WidgetVariant::AllListings, &data).unwrap();
        assert!(code.contains("const CLIENT_NAME = '';"));
        assert!(code.contains("const CURRENCIES = [];"));
        assert!(code.contains("INTEGRATION_TYPE: \"\""));
    }

    #[test]
    fn single_listing_uses_rgb_values() {
        let code = renderer()
            .render(WidgetVariant::SingleListing, &sample())
            .unwrap();
        assert!(code.contains("primaryColor: \"rgb(12, 34, 56)\""));
        assert!(code.contains("currencies: [\"USD\",\"EUR\"]"));
        assert!(code.contains("showLogo: false"));
    }

    #[test]
    fn wix_scripts_follow_settings() {
        let settings = WidgetSettings {
            origin: "https://widgets.example".into(),
            results_path: "/our-homes".into(),
            cms_collection: "Homes".into(),
            ..WidgetSettings::default()
        };
        let renderer = WidgetRenderer::new(settings).unwrap();
        let data = sample();

        let home = renderer.render(WidgetVariant::WixHomePage, &data).unwrap();
        assert!(home.contains("\"/our-homes\""));

        let dynamic = renderer.render(WidgetVariant::WixDynamicPage, &data).unwrap();
        assert!(dynamic.contains("wixData.query(\"Homes\")"));
        assert!(dynamic.contains("\"https://widgets.example\""));

        let book_now = renderer.render(WidgetVariant::WixBookNow, &data).unwrap();
        assert!(book_now.contains("postMessage({ checkInDate, checkOutDate, people })"));
    }

    #[test]
    fn render_all_returns_every_variant() {
        let generated = renderer().render_all(&sample()).unwrap();
        let slugs: Vec<_> = generated.iter().map(|g| g.slug).collect();
        assert_eq!(
            slugs,
            vec!["all-listings", "single-listing", "wix-home", "wix-book-now", "wix-dynamic"]
        );
    }
}
