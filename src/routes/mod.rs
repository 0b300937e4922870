//! HTTP handlers and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::SERVICE_ADMIN_ROLE;
use crate::models::auth::AuthenticatedUser;
use crate::services::{ServiceError, check_role};

pub mod api;
pub mod client;
pub mod clients;
pub mod main;

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context every page template expects.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context.insert("is_admin", &check_role(SERVICE_ADMIN_ROLE, &user.roles));
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// `303 See Other` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Flashes a failed mutation and redirects. Unauthorized users go to `/na`.
pub(crate) fn flash_service_error(err: ServiceError, location: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error(err.user_message()).send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error(err.user_message()).send();
            redirect("/clients")
        }
        err => {
            FlashMessage::error(err.user_message()).send();
            redirect(location)
        }
    }
}
