use actix_identity::Identity;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::AdminApiRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::main as main_service;

#[get("/")]
pub async fn show_index(
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match main_service::load_dashboard(repo.get_ref(), &user, Utc::now()).await {
        Ok(data) => data,
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("You do not have access to the dashboard.").send();
            return redirect("/na");
        }
        Err(err) => {
            log::error!("Failed to load the dashboard: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );
    context.insert("stats", &data.stats);
    context.insert("recent", &data.recent);
    context.insert("error", &data.error);

    render_template(&tera, "main/index.html", &context)
}

#[get("/na")]
pub async fn not_assigned(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );

    render_template(&tera, "main/not_assigned.html", &context)
}

#[post("/logout")]
pub async fn logout(user: Identity) -> impl Responder {
    user.logout();
    redirect("/")
}
