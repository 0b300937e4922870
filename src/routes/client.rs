use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use serde::Deserialize;
use tera::Tera;

use crate::domain::client::{ClientStatus, Integration};
use crate::dto::client::{ClientPageData, SaveOutcome};
use crate::forms::client::{AddTodoForm, SavePreferencesForm, TodoForm, UploadImageForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::{AdminApiRepository, BlobStore, Freshness};
use crate::routes::{base_context, flash_service_error, redirect, render_template};
use crate::services::ServiceError;
use crate::services::client as client_service;
use crate::widgets::WidgetRenderer;

#[derive(Deserialize)]
struct ShowClientQuery {
    refresh: Option<bool>,
    tab: Option<String>,
}

fn client_url(cuid: &str) -> String {
    format!("/client/{cuid}")
}

fn render_client_page(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    server_config: &ServerConfig,
    data: &ClientPageData,
    tab: &str,
) -> HttpResponse {
    let statuses: Vec<&str> = ClientStatus::ALL.iter().map(|s| s.as_str()).collect();
    let integrations: Vec<(i64, &str)> = Integration::ALL
        .iter()
        .map(|i| (i.id(), i.display_name()))
        .collect();

    let mut context = base_context(
        flash_messages,
        user,
        "clients",
        &server_config.auth_service_url,
    );
    context.insert("client", &data.client);
    context.insert("integration_name", &data.integration_name);
    context.insert("integration_label", &data.integration_label);
    context.insert("colors", &data.colors);
    context.insert("has_unsaved_changes", &data.has_unsaved_changes);
    context.insert("codes", &data.codes);
    context.insert("preview", &data.preview);
    context.insert("completed_todos", &data.completed_todos);
    context.insert("can_delete_image", &data.can_delete_image);
    context.insert("statuses", &statuses);
    context.insert("integrations", &integrations);
    context.insert("tab", tab);

    render_template(tera, "client/index.html", &context)
}

#[get("/client/{cuid}")]
pub async fn show_client(
    cuid: web::Path<String>,
    query: web::Query<ShowClientQuery>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    images: web::Data<BlobStore>,
    renderer: web::Data<WidgetRenderer>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let freshness = if query.refresh.unwrap_or(false) {
        Freshness::Refresh
    } else {
        Freshness::Cached
    };

    let data = match client_service::load_client_page(
        repo.get_ref(),
        images.get_ref(),
        renderer.get_ref(),
        &user,
        &cuid,
        freshness,
    )
    .await
    {
        Ok(data) => data,
        Err(err @ (ServiceError::Unauthorized | ServiceError::NotFound)) => {
            return flash_service_error(err, "/clients");
        }
        Err(err) => {
            log::error!("Failed to load client {cuid}: {err}");
            FlashMessage::error(err.user_message()).send();
            return redirect("/clients");
        }
    };

    let tab = query.tab.as_deref().unwrap_or("edit");
    render_client_page(&tera, &flash_messages, &user, &server_config, &data, tab)
}

#[post("/client/{cuid}/preview")]
pub async fn preview_client(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    images: web::Data<BlobStore>,
    renderer: web::Data<WidgetRenderer>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let form = match SavePreferencesForm::from_urlencoded(&body) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(&client_url(&cuid));
        }
    };

    match client_service::preview_client(
        repo.get_ref(),
        images.get_ref(),
        renderer.get_ref(),
        &user,
        &cuid,
        form,
    )
    .await
    {
        Ok(data) => {
            render_client_page(&tera, &flash_messages, &user, &server_config, &data, "preview")
        }
        Err(err) => flash_service_error(err, &client_url(&cuid)),
    }
}

#[post("/client/{cuid}/save")]
pub async fn save_client(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    let location = client_url(&cuid);
    let form = match SavePreferencesForm::from_urlencoded(&body) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(&location);
        }
    };

    match client_service::save_client(repo.get_ref(), &user, &cuid, form).await {
        Ok(SaveOutcome::Saved) => {
            FlashMessage::success("Preferences saved.").send();
            redirect(&location)
        }
        Ok(SaveOutcome::Unchanged) => {
            FlashMessage::info("No changes to save.").send();
            redirect(&location)
        }
        Err(err) => flash_service_error(err, &location),
    }
}

#[post("/client/{cuid}/image")]
pub async fn upload_image(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    images: web::Data<BlobStore>,
    MultipartForm(form): MultipartForm<UploadImageForm>,
) -> impl Responder {
    let location = client_url(&cuid);
    match client_service::upload_image(repo.get_ref(), images.get_ref(), &user, &cuid, form).await
    {
        Ok(_) => {
            FlashMessage::success("Image uploaded.").send();
            redirect(&location)
        }
        Err(err) => flash_service_error(err, &location),
    }
}

#[post("/client/{cuid}/image/delete")]
pub async fn delete_image(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    images: web::Data<BlobStore>,
) -> impl Responder {
    let location = client_url(&cuid);
    match client_service::delete_image(repo.get_ref(), images.get_ref(), &user, &cuid).await {
        Ok(()) => {
            FlashMessage::success("Image deleted.").send();
            redirect(&location)
        }
        Err(err) => flash_service_error(err, &location),
    }
}

#[post("/client/{cuid}/todos")]
pub async fn add_todo(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    web::Form(form): web::Form<AddTodoForm>,
) -> impl Responder {
    let location = format!("{}?tab=todos", client_url(&cuid));
    match client_service::add_todo(repo.get_ref(), &user, &cuid, form, Utc::now()).await {
        Ok(()) => redirect(&location),
        Err(err) => flash_service_error(err, &location),
    }
}

#[post("/client/{cuid}/todos/toggle")]
pub async fn toggle_todo(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    web::Form(form): web::Form<TodoForm>,
) -> impl Responder {
    let location = format!("{}?tab=todos", client_url(&cuid));
    match client_service::toggle_todo(repo.get_ref(), &user, &cuid, form, Utc::now()).await {
        Ok(()) => redirect(&location),
        Err(err) => flash_service_error(err, &location),
    }
}

#[post("/client/{cuid}/todos/delete")]
pub async fn remove_todo(
    cuid: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    web::Form(form): web::Form<TodoForm>,
) -> impl Responder {
    let location = format!("{}?tab=todos", client_url(&cuid));
    match client_service::remove_todo(repo.get_ref(), &user, &cuid, form).await {
        Ok(()) => {
            FlashMessage::success("Todo removed.").send();
            redirect(&location)
        }
        Err(err) => flash_service_error(err, &location),
    }
}
