use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::client::{ClientStatus, Integration};
use crate::dto::clients::ClientsQuery;
use crate::forms::clients::{AddClientForm, RemoveClientsForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::AdminApiRepository;
use crate::routes::{base_context, flash_service_error, redirect, render_template};
use crate::services::ServiceError;
use crate::services::clients as clients_service;
use crate::services::reachability::ReachabilityBoard;

#[get("/clients")]
pub async fn show_clients(
    query: web::Query<ClientsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    board: web::Data<ReachabilityBoard>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match clients_service::load_clients_page(
        repo.get_ref(),
        board.get_ref(),
        &user,
        query.into_inner(),
    )
    .await
    {
        Ok(data) => data,
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("You do not have access to the client list.").send();
            return redirect("/na");
        }
        Err(err) => {
            log::error!("Failed to load clients: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let statuses: Vec<&str> = ClientStatus::ALL.iter().map(|s| s.as_str()).collect();
    let integrations: Vec<(i64, &str, &str)> = Integration::ALL
        .iter()
        .map(|i| (i.id(), i.label(), i.display_name()))
        .collect();

    let mut context = base_context(
        &flash_messages,
        &user,
        "clients",
        &server_config.auth_service_url,
    );
    context.insert("clients", &data.clients);
    context.insert("shown", &data.shown);
    context.insert("filtered_total", &data.filtered_total);
    context.insert("total", &data.total);
    context.insert("filters", &data.filters);
    context.insert("error", &data.error);
    context.insert("statuses", &statuses);
    context.insert("integrations", &integrations);

    render_template(&tera, "clients/index.html", &context)
}

#[post("/clients/add")]
pub async fn add_client(
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    web::Form(form): web::Form<AddClientForm>,
) -> impl Responder {
    match clients_service::add_client(repo.get_ref(), &user, form).await {
        Ok(()) => {
            FlashMessage::success("Client added.").send();
            redirect("/clients?refresh=true")
        }
        Err(err) => flash_service_error(err, "/clients"),
    }
}

#[post("/clients/remove")]
pub async fn remove_clients(
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    let form = match RemoveClientsForm::from_urlencoded(&body) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/clients");
        }
    };

    match clients_service::remove_clients(repo.get_ref(), &user, form).await {
        Ok(removed) => {
            FlashMessage::success(format!("Removed {removed} client(s).")).send();
            redirect("/clients?refresh=true")
        }
        Err(err) => flash_service_error(err, "/clients?refresh=true"),
    }
}
