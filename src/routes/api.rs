use actix_web::{HttpResponse, Responder, get, web};

use crate::dto::api::ClientsQuery;
use crate::models::auth::AuthenticatedUser;
use crate::repository::AdminApiRepository;
use crate::services::ServiceError;
use crate::services::api as api_service;
use crate::widgets::WidgetRenderer;

fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        err => {
            log::error!("API request failed: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/clients")]
pub async fn api_v1_clients(
    params: web::Query<ClientsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
) -> impl Responder {
    match api_service::list_clients(repo.get_ref(), &user, params.into_inner()).await {
        Ok(clients) => HttpResponse::Ok().json(clients),
        Err(err) => error_response(err),
    }
}

#[get("/v1/clients/{cuid}/code/{variant}")]
pub async fn api_v1_client_code(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    repo: web::Data<AdminApiRepository>,
    renderer: web::Data<WidgetRenderer>,
) -> impl Responder {
    let (cuid, variant) = path.into_inner();
    match api_service::generate_code(repo.get_ref(), renderer.get_ref(), &user, &cuid, &variant)
        .await
    {
        Ok(code) => HttpResponse::Ok()
            .content_type(code.variant.content_type())
            .body(code.code),
        Err(err) => error_response(err),
    }
}
