#[cfg(feature = "server")]
use std::sync::Arc;
#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::{AdminApiRepository, BlobStore, HttpProbe};
#[cfg(feature = "server")]
use crate::routes::api::{api_v1_client_code, api_v1_clients};
#[cfg(feature = "server")]
use crate::routes::client::{
    add_todo, delete_image, preview_client, remove_todo, save_client, show_client, toggle_todo,
    upload_image,
};
#[cfg(feature = "server")]
use crate::routes::clients::{add_client, remove_clients, show_clients};
#[cfg(feature = "server")]
use crate::routes::main::{logout, not_assigned, show_index};
#[cfg(feature = "server")]
use crate::services::reachability::{ReachabilityBoard, spawn_probe_loop};
#[cfg(feature = "server")]
use crate::widgets::WidgetRenderer;

pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
pub mod widgets;

pub const SERVICE_ACCESS_ROLE: &str = "bbe";
pub const SERVICE_ADMIN_ROLE: &str = "bbe_admin";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let repo = AdminApiRepository::new(&server_config.admin_api_url)
        .with_timeouts(
            Duration::from_secs(server_config.list_timeout_secs),
            Duration::from_secs(server_config.client_timeout_secs),
        )
        .with_cache_ttl(
            Duration::from_secs(server_config.clients_cache_secs),
            Duration::from_secs(server_config.client_cache_secs),
        );

    let images = BlobStore::new(
        &server_config.blob_api_url,
        server_config.blob_token.clone(),
        server_config.blob_public_host.clone(),
    );

    let renderer = WidgetRenderer::new(server_config.widgets.clone())
        .map_err(|e| std::io::Error::other(format!("Widget template error(s): {e}")))?;

    // Production sites are probed in the background; the list only reads the board.
    let board = ReachabilityBoard::new();
    spawn_probe_loop(
        board.clone(),
        Arc::new(repo.clone()),
        Arc::new(HttpProbe::new(Duration::from_secs(
            server_config.probe_timeout_secs,
        ))),
        Duration::from_secs(server_config.probe_interval_secs),
    );

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid secret key: {e}")))?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting server on {}:{} against {}",
        bind_address.0,
        bind_address.1,
        server_config.admin_api_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(actix_web::middleware::Compress::default())
            .wrap(actix_web::middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(not_assigned)
            .service(
                web::scope("/api")
                    .service(api_v1_clients)
                    .service(api_v1_client_code),
            )
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(show_clients)
                    .service(add_client)
                    .service(remove_clients)
                    .service(show_client)
                    .service(preview_client)
                    .service(save_client)
                    .service(upload_image)
                    .service(delete_image)
                    .service(add_todo)
                    .service(toggle_todo)
                    .service(remove_todo)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(images.clone()))
            .app_data(web::Data::new(renderer.clone()))
            .app_data(web::Data::new(board.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
