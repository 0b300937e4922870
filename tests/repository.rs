use std::time::Duration;

use bbe_admin::domain::client::{
    ClientData, ClientStatus, Integration, IntegrationCredentials, NewClient,
};
use bbe_admin::domain::types::{ClientCuid, ClientEmail, ClientName, Credential};
use bbe_admin::repository::errors::RepositoryError;
use bbe_admin::repository::{
    AdminApiRepository, BlobStore, ClientReader, ClientWriter, Freshness, HttpProbe, ImageStore,
    UrlProbe,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/api/getAdminData";

fn cuid(value: &str) -> ClientCuid {
    ClientCuid::new(value).unwrap()
}

fn new_client(integration: Integration, credentials: IntegrationCredentials) -> NewClient {
    NewClient {
        name: ClientName::new("Chalets").unwrap(),
        email: ClientEmail::new("owner@chalets.test").unwrap(),
        integration,
        credentials,
    }
}

fn client_record() -> serde_json::Value {
    json!({
        "status": "Production",
        "cuid": "ck1",
        "name": "Chalets Lodge",
        "email": "owner@chalets.test",
        "ApiKey": "key-1",
        "integrationId": 2,
        "preferences": {
            "currencies": ["USD", "EUR"],
            "maxGuests": 6,
            "primaryColor": "12, 34, 56",
            "productionUrl": "https://chalets.test"
        }
    })
}

#[tokio::test]
async fn test_list_clients_is_cached_until_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "cuid": "ck1", "name": "Alpha", "status": "Production", "integrationId": 1 },
            { "id": "2", "name": "Beta", "status": "Paused" }
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());

    let clients = repo.list_clients(Freshness::Cached).await.unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].integration, Some(Integration::Guesty));
    assert_eq!(clients[1].cuid, "2");
    assert_eq!(clients[1].status, ClientStatus::Inactive);

    // Served from the cache.
    repo.list_clients(Freshness::Cached).await.unwrap();
    // Goes back to the API.
    repo.list_clients(Freshness::Refresh).await.unwrap();
}

#[tokio::test]
async fn test_list_clients_accepts_null_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    assert!(repo.list_clients(Freshness::Refresh).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_client_sends_cuid_and_fills_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("clientCuid", "ck1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_record()))
        .expect(1)
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    let data = repo.get_client(&cuid("ck1"), Freshness::Cached).await.unwrap();

    assert_eq!(data.access_key, "ck1");
    assert_eq!(data.status, ClientStatus::Production);
    assert_eq!(data.api_key.as_deref(), Some("key-1"));
    assert_eq!(data.integration_label(), "lodgify");
    assert_eq!(data.preferences.currencies, vec!["USD", "EUR"]);
    assert_eq!(data.preferences.max_guests, 6);
    assert_eq!(data.preferences.todos.len(), 10);

    let cached = repo.get_client(&cuid("ck1"), Freshness::Cached).await.unwrap();
    assert_eq!(cached, data);
}

#[tokio::test]
async fn test_get_missing_client_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Client not found" })))
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    let result = repo.get_client(&cuid("missing"), Freshness::Refresh).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_remote_error_keeps_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Email already in use" })),
        )
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    let new_client = new_client(
        Integration::Lodgify,
        IntegrationCredentials::ApiKey(Credential::new("key").unwrap()),
    );

    match repo.create_client(&new_client).await {
        Err(RepositoryError::Remote { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Email already in use");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_client_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "name": "Chalets",
            "email": "owner@chalets.test",
            "integrationId": 1,
            "clientID": "id-1",
            "clientSecret": "secret-1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "cuid": "ck9" })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    let new_client = new_client(
        Integration::Guesty,
        IntegrationCredentials::OAuthClient {
            client_id: Credential::new("id-1").unwrap(),
            client_secret: Credential::new("secret-1").unwrap(),
        },
    );

    repo.create_client(&new_client).await.unwrap();
}

#[tokio::test]
async fn test_update_with_empty_body_returns_sent_record() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "clientCuid": "ck1",
            "data": { "name": "Renamed", "preferences": { "integrationLabel": "hostaway" } }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    let data = ClientData {
        access_key: "ck1".into(),
        name: "Renamed".into(),
        integration_id: Some(3),
        ..ClientData::default()
    };

    let saved = repo.update_client(&cuid("ck1"), &data).await.unwrap();
    assert_eq!(saved, data);

    // The saved record is cached, no GET is needed.
    let cached = repo.get_client(&cuid("ck1"), Freshness::Cached).await.unwrap();
    assert_eq!(cached.name, "Renamed");
}

#[tokio::test]
async fn test_update_merges_echoed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "Testing", "preferences": { "language": "fr" } })),
        )
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    let data = ClientData {
        access_key: "ck1".into(),
        name: "Chalets".into(),
        status: ClientStatus::Development,
        ..ClientData::default()
    };

    let saved = repo.update_client(&cuid("ck1"), &data).await.unwrap();
    assert_eq!(saved.status, ClientStatus::Testing);
    assert_eq!(saved.preferences.language, "fr");
    assert_eq!(saved.name, "Chalets");
}

#[tokio::test]
async fn test_delete_client_invalidates_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(ENDPOINT))
        .and(query_param("clientCuid", "ck1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri());
    repo.list_clients(Freshness::Cached).await.unwrap();
    repo.delete_client(&cuid("ck1")).await.unwrap();
    repo.list_clients(Freshness::Cached).await.unwrap();
}

#[tokio::test]
async fn test_slow_api_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let repo = AdminApiRepository::new(server.uri())
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));
    let result = repo.list_clients(Freshness::Refresh).await;
    assert!(matches!(result, Err(RepositoryError::Timeout)));
}

#[tokio::test]
async fn test_blob_upload_sends_bearer_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/[0-9a-f-]{36}-logo\.png$"))
        .and(header("authorization", "Bearer secret"))
        .and(header("x-content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://abc.public.blob.test/logo.png",
            "pathname": "logo.png",
            "contentType": "image/png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = BlobStore::new(server.uri(), "secret", "public.blob.test");
    let blob = store
        .upload_image("logo.png", "image/png", vec![1, 2, 3])
        .await
        .unwrap();
    assert_eq!(blob.url, "https://abc.public.blob.test/logo.png");
    assert!(store.is_managed_url(&blob.url));
}

#[tokio::test]
async fn test_blob_delete_posts_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/delete"))
        .and(body_partial_json(json!({ "urls": ["https://abc.public.blob.test/logo.png"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = BlobStore::new(server.uri(), "secret", "public.blob.test");
    store
        .delete_image("https://abc.public.blob.test/logo.png")
        .await
        .unwrap();

    let foreign = store.delete_image("https://cdn.example.com/logo.png").await;
    assert!(matches!(foreign, Err(RepositoryError::ValidationError(_))));
}

#[tokio::test]
async fn test_probe_treats_any_response_as_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let probe = HttpProbe::new(Duration::from_secs(2));
    assert!(probe.is_reachable(&server.uri()).await);
    assert!(!probe.is_reachable("   ").await);
    assert!(!probe.is_reachable("http://127.0.0.1:9").await);
}
