use crate::SERVICE_ACCESS_ROLE;
use crate::dto::api::{ApiClientItem, ClientsQuery};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ClientReader, Freshness};
use crate::services::client::parse_cuid;
use crate::services::clients::{ClientFilter, DEFAULT_SORT, parse_sort, sort_clients};
use crate::services::{ServiceError, ServiceResult, ensure_role};
use crate::widgets::{GeneratedCode, WidgetRenderer, WidgetVariant};

/// Returns the client summaries matching the optional search term.
pub async fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ClientsQuery,
) -> ServiceResult<Vec<ApiClientItem>>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let filter = ClientFilter::new(query.search.as_deref().unwrap_or_default(), "all", "all");
    let mut clients: Vec<_> = repo
        .list_clients(Freshness::Cached)
        .await?
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();
    sort_clients(&mut clients, &parse_sort(DEFAULT_SORT));

    Ok(clients.iter().map(ApiClientItem::from).collect())
}

/// Renders one widget artifact for a stored client.
pub async fn generate_code<R>(
    repo: &R,
    renderer: &WidgetRenderer,
    user: &AuthenticatedUser,
    cuid: &str,
    variant: &str,
) -> ServiceResult<GeneratedCode>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let variant: WidgetVariant = variant.parse().map_err(|_| ServiceError::NotFound)?;
    let cuid = parse_cuid(cuid)?;

    let client = repo.get_client(&cuid, Freshness::Cached).await?;

    Ok(GeneratedCode {
        variant,
        slug: variant.slug(),
        title: variant.title(),
        code: renderer.render(variant, &client)?,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::client::{ClientData, ClientStatus, ClientSummary};
    use crate::repository::mock::MockRepository;
    use crate::widgets::WidgetSettings;

    fn staff() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "staff@example.com".into(),
            name: "Staff".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    fn summary(name: &str) -> ClientSummary {
        ClientSummary {
            id: name.to_lowercase(),
            cuid: name.to_lowercase(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            updated_at: None,
            status: ClientStatus::Production,
            integration: None,
            production_url: None,
        }
    }

    #[actix_web::test]
    async fn search_filters_summaries() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .returning(|_| Ok(vec![summary("Alpine"), summary("Bay")]));

        let items = list_clients(
            &repo,
            &staff(),
            ClientsQuery {
                search: Some("alp".into()),
            },
        )
        .await
        .expect("clients listed");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].cuid, "alpine");
    }

    #[actix_web::test]
    async fn unknown_variant_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_client().times(0);
        let renderer = WidgetRenderer::new(WidgetSettings::default()).expect("templates");

        let result = generate_code(&repo, &renderer, &staff(), "ck1", "flash-banner").await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[actix_web::test]
    async fn code_is_generated_for_stored_client() {
        let mut repo = MockRepository::new();
        repo.expect_get_client().returning(|_, _| {
            Ok(ClientData {
                access_key: "ck1".into(),
                name: "Bay".into(),
                ..Default::default()
            })
        });
        let renderer = WidgetRenderer::new(WidgetSettings::default()).expect("templates");

        let code = generate_code(&repo, &renderer, &staff(), "ck1", "single-listing")
            .await
            .expect("code generated");

        assert_eq!(code.variant, WidgetVariant::SingleListing);
        assert!(code.code.contains("ck1"));
    }
}
