//! Preferences editor workflows for a single client.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::client::ClientData;
use crate::domain::editor::PreferencesDraft;
use crate::domain::types::{ClientCuid, rgb_to_hex};
use crate::dto::client::{ClientPageData, EditorColors, SaveOutcome};
use crate::forms::client::{
    AddTodoForm, ImageUpload, PreferencesPayload, SavePreferencesForm, TodoForm,
    UploadImageForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ClientReader, ClientWriter, Freshness, ImageStore};
use crate::services::{ServiceError, ServiceResult, ensure_role};
use crate::widgets::{WidgetRenderer, WidgetVariant};

/// Path segments that are not a valid cuid cannot name an existing client.
pub(crate) fn parse_cuid(raw: &str) -> ServiceResult<ClientCuid> {
    ClientCuid::new(raw).map_err(|_| ServiceError::NotFound)
}

fn build_page<I>(
    draft: &PreferencesDraft,
    images: &I,
    renderer: &WidgetRenderer,
) -> ServiceResult<ClientPageData>
where
    I: ImageStore + ?Sized,
{
    let client = draft.working();
    let codes = renderer.render_all(client)?;
    let preview = codes
        .iter()
        .find(|code| code.variant == WidgetVariant::AllListings)
        .map(|code| code.code.clone())
        .unwrap_or_default();
    let prefs = &client.preferences;
    let img_link = prefs.img_link.trim();

    Ok(ClientPageData {
        integration_name: client.integration_name(),
        integration_label: client.integration_label(),
        colors: EditorColors {
            primary: rgb_to_hex(&prefs.primary_color),
            secondary: rgb_to_hex(&prefs.secondary_color),
            booking_footer: rgb_to_hex(&prefs.booking_footer_color),
            button_font_on_hover: rgb_to_hex(&prefs.button_font_color_on_hover),
        },
        has_unsaved_changes: draft.has_unsaved_changes(),
        codes,
        preview,
        completed_todos: prefs.completed_todos(),
        can_delete_image: !img_link.is_empty() && images.is_managed_url(img_link),
        client: client.clone(),
    })
}

/// Loads one client for the editor. `Freshness::Refresh` re-fetches it.
pub async fn load_client_page<R, I>(
    repo: &R,
    images: &I,
    renderer: &WidgetRenderer,
    user: &AuthenticatedUser,
    cuid: &str,
    freshness: Freshness,
) -> ServiceResult<ClientPageData>
where
    R: ClientReader + ?Sized,
    I: ImageStore + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;

    let client = repo.get_client(&cuid, freshness).await.map_err(|err| {
        log::error!("Failed to load client {cuid}: {err}");
        ServiceError::from(err)
    })?;

    build_page(&PreferencesDraft::new(client), images, renderer)
}

/// Renders the posted working copy without saving it.
pub async fn preview_client<R, I>(
    repo: &R,
    images: &I,
    renderer: &WidgetRenderer,
    user: &AuthenticatedUser,
    cuid: &str,
    form: SavePreferencesForm,
) -> ServiceResult<ClientPageData>
where
    R: ClientReader + ?Sized,
    I: ImageStore + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;
    let payload = PreferencesPayload::try_from(form)?;

    let original = repo.get_client(&cuid, Freshness::Cached).await?;
    let working = payload.apply_to(&original);

    build_page(
        &PreferencesDraft::with_changes(original, working),
        images,
        renderer,
    )
}

/// Validates the working copy and writes it back when it differs from the
/// stored record.
pub async fn save_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cuid: &str,
    form: SavePreferencesForm,
) -> ServiceResult<SaveOutcome>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;
    let payload = PreferencesPayload::try_from(form)?;

    let original = repo.get_client(&cuid, Freshness::Cached).await?;
    let working = payload.apply_to(&original);
    let draft = PreferencesDraft::with_changes(original, working);

    if !draft.has_unsaved_changes() {
        return Ok(SaveOutcome::Unchanged);
    }

    persist(repo, &cuid, draft.working()).await?;
    Ok(SaveOutcome::Saved)
}

async fn persist<R>(repo: &R, cuid: &ClientCuid, data: &ClientData) -> ServiceResult<ClientData>
where
    R: ClientWriter + ?Sized,
{
    repo.update_client(cuid, data).await.map_err(|err| {
        log::error!("Failed to update client {cuid}: {err}");
        ServiceError::from(err)
    })
}

/// Replaces the client's image with the uploaded one.
pub async fn upload_image<R, I>(
    repo: &R,
    images: &I,
    user: &AuthenticatedUser,
    cuid: &str,
    form: UploadImageForm,
) -> ServiceResult<String>
where
    R: ClientReader + ClientWriter + ?Sized,
    I: ImageStore + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;
    let upload = ImageUpload::try_from(form)?;

    let mut client = repo.get_client(&cuid, Freshness::Cached).await?;

    let previous = client.preferences.img_link.trim().to_string();
    if !previous.is_empty()
        && images.is_managed_url(&previous)
        && let Err(err) = images.delete_image(&previous).await
    {
        log::warn!("Failed to delete previous image {previous}: {err}");
    }

    let blob = images
        .upload_image(&upload.file_name, &upload.content_type, upload.bytes)
        .await
        .map_err(|err| {
            log::error!("Failed to upload image for {cuid}: {err}");
            ServiceError::from(err)
        })?;

    client.preferences.img_link = blob.url.clone();
    persist(repo, &cuid, &client).await?;

    Ok(blob.url)
}

/// Deletes the client's blob-hosted image and clears the link.
pub async fn delete_image<R, I>(
    repo: &R,
    images: &I,
    user: &AuthenticatedUser,
    cuid: &str,
) -> ServiceResult<()>
where
    R: ClientReader + ClientWriter + ?Sized,
    I: ImageStore + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;

    let mut client = repo.get_client(&cuid, Freshness::Cached).await?;
    let current = client.preferences.img_link.trim().to_string();
    if current.is_empty() {
        return Err(ServiceError::Form("There is no image to delete.".to_string()));
    }
    if !images.is_managed_url(&current) {
        return Err(ServiceError::Form(
            "Only images hosted on the blob store can be deleted.".to_string(),
        ));
    }

    images.delete_image(&current).await.map_err(|err| {
        log::error!("Failed to delete image {current}: {err}");
        ServiceError::from(err)
    })?;

    client.preferences.img_link.clear();
    persist(repo, &cuid, &client).await?;
    Ok(())
}

pub async fn add_todo<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cuid: &str,
    form: AddTodoForm,
    now: DateTime<Utc>,
) -> ServiceResult<()>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;
    let text = form.sanitized_text()?;

    let mut client = repo.get_client(&cuid, Freshness::Cached).await?;
    client
        .preferences
        .add_todo(format!("todo-{}", Uuid::new_v4()), text, now);
    persist(repo, &cuid, &client).await?;
    Ok(())
}

pub async fn toggle_todo<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cuid: &str,
    form: TodoForm,
    now: DateTime<Utc>,
) -> ServiceResult<()>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;

    let mut client = repo.get_client(&cuid, Freshness::Cached).await?;
    if !client.preferences.toggle_todo(&form.todo_id, now) {
        return Err(ServiceError::Form("Todo not found.".to_string()));
    }
    persist(repo, &cuid, &client).await?;
    Ok(())
}

pub async fn remove_todo<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cuid: &str,
    form: TodoForm,
) -> ServiceResult<()>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let cuid = parse_cuid(cuid)?;

    let mut client = repo.get_client(&cuid, Freshness::Cached).await?;
    if !client.preferences.remove_todo(&form.todo_id) {
        return Err(ServiceError::Form("Todo not found.".to_string()));
    }
    persist(repo, &cuid, &client).await?;
    Ok(())
}
