use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::AppError;
use crate::handlers::member_session::MemberSession;
use crate::models::profile_models::{FormFieldDescriptor, Tab};
use crate::utils::avatar::{encode_data_url, AvatarError};
use crate::utils::profile_editor::EditorView;
use crate::AppState;

pub const AVATAR_FIELD: &str = "avatar";

#[derive(Deserialize)]
pub struct TabRequest {
    tab: Tab,
}

#[derive(Deserialize)]
pub struct UpdateFieldRequest {
    path: String,
    value: String,
}

#[derive(Serialize)]
pub struct ProfileFormResponse {
    active_tab: Tab,
    profile: Vec<FormFieldDescriptor>,
    account: Vec<FormFieldDescriptor>,
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let view = editor.lock().await.view();
    Ok(Json(view))
}

pub async fn get_profile_form(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<ProfileFormResponse>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let editor = editor.lock().await;
    Ok(Json(ProfileFormResponse {
        active_tab: editor.active_tab(),
        profile: editor.form(Tab::Profile),
        account: editor.form(Tab::Account),
    }))
}

pub async fn switch_tab(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
    Json(req): Json<TabRequest>,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let mut editor = editor.lock().await;
    editor.switch_tab(req.tab);
    Ok(Json(editor.view()))
}

pub async fn start_edit(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
    Json(req): Json<TabRequest>,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let mut editor = editor.lock().await;
    editor.start_edit(req.tab)?;
    Ok(Json(editor.view()))
}

pub async fn update_field(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let mut editor = editor.lock().await;
    editor.update_field(&req.path, &req.value)?;
    Ok(Json(editor.view()))
}

/// Accepts a multipart upload with an `avatar` file part and stores it as the
/// pending avatar preview. The editor lock is released while the body is read.
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
    multipart: Multipart,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let ticket = editor.lock().await.begin_avatar_read()?;

    let read = read_avatar(multipart, state.config.avatar_max_bytes).await;

    let mut editor = editor.lock().await;
    match read {
        Ok(data_url) => {
            if !editor.complete_avatar_read(ticket, data_url) {
                info!(member_id = %member.member_id, "Dropped superseded avatar upload");
            }
            Ok(Json(editor.view()))
        }
        Err(e) => {
            editor.fail_avatar_read(ticket, &e.to_string());
            Err(e)
        }
    }
}

async fn read_avatar(mut multipart: Multipart, max_bytes: usize) -> Result<String, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
        let data_url = encode_data_url(
            &bytes,
            content_type.as_deref(),
            file_name.as_deref(),
            max_bytes,
        )?;
        return Ok(data_url);
    }
    Err(AvatarError::Empty.into())
}

pub async fn submit_profile(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let mut editor = editor.lock().await;
    let previous = editor.profile().clone();
    let committed = editor.submit_profile()?;

    if let Err(e) = state.profile_repository.save(&committed) {
        error!(member_id = %member.member_id, "Failed to save profile: {}", e);
        editor.rollback_commit(Tab::Profile, previous, committed, &e.to_string());
        return Err(e.into());
    }
    info!(member_id = %member.member_id, "Profile updated");
    Ok(Json(editor.view()))
}

pub async fn submit_account(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let mut editor = editor.lock().await;
    let previous = editor.profile().clone();
    let committed = editor.submit_account()?;

    if let Err(e) = state.profile_repository.save(&committed) {
        error!(member_id = %member.member_id, "Failed to save account: {}", e);
        editor.rollback_commit(Tab::Account, previous, committed, &e.to_string());
        return Err(e.into());
    }
    info!(member_id = %member.member_id, "Account updated");
    Ok(Json(editor.view()))
}

pub async fn cancel_edit(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<EditorView>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let mut editor = editor.lock().await;
    editor.cancel_edit();
    Ok(Json(editor.view()))
}

pub async fn get_map_link(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<serde_json::Value>, AppError> {
    let editor = state.editor_for(&member.member_id)?;
    let editor = editor.lock().await;
    let location = &editor.profile().location;
    Ok(Json(json!({
        "url": location.map_path(),
        "label": location.label(),
    })))
}
