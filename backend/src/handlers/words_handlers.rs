use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers::member_session::MemberSession;
use crate::models::words_models::{LikeStatus, WordsCard};
use crate::AppState;

pub async fn list_words(
    State(state): State<Arc<AppState>>,
    member: Option<MemberSession>,
) -> Json<Vec<WordsCard>> {
    let viewer = member.as_ref().map(|m| m.member_id.as_str());
    Json(state.words.cards(viewer))
}

pub async fn get_words_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    member: Option<MemberSession>,
) -> Result<Json<WordsCard>, AppError> {
    let viewer = member.as_ref().map(|m| m.member_id.as_str());
    Ok(Json(state.words.card(id, viewer)?))
}

pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    member: MemberSession,
) -> Result<Json<LikeStatus>, AppError> {
    state.ensure_member(&member.member_id)?;
    let status = state.words.toggle_like(id, &member.member_id)?;
    tracing::debug!(
        member_id = %member.member_id,
        entry = id,
        liked = status.liked,
        "Toggled words like"
    );
    Ok(Json(status))
}
