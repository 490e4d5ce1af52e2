//! Groups API endpoints

use std::collections::BTreeSet;

use api_types::group::{GroupNew, GroupRename, GroupView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        member_user_ids: group.members.into_iter().collect(),
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<GroupView>>, ServerError> {
    let groups = state.engine.list_groups().await?;
    Ok(Json(groups.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id).await?;
    Ok(Json(view(group)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let members: BTreeSet<Uuid> = payload.member_user_ids.into_iter().collect();
    let group = state.engine.new_group(&payload.name, &members).await?;
    Ok((StatusCode::CREATED, Json(view(group))))
}

pub async fn rename(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<GroupRename>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.rename_group(group_id, &payload.name).await?;
    Ok(Json(view(group)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
