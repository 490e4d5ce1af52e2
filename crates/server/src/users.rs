//! Users API endpoints

use api_types::user::{UserNew, UserSearch, UserView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(users.into_iter().map(view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .new_user(&payload.name, payload.email.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn search(
    State(state): State<ServerState>,
    Query(params): Query<UserSearch>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.search_users(&params.q).await?;
    Ok(Json(users.into_iter().map(view).collect()))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
