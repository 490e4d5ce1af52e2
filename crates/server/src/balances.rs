//! Balance and settlement API endpoints

use api_types::balance::{SettleNew, TransferView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::MoneyCents;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let transfers = state.engine.balances(group_id).await?;

    Ok(Json(
        transfers
            .into_iter()
            .map(|transfer| TransferView {
                from_user_id: transfer.from,
                to_user_id: transfer.to,
                amount_minor: transfer.amount.cents(),
            })
            .collect(),
    ))
}

pub async fn settle(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<SettleNew>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .settle(
            group_id,
            payload.from_user_id,
            payload.to_user_id,
            MoneyCents::new(payload.amount_minor),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_old(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.clear_old(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
