//! Expenses API endpoints

use api_types::expense::{ExpenseNew, ExpenseView, SplitType};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpenseCmd, MoneyCents, SplitPolicy};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        group_id: expense.group_id,
        paid_by_user_id: expense.paid_by,
        amount_minor: expense.amount.cents(),
        description: expense.description,
        archived: expense.archived,
        splits: expense
            .splits
            .into_iter()
            .map(|(user_id, owed)| (user_id, owed.cents()))
            .collect(),
    }
}

pub async fn list_active(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses(group_id, false).await?;
    Ok(Json(expenses.into_iter().map(view).collect()))
}

pub async fn list_archived(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses(group_id, true).await?;
    Ok(Json(expenses.into_iter().map(view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let split = match (payload.split_type, payload.splits) {
        (Some(SplitType::Equal), _) => SplitPolicy::Equal,
        (None, Some(splits)) => SplitPolicy::Explicit(
            splits
                .into_iter()
                .map(|(user_id, cents)| (user_id, MoneyCents::new(cents)))
                .collect(),
        ),
        (None, None) => {
            return Err(ServerError::Generic(
                "either split_type or splits is required".to_string(),
            ));
        }
    };

    let expense = state
        .engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: payload.paid_by_user_id,
            amount: MoneyCents::new(payload.amount_minor),
            description: payload.description,
            split,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(expense))))
}
