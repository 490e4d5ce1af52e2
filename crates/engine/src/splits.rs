//! `expense_splits` rows: one row per (expense, user) owed amount.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub user_id: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds the active model for one split row of an expense.
pub(crate) fn active_model(expense_id: Uuid, user_id: Uuid, owed: MoneyCents) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        expense_id: ActiveValue::Set(expense_id.to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        amount_minor: ActiveValue::Set(owed.cents()),
    }
}
