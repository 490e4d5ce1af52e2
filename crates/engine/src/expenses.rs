//! Expense primitives.
//!
//! An `Expense` records who paid, how much, and how the amount is split
//! across members. A settlement payment is a degenerate expense with a
//! single split entry and the [`SETTLEMENT_DESCRIPTION`] sentinel.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Description used for synthetic settlement expenses.
pub const SETTLEMENT_DESCRIPTION: &str = "Settlement";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub paid_by: Uuid,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    /// Amount owed per user. The engine never assumes these sum to `amount`.
    pub splits: BTreeMap<Uuid, MoneyCents>,
}

impl Expense {
    pub fn new(
        group_id: Uuid,
        paid_by: Uuid,
        amount: MoneyCents,
        description: Option<String>,
        splits: BTreeMap<Uuid, MoneyCents>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "amount must be > 0".to_string(),
            ));
        }
        if splits.values().any(|owed| owed.is_negative()) {
            return Err(EngineError::InvalidInput(
                "split amounts must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            paid_by,
            amount,
            description,
            archived: false,
            created_at: Utc::now(),
            splits,
        })
    }

    /// Builds the synthetic expense for a settlement payment: `from` pays
    /// the full amount and `to` owes all of it back through the split.
    pub fn settlement(
        group_id: Uuid,
        from: Uuid,
        to: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<Self> {
        Self::new(
            group_id,
            from,
            amount,
            Some(SETTLEMENT_DESCRIPTION.to_string()),
            BTreeMap::from([(to, amount)]),
        )
    }

    pub fn is_settlement(&self) -> bool {
        self.description.as_deref() == Some(SETTLEMENT_DESCRIPTION)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub paid_by: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub archived: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id"
    )]
    Groups,
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.to_string()),
            paid_by: ActiveValue::Set(expense.paid_by.to_string()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            description: ActiveValue::Set(expense.description.clone()),
            archived: ActiveValue::Set(expense.archived),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl Expense {
    /// Rebuilds the domain expense from its row plus its split rows.
    pub(crate) fn from_models(
        model: Model,
        split_models: Vec<super::splits::Model>,
    ) -> ResultEngine<Self> {
        let mut splits = BTreeMap::new();
        for split in split_models {
            let user_id = Uuid::parse_str(&split.user_id)
                .map_err(|_| EngineError::NotFound("user not exists".to_string()))?;
            splits.insert(user_id, MoneyCents::new(split.amount_minor));
        }

        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("expense not exists".to_string()))?,
            group_id: Uuid::parse_str(&model.group_id)
                .map_err(|_| EngineError::NotFound("group not exists".to_string()))?,
            paid_by: Uuid::parse_str(&model.paid_by)
                .map_err(|_| EngineError::NotFound("user not exists".to_string()))?,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            archived: model.archived,
            created_at: model.created_at,
            splits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_has_sentinel_and_single_split() {
        let group = Uuid::new_v4();
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();

        let expense = Expense::settlement(group, from, to, MoneyCents::new(3000)).unwrap();
        assert!(expense.is_settlement());
        assert_eq!(expense.paid_by, from);
        assert_eq!(expense.splits, BTreeMap::from([(to, MoneyCents::new(3000))]));
        assert!(!expense.archived);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let id = Uuid::new_v4();
        let err = Expense::new(id, id, MoneyCents::ZERO, None, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn rejects_negative_split() {
        let id = Uuid::new_v4();
        let splits = BTreeMap::from([(Uuid::new_v4(), MoneyCents::new(-1))]);
        let err = Expense::new(id, id, MoneyCents::new(100), None, splits).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
