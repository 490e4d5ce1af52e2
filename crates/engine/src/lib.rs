use std::collections::{BTreeMap, BTreeSet};

pub use balances::{Transfer, net_positions, transfers};
pub use error::EngineError;
pub use expenses::{Expense, SETTLEMENT_DESCRIPTION};
pub use groups::Group;
pub use money::MoneyCents;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
pub use split::equal_split;
pub use users::User;
use uuid::Uuid;

mod balances;
mod error;
mod expenses;
mod groups;
mod memberships;
mod money;
mod split;
mod splits;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

/// How to derive the per-user owed amounts of a new expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Equal share per current group member (payer included).
    Equal,
    /// Caller-provided owed amounts.
    Explicit(BTreeMap<Uuid, MoneyCents>),
}

/// Inputs for creating an expense.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub group_id: Uuid,
    pub paid_by: Uuid,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub split: SplitPolicy,
}

#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Add a new user.
    pub async fn new_user(&self, name: &str, email: Option<&str>) -> ResultEngine<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "user name must not be empty".to_string(),
            ));
        }

        let user = User::new(name.to_string(), email.map(|s| s.to_string()));
        users::ActiveModel::from(&user).insert(&self.database).await?;
        Ok(user)
    }

    /// List all users ordered by name.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Case-insensitive substring search on user names.
    ///
    /// A blank query returns an empty list instead of everything.
    pub async fn search_users(&self, query: &str) -> ResultEngine<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let models = users::Entity::find()
            .filter(users::Column::Name.contains(query))
            .order_by_asc(users::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Delete a user, detaching them from all groups first.
    ///
    /// A user referenced by any expense (as payer or split holder) cannot be
    /// deleted; that history belongs to the group's ledger.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let user = users::Entity::find_by_id(user_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))?;

        let paid = expenses::Entity::find()
            .filter(expenses::Column::PaidBy.eq(user_id.to_string()))
            .count(&db_tx)
            .await?;
        let owes = splits::Entity::find()
            .filter(splits::Column::UserId.eq(user_id.to_string()))
            .count(&db_tx)
            .await?;
        if paid > 0 || owes > 0 {
            return Err(EngineError::InvalidInput(
                "user has recorded expenses and cannot be deleted".to_string(),
            ));
        }

        memberships::Entity::delete_many()
            .filter(memberships::Column::UserId.eq(user_id.to_string()))
            .exec(&db_tx)
            .await?;
        users::ActiveModel::from(user).delete(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Add a new group. Unknown member ids are silently dropped.
    pub async fn new_group(
        &self,
        name: &str,
        member_ids: &BTreeSet<Uuid>,
    ) -> ResultEngine<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "group name must not be empty".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        let known: BTreeSet<Uuid> = users::Entity::find()
            .filter(
                users::Column::Id
                    .is_in(member_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>()),
            )
            .all(&db_tx)
            .await?
            .into_iter()
            .filter_map(|model| Uuid::parse_str(&model.id).ok())
            .collect();

        let group = Group::new(name.to_string(), known);
        groups::ActiveModel::from(&group).insert(&db_tx).await?;
        for member_id in &group.members {
            memberships::ActiveModel {
                group_id: ActiveValue::Set(group.id.to_string()),
                user_id: ActiveValue::Set(member_id.to_string()),
            }
            .insert(&db_tx)
            .await?;
        }

        db_tx.commit().await?;
        Ok(group)
    }

    /// List all groups with their member sets.
    pub async fn list_groups(&self) -> ResultEngine<Vec<Group>> {
        let models = groups::Entity::find()
            .order_by_asc(groups::Column::Name)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let mut group = Group::try_from(model)?;
            group.members = member_ids(&self.database, group.id).await?;
            out.push(group);
        }
        Ok(out)
    }

    /// Return a group with its member set.
    pub async fn group(&self, group_id: Uuid) -> ResultEngine<Group> {
        let model = group_model(&self.database, group_id).await?;
        let mut group = Group::try_from(model)?;
        group.members = member_ids(&self.database, group_id).await?;
        Ok(group)
    }

    /// Rename a group.
    pub async fn rename_group(&self, group_id: Uuid, name: &str) -> ResultEngine<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "group name must not be empty".to_string(),
            ));
        }

        group_model(&self.database, group_id).await?;
        let model = groups::ActiveModel {
            id: ActiveValue::Set(group_id.to_string()),
            name: ActiveValue::Set(name.to_string()),
        }
        .update(&self.database)
        .await?;

        let mut group = Group::try_from(model)?;
        group.members = member_ids(&self.database, group_id).await?;
        Ok(group)
    }

    /// Delete a group with its memberships, expenses and splits.
    pub async fn delete_group(&self, group_id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let group = group_model(&db_tx, group_id).await?;

        let expense_ids: Vec<String> = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.to_string()))
            .all(&db_tx)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();
        if !expense_ids.is_empty() {
            splits::Entity::delete_many()
                .filter(splits::Column::ExpenseId.is_in(expense_ids.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::Id.is_in(expense_ids))
                .exec(&db_tx)
                .await?;
        }
        memberships::Entity::delete_many()
            .filter(memberships::Column::GroupId.eq(group_id.to_string()))
            .exec(&db_tx)
            .await?;
        groups::ActiveModel::from(group).delete(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// List a group's expenses, either the active or the archived ones.
    pub async fn list_expenses(&self, group_id: Uuid, archived: bool) -> ResultEngine<Vec<Expense>> {
        group_model(&self.database, group_id).await?;
        load_expenses(&self.database, group_id, archived).await
    }

    /// Record a new expense.
    ///
    /// With [`SplitPolicy::Equal`] the owed amounts are an equal share per
    /// current group member. Explicit splits are taken as-is; a split sum
    /// that differs from the total is accepted and logged, since the payer
    /// credit and the owed debits are independent signals for the balance
    /// engine.
    pub async fn new_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let db_tx = self.database.begin().await?;

        group_model(&db_tx, cmd.group_id).await?;
        user_model(&db_tx, cmd.paid_by).await?;

        let splits = match cmd.split {
            SplitPolicy::Equal => {
                let members = member_ids(&db_tx, cmd.group_id).await?;
                split::equal_split(cmd.amount, &members)?
            }
            SplitPolicy::Explicit(splits) => {
                for user_id in splits.keys() {
                    user_model(&db_tx, *user_id).await?;
                }
                splits
            }
        };

        let expense = Expense::new(
            cmd.group_id,
            cmd.paid_by,
            cmd.amount,
            cmd.description,
            splits,
        )?;

        let owed_total: MoneyCents = expense
            .splits
            .values()
            .fold(MoneyCents::ZERO, |acc, owed| acc + *owed);
        if owed_total != expense.amount {
            tracing::warn!(
                expense_id = %expense.id,
                amount = %expense.amount,
                owed_total = %owed_total,
                "expense splits do not sum to the total amount"
            );
        }

        expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
        for (user_id, owed) in &expense.splits {
            splits::active_model(expense.id, *user_id, *owed)
                .insert(&db_tx)
                .await?;
        }

        db_tx.commit().await?;
        Ok(expense)
    }

    /// Computes the transfer list that settles the group's active expenses.
    pub async fn balances(&self, group_id: Uuid) -> ResultEngine<Vec<Transfer>> {
        group_model(&self.database, group_id).await?;
        let members = member_ids(&self.database, group_id).await?;
        let active = load_expenses(&self.database, group_id, false).await?;

        let net = balances::net_positions(&active, &members);
        Ok(balances::transfers(&net))
    }

    /// Records a settlement payment from `from` to `to`.
    ///
    /// The payment is stored as a synthetic expense. If it drives every
    /// member's net position to exactly zero, all active expenses of the
    /// group (the settlement included) are archived in the same database
    /// transaction, so the check cannot race a concurrent expense insert.
    pub async fn settle(
        &self,
        group_id: Uuid,
        from: Uuid,
        to: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "settlement amount must be > 0".to_string(),
            ));
        }
        if from == to {
            return Err(EngineError::InvalidInput(
                "from and to must differ".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        group_model(&db_tx, group_id).await?;
        user_model(&db_tx, from).await?;
        user_model(&db_tx, to).await?;

        let settlement = Expense::settlement(group_id, from, to, amount)?;
        expenses::ActiveModel::from(&settlement).insert(&db_tx).await?;
        splits::active_model(settlement.id, to, amount)
            .insert(&db_tx)
            .await?;

        let members = member_ids(&db_tx, group_id).await?;
        let active = load_expenses(&db_tx, group_id, false).await?;
        let net = balances::net_positions(&active, &members);

        if net.values().all(|position| position.is_zero()) {
            expenses::Entity::update_many()
                .col_expr(expenses::Column::Archived, Expr::value(true))
                .filter(expenses::Column::GroupId.eq(group_id.to_string()))
                .filter(expenses::Column::Archived.eq(false))
                .exec(&db_tx)
                .await?;
            tracing::info!(%group_id, "group fully settled, active expenses archived");
        }

        db_tx.commit().await?;
        Ok(())
    }

    /// Permanently deletes the group's archived expenses. Idempotent.
    pub async fn clear_old(&self, group_id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        group_model(&db_tx, group_id).await?;

        let archived_ids: Vec<String> = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.to_string()))
            .filter(expenses::Column::Archived.eq(true))
            .all(&db_tx)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();

        if !archived_ids.is_empty() {
            splits::Entity::delete_many()
                .filter(splits::Column::ExpenseId.is_in(archived_ids.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::Id.is_in(archived_ids))
                .exec(&db_tx)
                .await?;
        }

        db_tx.commit().await?;
        Ok(())
    }
}

async fn group_model<C: ConnectionTrait>(conn: &C, group_id: Uuid) -> ResultEngine<groups::Model> {
    groups::Entity::find_by_id(group_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("group not exists".to_string()))
}

async fn user_model<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))
}

async fn member_ids<C: ConnectionTrait>(conn: &C, group_id: Uuid) -> ResultEngine<BTreeSet<Uuid>> {
    let rows = memberships::Entity::find()
        .filter(memberships::Column::GroupId.eq(group_id.to_string()))
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|row| {
            Uuid::parse_str(&row.user_id)
                .map_err(|_| EngineError::NotFound("user not exists".to_string()))
        })
        .collect()
}

async fn load_expenses<C: ConnectionTrait>(
    conn: &C,
    group_id: Uuid,
    archived: bool,
) -> ResultEngine<Vec<Expense>> {
    let rows = expenses::Entity::find()
        .filter(expenses::Column::GroupId.eq(group_id.to_string()))
        .filter(expenses::Column::Archived.eq(archived))
        .order_by_asc(expenses::Column::CreatedAt)
        .find_with_related(splits::Entity)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(model, split_models)| Expense::from_models(model, split_models))
        .collect()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
