use std::collections::{BTreeMap, BTreeSet};

use sea_orm::Database;

use engine::{Engine, EngineError, ExpenseCmd, MoneyCents, SplitPolicy};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build()
}

async fn trio_group(engine: &Engine) -> (Uuid, Uuid, Uuid, Uuid) {
    let alice = engine.new_user("Alice", None).await.unwrap();
    let bob = engine.new_user("Bob", None).await.unwrap();
    let carol = engine.new_user("Carol", None).await.unwrap();

    let group = engine
        .new_group("Trip", &BTreeSet::from([alice.id, bob.id, carol.id]))
        .await
        .unwrap();

    (group.id, alice.id, bob.id, carol.id)
}

#[tokio::test]
async fn equal_split_creates_one_share_per_member() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, carol) = trio_group(&engine).await;

    let expense = engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(9000),
            description: Some("Dinner".to_string()),
            split: SplitPolicy::Equal,
        })
        .await
        .unwrap();

    assert_eq!(expense.splits.len(), 3);
    for id in [alice, bob, carol] {
        assert_eq!(expense.splits[&id], MoneyCents::new(3000));
    }

    let stored = engine.list_expenses(group_id, false).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].splits, expense.splits);
    assert!(!stored[0].archived);
}

#[tokio::test]
async fn balances_for_one_equal_expense() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, carol) = trio_group(&engine).await;

    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(9000),
            description: None,
            split: SplitPolicy::Equal,
        })
        .await
        .unwrap();

    let transfers = engine.balances(group_id).await.unwrap();
    assert_eq!(transfers.len(), 2);
    for transfer in &transfers {
        assert_eq!(transfer.to, alice);
        assert_eq!(transfer.amount, MoneyCents::new(3000));
    }
    let froms: BTreeSet<Uuid> = transfers.iter().map(|t| t.from).collect();
    assert_eq!(froms, BTreeSet::from([bob, carol]));
}

#[tokio::test]
async fn full_settlement_archives_all_active_expenses() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, carol) = trio_group(&engine).await;

    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(9000),
            description: None,
            split: SplitPolicy::Equal,
        })
        .await
        .unwrap();

    // First payment only: nothing is archived yet.
    engine
        .settle(group_id, bob, alice, MoneyCents::new(3000))
        .await
        .unwrap();
    let active = engine.list_expenses(group_id, false).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(engine.list_expenses(group_id, true).await.unwrap().is_empty());

    // Second payment zeroes every position: everything archives at once.
    engine
        .settle(group_id, carol, alice, MoneyCents::new(3000))
        .await
        .unwrap();
    assert!(engine.list_expenses(group_id, false).await.unwrap().is_empty());
    let archived = engine.list_expenses(group_id, true).await.unwrap();
    assert_eq!(archived.len(), 3);
    assert_eq!(archived.iter().filter(|e| e.is_settlement()).count(), 2);

    // And the group reports no outstanding transfers.
    assert!(engine.balances(group_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn settle_rejects_invalid_inputs() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, _) = trio_group(&engine).await;

    let err = engine
        .settle(group_id, bob, bob, MoneyCents::new(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .settle(group_id, bob, alice, MoneyCents::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .settle(group_id, Uuid::new_v4(), alice, MoneyCents::new(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Failed settles leave the ledger untouched.
    assert!(engine.list_expenses(group_id, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_old_deletes_archived_and_is_idempotent() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, carol) = trio_group(&engine).await;

    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(9000),
            description: None,
            split: SplitPolicy::Equal,
        })
        .await
        .unwrap();
    engine
        .settle(group_id, bob, alice, MoneyCents::new(3000))
        .await
        .unwrap();
    engine
        .settle(group_id, carol, alice, MoneyCents::new(3000))
        .await
        .unwrap();

    engine.clear_old(group_id).await.unwrap();
    assert!(engine.list_expenses(group_id, true).await.unwrap().is_empty());

    // Second call: no error, no effect.
    engine.clear_old(group_id).await.unwrap();
    assert!(engine.list_expenses(group_id, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_split_with_mismatched_sum_is_accepted() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, _) = trio_group(&engine).await;

    // Owed total (10.00) differs from the paid total (25.00): accepted,
    // the residue stays with the payer's position.
    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(2500),
            description: None,
            split: SplitPolicy::Explicit(BTreeMap::from([(bob, MoneyCents::new(1000))])),
        })
        .await
        .unwrap();

    let transfers = engine.balances(group_id).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, bob);
    assert_eq!(transfers[0].to, alice);
    assert_eq!(transfers[0].amount, MoneyCents::new(1000));
}

#[tokio::test]
async fn explicit_split_rejects_unknown_user() {
    let engine = engine_with_db().await;
    let (group_id, alice, _, _) = trio_group(&engine).await;

    let err = engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(1000),
            description: None,
            split: SplitPolicy::Explicit(BTreeMap::from([(
                Uuid::new_v4(),
                MoneyCents::new(1000),
            )])),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // The rejected expense never reached the store.
    assert!(engine.list_expenses(group_id, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn split_for_user_outside_group_still_counts() {
    let engine = engine_with_db().await;
    let (group_id, alice, _, _) = trio_group(&engine).await;
    let outsider = engine.new_user("Dave", None).await.unwrap();

    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(700),
            description: None,
            split: SplitPolicy::Explicit(BTreeMap::from([(outsider.id, MoneyCents::new(700))])),
        })
        .await
        .unwrap();

    let transfers = engine.balances(group_id).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, outsider.id);
    assert_eq!(transfers[0].to, alice);
}

#[tokio::test]
async fn archived_expenses_do_not_affect_balances() {
    let engine = engine_with_db().await;
    let (group_id, alice, bob, carol) = trio_group(&engine).await;

    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: alice,
            amount: MoneyCents::new(9000),
            description: None,
            split: SplitPolicy::Equal,
        })
        .await
        .unwrap();
    engine
        .settle(group_id, bob, alice, MoneyCents::new(3000))
        .await
        .unwrap();
    engine
        .settle(group_id, carol, alice, MoneyCents::new(3000))
        .await
        .unwrap();

    // New expense after the archive cycle starts a fresh ledger.
    engine
        .new_expense(ExpenseCmd {
            group_id,
            paid_by: bob,
            amount: MoneyCents::new(3000),
            description: None,
            split: SplitPolicy::Equal,
        })
        .await
        .unwrap();

    let transfers = engine.balances(group_id).await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|t| t.to == bob));
    assert!(
        transfers
            .iter()
            .all(|t| t.amount == MoneyCents::new(1000))
    );
}
