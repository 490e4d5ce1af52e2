use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build();
    server::router(engine)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_user(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({ "name": name, "email": null })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn expense_balance_settle_archive_flow() {
    let app = app().await;

    let alice = create_user(&app, "Alice").await;
    let bob = create_user(&app, "Bob").await;
    let carol = create_user(&app, "Carol").await;

    let (status, group) = send(
        &app,
        "POST",
        "/groups",
        Some(json!({ "name": "Trip", "member_user_ids": [alice, bob, carol] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap().to_string();

    let (status, expense) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "paid_by_user_id": alice,
            "amount_minor": 9000,
            "description": "Dinner",
            "split_type": "EQUAL",
            "splits": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["splits"].as_object().unwrap().len(), 3);

    let (status, balances) =
        send(&app, "GET", &format!("/groups/{group_id}/balances"), None).await;
    assert_eq!(status, StatusCode::OK);
    let transfers = balances.as_array().unwrap();
    assert_eq!(transfers.len(), 2);
    for transfer in transfers {
        assert_eq!(transfer["to_user_id"].as_str().unwrap(), alice);
        assert_eq!(transfer["amount_minor"].as_i64().unwrap(), 3000);
    }

    for debtor in [&bob, &carol] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/groups/{group_id}/settle"),
            Some(json!({
                "from_user_id": debtor,
                "to_user_id": alice,
                "amount_minor": 3000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, balances) = send(&app, "GET", &format!("/groups/{group_id}/balances"), None).await;
    assert!(balances.as_array().unwrap().is_empty());

    let (status, archived) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/expenses/archived"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived.as_array().unwrap().len(), 3);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/clear-old"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, archived) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/expenses/archived"),
        None,
    )
    .await;
    assert!(archived.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_group_returns_404() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "GET",
        "/groups/00000000-0000-0000-0000-000000000000/balances",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn self_settlement_returns_422() {
    let app = app().await;

    let alice = create_user(&app, "Alice").await;
    let (_, group) = send(
        &app,
        "POST",
        "/groups",
        Some(json!({ "name": "Solo", "member_user_ids": [alice] })),
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/settle"),
        Some(json!({
            "from_user_id": alice,
            "to_user_id": alice,
            "amount_minor": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expense_without_split_policy_returns_400() {
    let app = app().await;

    let alice = create_user(&app, "Alice").await;
    let (_, group) = send(
        &app,
        "POST",
        "/groups",
        Some(json!({ "name": "Solo", "member_user_ids": [alice] })),
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "paid_by_user_id": alice,
            "amount_minor": 1000,
            "description": null,
            "split_type": null,
            "splits": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
