use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{balances, expenses, groups, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/search", get(users::search))
        .route("/users/{user_id}", axum::routing::delete(users::delete))
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/{group_id}",
            get(groups::get)
                .put(groups::rename)
                .delete(groups::delete),
        )
        .route(
            "/groups/{group_id}/expenses",
            get(expenses::list_active).post(expenses::create),
        )
        .route(
            "/groups/{group_id}/expenses/archived",
            get(expenses::list_archived),
        )
        .route("/groups/{group_id}/balances", get(balances::get))
        .route("/groups/{group_id}/settle", post(balances::settle))
        .route("/groups/{group_id}/clear-old", post(balances::clear_old))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
