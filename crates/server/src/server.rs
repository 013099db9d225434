use std::net::SocketAddr;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;

use crate::{categories, statistics, transactions, user};

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/categories/type/{kind}", get(categories::by_type))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/transactions/type/{kind}", get(transactions::by_type))
        .route(
            "/transactions/category/{category_id}",
            get(transactions::by_category),
        )
        .route("/users", get(user::list).post(user::create))
        .route(
            "/users/{id}",
            get(user::get).put(user::update).delete(user::delete),
        )
        .route("/stats", get(statistics::get_stats))
        .route("/stats/breakdown", get(statistics::get_breakdown))
        .route("/stats/analytics", get(statistics::get_analytics))
        .with_state(state)
}

pub async fn run(db: DatabaseConnection, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState { db })).await
}

pub fn spawn_with_listener(
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
