use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

use server::{ServerState, router};

async fn app() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    (router(ServerState { db: db.clone() }), db)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn expense(amount: Value, category: &str) -> Value {
    json!({
        "kind": "EXPENSE",
        "amount": amount,
        "categoryId": category,
        "description": "makan siang",
        "occurredOn": "2024-05-01",
    })
}

#[tokio::test]
async fn seeded_categories_and_users() {
    let (app, _db) = app().await;

    let (status, categories) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories.as_array().unwrap().len(), 9);

    let (status, income) = send(&app, Method::GET, "/categories/type/income", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(income.as_array().unwrap().len(), 3);

    let (status, users) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["email"], "admin@expensetracker.com");
}

#[tokio::test]
async fn create_list_and_delete_transaction() {
    let (app, _db) = app().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(expense(json!(50000), "food")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["kind"], "EXPENSE");
    assert_eq!(created["amount"], 50000);
    let id = created["id"].as_i64().unwrap();

    let (_, by_category) = send(&app, Method::GET, "/transactions/category/food", None).await;
    assert_eq!(by_category.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn legacy_body_is_normalized() {
    let (app, _db) = app().await;
    let legacy = json!({
        "type": "income",
        "amount": 750000,
        "category": "salary",
        "description": " gaji ",
        "transactionDate": "2024-05-25",
    });

    let (status, created) = send(&app, Method::POST, "/transactions", Some(legacy)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["kind"], "INCOME");
    assert_eq!(created["categoryId"], "salary");
    assert_eq!(created["description"], "gaji");
    assert_eq!(created["occurredOn"], "2024-05-25");
}

#[tokio::test]
async fn invalid_transactions_are_rejected() {
    let (app, _db) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(expense(json!(0), "food")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(expense(json!(10), "nope")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/transactions", Some(json!({"amount": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send(&app, Method::GET, "/transactions", None).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_applies_only_valid_fields() {
    let (app, _db) = app().await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(expense(json!(20000), "food")),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/transactions/{id}"),
        Some(json!({"amount": -5, "description": "  ", "categoryId": "transport"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount"], 20000);
    assert_eq!(updated["description"], "makan siang");
    assert_eq!(updated["categoryId"], "transport");
}

#[tokio::test]
async fn stats_follow_the_ledger() {
    let (app, _db) = app().await;
    let income = json!({
        "kind": "INCOME",
        "amount": 500000,
        "categoryId": "salary",
        "description": "gaji",
        "occurredOn": "2024-05-01",
    });
    send(&app, Method::POST, "/transactions", Some(income)).await;
    send(&app, Method::POST, "/transactions", Some(expense(json!(200000), "food"))).await;

    let (status, stats) = send(&app, Method::GET, "/stats?openingBalance=1000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalIncome"], 500000);
    assert_eq!(stats["totalExpense"], 200000);
    assert_eq!(stats["balance"], 1300000);

    let (status, _) = send(&app, Method::GET, "/stats?openingBalance=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, breakdown) = send(&app, Method::GET, "/stats/breakdown", None).await;
    assert_eq!(breakdown[0]["label"], "Makanan");
    assert_eq!(breakdown[0]["amount"], 200000);
}

#[tokio::test]
async fn deleted_category_shows_unknown_in_breakdown() {
    let (app, _db) = app().await;
    send(&app, Method::POST, "/transactions", Some(expense(json!(1000), "bills"))).await;

    let (status, _) = send(&app, Method::DELETE, "/categories/bills", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, breakdown) = send(&app, Method::GET, "/stats/breakdown", None).await;
    assert_eq!(breakdown[0]["label"], "Unknown");
}

#[tokio::test]
async fn category_crud() {
    let (app, _db) = app().await;
    let body = json!({"name": "Makan Siang", "type": "expense", "color": "#123456", "icon": "🍱"});

    let (status, created) = send(&app, Method::POST, "/categories", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "makan-siang");

    let (status, _) = send(&app, Method::POST, "/categories", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/categories/makan-siang",
        Some(json!({"name": "Lunch"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Lunch");
    assert_eq!(updated["color"], "#123456");

    let (status, _) = send(&app, Method::DELETE, "/categories/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_crud_enforces_unique_email() {
    let (app, _db) = app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Dup", "email": "user@expensetracker.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, created) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Sari", "email": "sari@mail.id", "role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "active");
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(json!({"status": "inactive"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "inactive");

    let (status, _) = send(&app, Method::POST, "/users", Some(json!({"name": "", "email": "x@y.z"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
