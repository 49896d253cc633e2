use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, first_name, last_name, preferred_currency_id) \
             VALUES (?, ?, ?, ?, \
             (SELECT id FROM currencies WHERE code = 'EUR' AND owner_username IS NULL))",
            vec![
                username.into(),
                "password".into(),
                "Test".into(),
                "User".into(),
            ],
        ))
        .await
        .unwrap();
    }
    let rates = engine::FixedRates::new().with("USD", "EUR", dec!(0.90));
    let engine = engine::Engine::builder()
        .database(db.clone())
        .rates(Arc::new(rates))
        .build()
        .await
        .unwrap();
    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn authed(method: &str, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
    let credentials =
        base64::engine::general_purpose::STANDARD.encode(format!("{user}:password"));
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Basic {credentials}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_credentials_are_unauthorized() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let credentials = base64::engine::general_purpose::STANDARD.encode("alice:wrong");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .header(header::AUTHORIZATION, format!("Basic {credentials}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_collection_endpoints_are_forbidden() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/users", "alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed("POST", "/users", "alice", Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(authed("DELETE", "/users/bob", "alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn category_tree_and_cycle_guard_over_http() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Food", "currency": "USD"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let food = json_body(response).await;
    let food_id = food["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Groceries", "currency": "USD", "parent": food_id})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let groceries_id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/categories/{food_id}"),
            "alice",
            Some(json!({"parent": groceries_id})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed("GET", "/categories", "alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(response).await;
    assert_eq!(listing["categories"][0]["name"], "Food");
    assert_eq!(listing["categories"][0]["children"][0]["name"], "Groceries");

    // Owner scoping: bob sees nothing of alice's tree.
    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            &format!("/categories/{food_id}"),
            "bob",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Detach via the "none" sentinel.
    let response = app
        .oneshot(authed(
            "PATCH",
            &format!("/categories/{groceries_id}"),
            "alice",
            Some(json!({"parent": "none"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detached = json_body(response).await;
    assert!(detached.get("parent").is_none());
}

#[tokio::test]
async fn currency_cascade_over_http() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Groceries", "currency": "USD"})),
        ))
        .await
        .unwrap();
    let category_id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/transactions",
            "alice",
            Some(json!({
                "description": "Weekly shop",
                "amount": "50.000",
                "currency": "USD",
                "date": "2026-01-15",
                "categories": [{"category_id": category_id, "amount": "50.000"}],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction_id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/categories/{category_id}"),
            "alice",
            Some(json!({"currency": "EUR"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["currency"], "EUR");

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/transactions/{transaction_id}"),
            "alice",
            None,
        ))
        .await
        .unwrap();
    let transaction = json_body(response).await;
    let amount: rust_decimal::Decimal = transaction["categories"][0]["amount"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(amount, dec!(45.000));
}

#[tokio::test]
async fn update_requires_at_least_one_field() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/categories",
            "alice",
            Some(json!({"name": "Food", "currency": "EUR"})),
        ))
        .await
        .unwrap();
    let category_id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/categories/{category_id}"),
            "alice",
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A name-only update leaves the currency alone.
    let response = app
        .oneshot(authed(
            "PATCH",
            &format!("/categories/{category_id}"),
            "alice",
            Some(json!({"name": "Meals"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["name"], "Meals");
    assert_eq!(updated["currency"], "EUR");
}
