use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use stockpile_core::catalog::{NewProduct, ProductCategory};
use stockpile_core::stockpile::AverageRoundPrice;
use stockpile_server::{api::app_router, auth::Claims, build_state, config::Config};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const SECRET: &[u8] = b"test-secret-test-secret-test-sec";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

fn product(id: &str, price: rust_decimal::Decimal) -> NewProduct {
    NewProduct {
        id: id.to_string(),
        name: id.to_uppercase(),
        description: None,
        category: ProductCategory::Ammunition,
        caliber: Some(id.to_string()),
        price,
        stock_quantity: 10_000,
        image_url: None,
    }
}

async fn build_test_app() -> TestApp {
    let dir = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        jwt_secret: SECRET.to_vec(),
        average_round_price: AverageRoundPrice::default(),
        catalog_seed: None,
        scheduler_interval: None,
    };
    let state = build_state(&config).await.unwrap();
    state
        .catalog_service
        .seed_products(vec![product("a", dec!(2.00)), product("b", dec!(0.50))])
        .await
        .unwrap();

    TestApp {
        router: app_router(state, &config),
        _dir: dir,
    }
}

fn token_for(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: Some(now),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn onboard(app: &TestApp, user: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/onboarding/complete",
        Some(user),
        Some(json!({
            "userId": user,
            "monthlyBudget": 100,
            "calibers": [
                { "id": "a", "name": "A", "monthlyAmount": 40, "targetQuantity": 100 },
                { "id": "b", "name": "B", "monthlyAmount": 50 }
            ],
            "shippingAddress": {
                "street1": "1 Range Rd",
                "city": "Austin",
                "state": "TX",
                "postalCode": "78701",
                "country": "US"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn health_is_public_and_data_routes_require_a_token() {
    let app = build_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/v1/stockpile/summary", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/stockpile/summary")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn onboarding_for_another_user_is_forbidden() {
    let app = build_test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/onboarding/complete",
        Some("user-1"),
        Some(json!({
            "userId": "user-2",
            "monthlyBudget": 100,
            "calibers": [{ "id": "a", "monthlyAmount": 40 }],
            "shippingAddress": {
                "street1": "1 Range Rd",
                "city": "Austin",
                "state": "TX",
                "postalCode": "78701",
                "country": "US"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "Forbidden");
}

#[tokio::test]
async fn allocate_then_summarize() {
    let app = build_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/allocate",
        Some("user-1"),
        Some(json!({ "allocations": [{ "productId": "a", "amount": 40 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NoSubscription");

    onboard(&app, "user-1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/allocate",
        Some("user-1"),
        Some(json!({ "allocations": [
            { "productId": "a", "amount": 40 },
            { "productId": "b", "amount": 50 }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["remainingBudget"], 10.0);
    assert_eq!(body["results"][0]["quantity"], 20.0);
    assert_eq!(body["results"][1]["quantity"], 100.0);
    assert!(body.get("errors").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/allocate",
        Some("user-1"),
        Some(json!({ "allocations": [
            { "productId": "a", "amount": 40 },
            { "productId": "b", "amount": 70 }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BudgetExceeded");
    assert_eq!(body["details"]["totalAllocation"], 110.0);

    let huge: Value = serde_json::from_str("50000000000000000000000000000").unwrap();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/allocate",
        Some("user-1"),
        Some(json!({ "allocations": [
            { "productId": "a", "amount": huge },
            { "productId": "b", "amount": huge }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BudgetExceeded");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/allocate",
        Some("user-1"),
        Some(json!({ "nothing": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ValidationError");

    let (status, body) = send(&app, Method::GET, "/api/v1/stockpile/summary", Some("user-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["items"], 2);
    assert_eq!(body["summary"]["totalRounds"], 120.0);
    assert_eq!(body["summary"]["totalValue"], 90.0);
    assert_eq!(body["readiness"]["ready"], false);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/stockpile/history?limit=1",
        Some("user-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 2);
    assert_eq!(body["data"]["pagination"]["hasMore"], true);
}

#[tokio::test]
async fn trigger_upsert_is_idempotent_and_delete_is_scoped() {
    let app = build_test_app().await;

    for threshold in [500, 750] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/stockpile/triggers",
            Some("user-1"),
            Some(json!({ "triggerType": "budget", "thresholdValue": threshold })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, body) = send(&app, Method::GET, "/api/v1/stockpile/triggers", Some("user-1"), None).await;
    let triggers = body["data"].as_array().unwrap();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0]["thresholdValue"], 750.0);
    let trigger_id = triggers[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/triggers",
        Some("user-1"),
        Some(json!({ "triggerType": "weekly" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/stockpile/triggers?id={}", trigger_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some("user-2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, &uri, Some("user-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], trigger_id.as_str());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/stockpile/triggers", Some("user-1"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn shipment_deducts_stockpile_and_rejects_overdraw() {
    let app = build_test_app().await;
    onboard(&app, "user-1").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/allocate",
        Some("user-1"),
        Some(json!({ "allocations": [{ "productId": "b", "amount": 50 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let address = json!({
        "street1": "1 Range Rd",
        "city": "Austin",
        "state": "TX",
        "postalCode": "78701",
        "country": "US"
    });

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/trigger-shipment",
        Some("user-1"),
        Some(json!({
            "items": [{ "productId": "b", "quantity": 500 }],
            "shippingAddress": address
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stockpile/trigger-shipment",
        Some("user-1"),
        Some(json!({
            "items": [{ "productId": "b", "quantity": 60 }],
            "shippingAddress": address
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["totalValue"], 30.0);

    let (_, body) = send(&app, Method::GET, "/api/v1/stockpile/summary", Some("user-1"), None).await;
    assert_eq!(body["summary"]["totalRounds"], 40.0);

    let (_, body) = send(&app, Method::GET, "/api/v1/shipments", Some("user-1"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
