use chrono::{Duration as ChronoDuration, Utc};
use billbook_auth::{JwtClaims, Role};
use billbook_core::{ClientId, ProductId, UserId};
use billbook_infra::config::AdminSeed;
use billbook_infra::store::InMemoryStore;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "admin@billbook.test";
const ADMIN_PASSWORD: &str = "correct horse";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_token_ttl(ChronoDuration::minutes(10)).await
    }

    async fn spawn_with_token_ttl(token_ttl: ChronoDuration) -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let services = billbook_api::app::services::AppServices::in_memory(InMemoryStore::new(), 3);
        services
            .seed_admin(&AdminSeed {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            })
            .await
            .expect("failed to seed admin");

        let app = billbook_api::app::build_app(services, JWT_SECRET, token_ttl);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, role: Role, valid_from: chrono::DateTime<Utc>) -> String {
    let claims = JwtClaims {
        sub: UserId::new(),
        email: "clerk@billbook.test".to_string(),
        role,
        issued_at: valid_from,
        expires_at: valid_from + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn clerk_token() -> String {
    mint_jwt(JWT_SECRET, Role::clerk(), Utc::now())
}

async fn create_client(client: &reqwest::Client, srv: &TestServer, token: &str, name: &str) -> String {
    let res = client
        .post(srv.url("/clients"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "contact": { "phone": "555-0100" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn create_product(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    description: &str,
    unit_price: &str,
    stock: i64,
) -> String {
    let res = client
        .post(srv.url("/products"))
        .bearer_auth(token)
        .json(&json!({ "description": description, "unit_price": unit_price, "stock": stock }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn product_stock(client: &reqwest::Client, srv: &TestServer, token: &str, id: &str) -> i64 {
    let res = client
        .get(srv.url(&format!("/products/{id}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["stock"].as_i64().unwrap()
}

async fn post_invoice(client: &reqwest::Client, srv: &TestServer, token: &str, body: Value) -> reqwest::Response {
    client
        .post(srv.url("/invoices"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/invoices"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("other-secret", Role::admin(), Utc::now());
    let res = client
        .get(srv.url("/clients"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let expired = mint_jwt(JWT_SECRET, Role::admin(), Utc::now() - ChronoDuration::hours(1));
    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_token_for_seeded_admin() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": "ADMIN@billbook.test", "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let whoami: Value = res.json().await.unwrap();
    assert_eq!(whoami["email"], ADMIN_EMAIL);
    assert_eq!(whoami["role"], "admin");
}

#[tokio::test]
async fn login_with_unrepresentable_expiry_fails_without_crashing() {
    let srv = TestServer::spawn_with_token_ttl(ChronoDuration::MAX).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "token_error");

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn invoice_creation_prices_lines_and_decrements_stock() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = clerk_token();

    let c1 = create_client(&client, &srv, &token, "C1").await;
    let p1 = create_product(&client, &srv, &token, "P1", "5.00", 10).await;
    let p2 = create_product(&client, &srv, &token, "P2", "2.50", 10).await;

    let res = post_invoice(
        &client,
        &srv,
        &token,
        json!({
            "client_id": c1,
            "quantities": { (p1.clone()): 3, (p2.clone()): "0" },
            "as_of": "2024-05-01",
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let invoice: Value = res.json().await.unwrap();
    assert_eq!(invoice["total"], "15.00");
    assert_eq!(invoice["total_cents"], 1500);
    assert_eq!(invoice["issue_date"], "2024-05-01");
    assert_eq!(invoice["lines"].as_array().unwrap().len(), 1);
    assert_eq!(invoice["lines"][0]["unit_price"], "5.00");

    assert_eq!(product_stock(&client, &srv, &token, &p1).await, 7);
    assert_eq!(product_stock(&client, &srv, &token, &p2).await, 10);

    let id = invoice["id"].as_str().unwrap();
    let res = client
        .get(srv.url(&format!("/invoices/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["client"]["name"], "C1");
    assert_eq!(detail["lines"][0]["quantity"], 3);
}

#[tokio::test]
async fn insufficient_stock_is_a_conflict_and_changes_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = clerk_token();

    let c1 = create_client(&client, &srv, &token, "C1").await;
    let p1 = create_product(&client, &srv, &token, "P1", "5.00", 10).await;
    let p2 = create_product(&client, &srv, &token, "P2", "1.00", 2).await;

    let res = post_invoice(
        &client,
        &srv,
        &token,
        json!({ "client_id": c1, "quantities": { (p1.clone()): 1, (p2.clone()): 5 } }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["product_id"], p2.as_str());
    assert_eq!(body["available"], 2);

    assert_eq!(product_stock(&client, &srv, &token, &p1).await, 10);
    assert_eq!(product_stock(&client, &srv, &token, &p2).await, 2);

    let res = client
        .get(srv.url("/invoices"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let list: Value = res.json().await.unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_references_and_bad_ids_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = clerk_token();

    let c1 = create_client(&client, &srv, &token, "C1").await;

    let res = post_invoice(
        &client,
        &srv,
        &token,
        json!({ "client_id": ClientId::new().to_string(), "quantities": {} }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_client");

    let res = post_invoice(
        &client,
        &srv,
        &token,
        json!({ "client_id": c1, "quantities": { (ProductId::new().to_string()): 1 } }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_product");

    let res = post_invoice(&client, &srv, &token, json!({ "client_id": "nope" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/clients/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_invoice_is_created_with_zero_total() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = clerk_token();

    let c1 = create_client(&client, &srv, &token, "C1").await;
    let res = post_invoice(&client, &srv, &token, json!({ "client_id": c1 })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let invoice: Value = res.json().await.unwrap();
    assert_eq!(invoice["total_cents"], 0);
    assert!(invoice["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn product_validation_and_referenced_deletes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = clerk_token();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&json!({ "description": "Bad", "unit_price": "1.999", "stock": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .json(&json!({ "description": "Bad", "unit_price": "1.00", "stock": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let c1 = create_client(&client, &srv, &token, "C1").await;
    let sold = create_product(&client, &srv, &token, "Sold", "1.00", 5).await;
    let unsold = create_product(&client, &srv, &token, "Unsold", "1.00", 5).await;
    let res = post_invoice(
        &client,
        &srv,
        &token,
        json!({ "client_id": c1, "quantities": { (sold.clone()): 1 } }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .delete(srv.url(&format!("/clients/{c1}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .delete(srv.url(&format!("/products/{sold}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .delete(srv.url(&format!("/products/{unsold}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url(&format!("/products/{unsold}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reports_cover_ranges_and_clients() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = clerk_token();

    let c1 = create_client(&client, &srv, &token, "C1").await;
    let c2 = create_client(&client, &srv, &token, "C2").await;
    let p1 = create_product(&client, &srv, &token, "P1", "1.00", 100).await;

    for (client_id, qty, date) in [(&c1, 1, "2024-01-01"), (&c2, 2, "2024-01-15"), (&c1, 4, "2024-02-01")] {
        let res = post_invoice(
            &client,
            &srv,
            &token,
            json!({ "client_id": client_id, "quantities": { (p1.clone()): qty }, "as_of": date }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(srv.url("/reports/sales?from=2024-01-01&to=2024-01-31"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["invoice_count"], 2);
    assert_eq!(report["total_cents"], 300);

    let res = client
        .get(srv.url("/reports/sales?from=2024-02-01&to=2024-01-01"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url(&format!("/reports/clients/{c1}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["client"]["name"], "C1");
    assert_eq!(report["invoice_count"], 2);
    assert_eq!(report["total"], "5.00");

    let res = client
        .get(srv.url(&format!("/reports/clients/{}", ClientId::new())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
