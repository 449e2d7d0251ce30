//! Integration tests for `AnalyticsClient` using wiremock HTTP mocks.

use aivis_client::{
    AnalysisStatus, AnalyticsClient, ClientError, EntityRef, ErrorKind, NewProduct,
    RegisterRequest,
};
use aivis_core::AuthSession;
use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AnalyticsClient {
    AnalyticsClient::with_base_url(base_url, 5).expect("client construction should not fail")
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_product_analytics_sends_date_and_bearer() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "an-1",
        "type": "product",
        "status": "Completed",
        "analytics": {
            "insight_cards": [
                { "title": "Visibility", "value": "72%", "trend": "up" }
            ],
            "recommended_actions": [],
            "drilldowns": {
                "query_explorer": [],
                "sources_list": [{ "source": "reddit.com", "relevance_score": 8.5 }],
                "attributes_matrix": []
            }
        },
        "created_at": "2025-03-14T09:00:00Z"
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/products/p-42"))
        .and(query_param("date", "2025-03-14"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let envelope = client
        .get_product_analytics("p-42", day(), "tok-123")
        .await
        .expect("should parse envelope");

    assert_eq!(envelope.id.as_deref(), Some("an-1"));
    assert_eq!(envelope.kind.as_deref(), Some("product"));
    assert_eq!(
        envelope.status.as_deref().map(AnalysisStatus::parse),
        Some(AnalysisStatus::Completed)
    );
    let analytics = envelope.analytics.expect("payload present");
    assert_eq!(analytics.insight_cards.len(), 1);
    assert_eq!(analytics.drilldowns.sources_list[0].source, "reddit.com");
}

#[tokio::test]
async fn get_keyword_analytics_uses_keyword_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/keywords/k-7"))
        .and(query_param("date", "2025-03-14"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "an-2", "status": "pending" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let envelope = client
        .get_keyword_analytics("k-7", day(), "tok")
        .await
        .expect("should parse envelope");

    assert_eq!(envelope.status.as_deref(), Some("pending"));
    assert!(envelope.analytics.is_none());
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "token expired" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_analytics(&EntityRef::Product("p".to_owned()), day(), "stale")
        .await
        .expect_err("401 should fail");

    assert!(
        matches!(err, ClientError::Auth { status: 401, ref message } if message == "token expired"),
        "expected Auth, got {err:?}"
    );
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn missing_entity_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_product_analytics("nope", day(), "tok")
        .await
        .expect_err("404 should fail");

    assert!(matches!(err, ClientError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn server_error_maps_to_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_product_analytics("p", day(), "tok")
        .await
        .expect_err("503 should fail");

    assert!(
        matches!(err, ClientError::UnexpectedStatus { status: 503, .. }),
        "got {err:?}"
    );
    assert!(aivis_client::is_retriable(&err));
}

#[tokio::test]
async fn non_json_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_product_analytics("p", day(), "tok")
        .await
        .expect_err("html should fail");

    assert!(matches!(err, ClientError::Deserialize { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[tokio::test]
async fn json_of_the_wrong_shape_reads_as_empty_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("queued")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let envelope = client
        .get_product_analytics("p", day(), "tok")
        .await
        .expect("wrong shape should degrade, not fail");

    assert_eq!(envelope, aivis_client::AnalyticsEnvelope::default());
}

#[tokio::test]
async fn generate_posts_entity_id_and_date() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/analytics/keywords/generate"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(serde_json::json!({
            "keyword_id": "k-9",
            "date": "2025-03-14"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "an-9", "status": "processing" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let envelope = client
        .generate_analytics(&EntityRef::Keyword("k-9".to_owned()), day(), "tok")
        .await
        .expect("generate should succeed");

    assert_eq!(envelope.status.as_deref(), Some("processing"));
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_takes_first_owned_application() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/login"))
        .and(body_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-login",
            "refresh_token": "ref-1",
            "user": {
                "id": "u-1",
                "email": "ada@example.com",
                "owned_applications": [
                    { "id": "app-1", "company_name": "Acme" },
                    { "id": "app-2" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let session = client
        .login("ada@example.com", "hunter2")
        .await
        .expect("login should succeed");

    assert_eq!(session.access_token, "tok-login");
    assert_eq!(session.refresh_token.as_deref(), Some("ref-1"));
    assert_eq!(session.application_id.as_deref(), Some("app-1"));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn login_with_bad_credentials_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .login("ada@example.com", "wrong")
        .await
        .expect_err("login should fail");

    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn register_with_app_name_uses_register_with_app_route() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/register-with-app"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "access_token": "tok-new",
            "user": { "id": "u-2", "email": "grace@example.com" },
            "application": { "id": "app-new" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let session = client
        .register(&RegisterRequest {
            email: "grace@example.com".to_owned(),
            password: "pw".to_owned(),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            app_name: Some("Navy".to_owned()),
        })
        .await
        .expect("register should succeed");

    assert_eq!(session.access_token, "tok-new");
    assert_eq!(session.application_id.as_deref(), Some("app-new"));
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_product_fills_application_from_session_and_cleans_keywords() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/products/with-keywords"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(serde_json::json!({
            "name": "Acme",
            "description": "Acme",
            "website": "Acme",
            "business_domain": "Acme",
            "application_id": "app-1",
            "search_keywords": ["help desk", "chatbot"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "p-1",
            "name": "Acme",
            "search_keywords": [
                { "id": "k-1", "keyword": "help desk" },
                { "id": "k-2", "keyword": "chatbot" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let session = AuthSession::new("tok").with_application("app-1");
    let product = NewProduct::from_brand(" Acme ", ["help desk", "", "chatbot", "help desk"]);

    let created = client
        .create_product_with_keywords(&product, &session)
        .await
        .expect("create should succeed");

    assert_eq!(created.id, "p-1");
    assert_eq!(created.search_keywords.len(), 2);
    assert_eq!(created.search_keywords[1].keyword, "chatbot");
}

#[tokio::test]
async fn products_by_application_skips_malformed_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/application/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "p-1", "name": "Acme" },
            "garbage",
            { "id": "p-2", "name": "Globex" }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let products = client
        .products_by_application("app-1", "tok")
        .await
        .expect("list should parse");

    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p-1", "p-2"]);
}
