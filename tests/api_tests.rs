//! End-to-end tests over the HTTP surface
//!
//! These tests drive the full router (rate limiter, body limit, validation,
//! JSON file stores) through axum-test, the way a storefront client would.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use intake::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    server: TestServer,
    dir: TempDir,
}

impl TestApp {
    fn read_file(&self, name: &str) -> Vec<Value> {
        let raw = std::fs::read_to_string(self.dir.path().join(name)).unwrap_or_default();
        if raw.trim().is_empty() {
            return Vec::new();
        }
        serde_json::from_str(&raw).expect("data file should hold a JSON array")
    }
}

fn app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = ServerConfig {
        data_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    configure(&mut config);

    let router = ServerBuilder::new(config).build();
    let server = TestServer::new(router);
    TestApp { server, dir }
}

fn app() -> TestApp {
    app_with(|_| {})
}

fn order_payload() -> Value {
    json!({
        "fullName": "Maria Santos",
        "phoneNumber": "(555) 123-4567",
        "facebook": "maria.santos",
        "pickupDate": "2026-10-24",
        "quantity": 2,
        "total": 500
    })
}

fn review_payload(name: &str) -> Value {
    json!({
        "name": name,
        "email": "jun@example.com",
        "comment": "Soft and not too sweet.",
        "productRating": 5,
        "serviceRating": 4
    })
}

// =============================================================================
// Probes
// =============================================================================

mod probe_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let response = app.server.get("/api/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "storefront-intake");
    }

    #[tokio::test]
    async fn test_banner() {
        let app = app();
        let response = app.server.get("/").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["message"].is_string());
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_dashboard_page_is_html() {
        let app = app();
        let response = app.server.get("/dashboard").await;

        response.assert_status_ok();
        let content_type = response.header("content-type");
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
        assert!(response.text().contains("/api/dashboard/orders"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let app = app();
        let response = app.server.get("/api/unknown").expect_failure().await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body, json!({ "success": false, "error": "Not found" }));
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let app = app();

        for response in [
            app.server.get("/api/health").await,
            app.server.get("/missing").expect_failure().await,
            app.server
                .post("/api/orders")
                .json(&json!({}))
                .expect_failure()
                .await,
        ] {
            assert_eq!(response.header("x-content-type-options"), "nosniff");
            assert_eq!(response.header("x-frame-options"), "DENY");
            assert_eq!(response.header("x-xss-protection"), "1; mode=block");
            assert!(
                response
                    .header("strict-transport-security")
                    .to_str()
                    .unwrap()
                    .starts_with("max-age=")
            );
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

mod order_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_order() {
        let app = app();
        let response = app.server.post("/api/orders").json(&order_payload()).await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({ "success": true, "message": "Order created successfully" })
        );

        let stored = app.read_file("orders.json");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["fullName"], "Maria Santos");
        assert_eq!(stored[0]["phoneNumber"], "(555) 123-4567");
        assert_eq!(stored[0]["quantity"], 2);
        assert_eq!(stored[0]["pickupDate"], "2026-10-24");
        assert_eq!(stored[0]["total"], 500);
        assert!(stored[0]["id"].is_u64());
        assert!(stored[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_orders_are_listed_oldest_first() {
        let app = app();

        for name in ["First", "Second", "Third"] {
            let mut payload = order_payload();
            payload["fullName"] = json!(name);
            app.server
                .post("/api/orders")
                .json(&payload)
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app.server.get("/api/orders").await;
        response.assert_status_ok();
        let orders: Vec<Value> = response.json();
        let names: Vec<&str> = orders
            .iter()
            .map(|o| o["fullName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);

        let ids: Vec<u64> = orders.iter().map(|o| o["id"].as_u64().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_client_identity_fields_are_overwritten() {
        let app = app();
        let mut payload = order_payload();
        payload["id"] = json!(1);
        payload["createdAt"] = json!("1999-01-01T00:00:00Z");
        payload["isAdmin"] = json!(true);

        app.server
            .post("/api/orders")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);

        let stored = app.read_file("orders.json");
        assert_ne!(stored[0]["id"], 1);
        assert_ne!(stored[0]["createdAt"], "1999-01-01T00:00:00Z");
        assert!(stored[0].get("isAdmin").is_none());
    }

    #[tokio::test]
    async fn test_long_fields_are_truncated() {
        let app = app();
        let mut payload = order_payload();
        payload["fullName"] = json!(format!("  {}  ", "a".repeat(150)));
        payload["phoneNumber"] = json!("+1 (555) 123-4567 ext. 8901");

        app.server
            .post("/api/orders")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);

        let orders: Vec<Value> = app.server.get("/api/orders").await.json();
        assert_eq!(orders[0]["fullName"].as_str().unwrap().chars().count(), 100);
        assert!(orders[0]["phoneNumber"].as_str().unwrap().chars().count() <= 20);
    }

    #[tokio::test]
    async fn test_phone_number_digit_rule() {
        let app = app();

        let mut payload = order_payload();
        payload["phoneNumber"] = json!("abc-123-4567");
        let response = app
            .server
            .post("/api/orders")
            .json(&payload)
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({ "success": false, "error": "Invalid phone number" })
        );

        payload["phoneNumber"] = json!("(555) 123-4567");
        app.server
            .post("/api/orders")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_validation_messages() {
        let app = app();
        let cases = [
            ("fullName", Value::Null, "Missing required field: fullName"),
            ("quantity", json!(0), "quantity must be between 1 and 100"),
            ("quantity", json!(101), "quantity must be between 1 and 100"),
            ("quantity", json!("lots"), "Invalid quantity"),
        ];

        for (field, value, expected) in cases {
            let mut payload = order_payload();
            payload[field] = value;
            let response = app
                .server
                .post("/api/orders")
                .json(&payload)
                .expect_failure()
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], expected, "field {}", field);
        }

        assert!(app.read_file("orders.json").is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = app();
        let response = app
            .server
            .post("/api/orders")
            .bytes(Bytes::from_static(b"{\"fullName\": "))
            .content_type("application/json")
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({ "success": false, "error": "Invalid request body" })
        );
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let app = app();
        let response = app
            .server
            .post("/api/orders")
            .json(&json!([order_payload()]))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_and_not_persisted() {
        let app = app_with(|config| config.max_body_bytes = 1024);
        let mut payload = order_payload();
        payload["facebook"] = json!("x".repeat(4096));

        let response = app
            .server
            .post("/api/orders")
            .json(&payload)
            .expect_failure()
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Request body too large");
        assert!(app.read_file("orders.json").is_empty());
    }
}

// =============================================================================
// Reviews
// =============================================================================

mod review_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_review() {
        let app = app();
        let response = app
            .server
            .post("/api/reviews")
            .json(&review_payload("Jun"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({ "success": true, "message": "Review created successfully" })
        );

        let stored = app.read_file("reviews.json");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["productRating"], 5);
        assert_eq!(stored[0]["serviceRating"], 4);
        let date = stored[0]["date"].as_str().unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[2..3], "/");
        assert_eq!(&date[5..6], "/");
    }

    #[tokio::test]
    async fn test_reviews_are_listed_newest_first() {
        let app = app();

        for name in ["Ana", "Ben", "Cora"] {
            app.server
                .post("/api/reviews")
                .json(&review_payload(name))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let reviews: Vec<Value> = app.server.get("/api/reviews").await.json();
        let names: Vec<&str> = reviews
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Cora", "Ben", "Ana"]);
    }

    #[tokio::test]
    async fn test_review_validation() {
        let app = app();
        let cases = [
            ("email", json!("nope"), "Invalid email address"),
            ("email", json!("a@b"), "Invalid email address"),
            ("productRating", json!(6), "productRating must be between 1 and 5"),
            ("serviceRating", json!(0), "serviceRating must be between 1 and 5"),
            ("comment", Value::Null, "Missing required field: comment"),
        ];

        for (field, value, expected) in cases {
            let mut payload = review_payload("Jun");
            payload[field] = value;
            let response = app
                .server
                .post("/api/reviews")
                .json(&payload)
                .expect_failure()
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["error"], expected, "field {}", field);
        }

        assert!(app.read_file("reviews.json").is_empty());
    }

    #[tokio::test]
    async fn test_long_comment_is_truncated() {
        let app = app();
        let mut payload = review_payload(&"n".repeat(80));
        payload["comment"] = json!("c".repeat(900));

        app.server
            .post("/api/reviews")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);

        let reviews: Vec<Value> = app.server.get("/api/reviews").await.json();
        assert_eq!(reviews[0]["name"].as_str().unwrap().len(), 50);
        assert_eq!(reviews[0]["comment"].as_str().unwrap().len(), 500);
    }
}

// =============================================================================
// Admin
// =============================================================================

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_and_clear_orders() {
        let app = app();
        for _ in 0..2 {
            app.server
                .post("/api/orders")
                .json(&order_payload())
                .await
                .assert_status(StatusCode::CREATED);
        }

        let listed: Vec<Value> = app.server.get("/api/dashboard/orders").await.json();
        assert_eq!(listed.len(), 2);

        let response = app.server.delete("/api/dashboard/orders").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "success": true, "message": "Cleared 2 orders" }));

        let listed: Vec<Value> = app.server.get("/api/orders").await.json();
        assert!(listed.is_empty());
        assert!(app.read_file("orders.json").is_empty());
    }

    #[tokio::test]
    async fn test_clear_reviews_leaves_orders() {
        let app = app();
        app.server
            .post("/api/orders")
            .json(&order_payload())
            .await
            .assert_status(StatusCode::CREATED);
        app.server
            .post("/api/reviews")
            .json(&review_payload("Jun"))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = app.server.delete("/api/dashboard/reviews").await.json();
        assert_eq!(body["message"], "Cleared 1 reviews");

        assert_eq!(app.read_file("orders.json").len(), 1);
        assert!(app.read_file("reviews.json").is_empty());
    }

    #[tokio::test]
    async fn test_clear_empty_collection() {
        let app = app();
        let body: Value = app.server.delete("/api/dashboard/reviews").await.json();
        assert_eq!(body["message"], "Cleared 0 reviews");
    }
}

// =============================================================================
// Rate limiting
// =============================================================================

mod rate_limit_tests {
    use super::*;

    fn limited_app() -> TestApp {
        app_with(|config| {
            config.rate_limit = RateLimitConfig {
                max_requests: 3,
                window_secs: 60,
            }
        })
    }

    #[tokio::test]
    async fn test_writes_past_the_ceiling_get_429() {
        let app = limited_app();

        for _ in 0..3 {
            app.server
                .post("/api/orders")
                .json(&order_payload())
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app
            .server
            .post("/api/orders")
            .json(&order_payload())
            .expect_failure()
            .await;

        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "Too many requests, please try again later"
            })
        );
        let retry_after: u64 = response.header("retry-after").to_str().unwrap().parse().unwrap();
        assert!((1..=60).contains(&retry_after));
        assert_eq!(response.header("x-frame-options"), "DENY");

        assert_eq!(app.read_file("orders.json").len(), 3);
    }

    #[tokio::test]
    async fn test_limit_is_checked_before_the_body() {
        let app = limited_app();
        for _ in 0..3 {
            app.server
                .post("/api/reviews")
                .json(&json!({}))
                .expect_failure()
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        app.server
            .post("/api/reviews")
            .bytes(Bytes::from_static(b"not json"))
            .content_type("application/json")
            .expect_failure()
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_public_lists_are_not_limited() {
        let app = limited_app();
        for _ in 0..10 {
            app.server.get("/api/orders").await.assert_status_ok();
            app.server.get("/api/health").await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn test_admin_routes_share_the_budget() {
        let app = limited_app();
        app.server.get("/api/dashboard/orders").await.assert_status_ok();
        app.server.delete("/api/dashboard/reviews").await.assert_status_ok();
        app.server
            .post("/api/reviews")
            .json(&review_payload("Jun"))
            .await
            .assert_status(StatusCode::CREATED);

        app.server
            .get("/api/dashboard/reviews")
            .expect_failure()
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}
