use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use outpost::billing::stripe::StripeClient;
use outpost::billing::{BillingError, BillingProvider, CheckoutRequest, Plan, PlanPrices};
use outpost::config::StripeConfig;

/// What the mock Stripe API saw for one request.
#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    idempotency_key: Option<String>,
    form: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct MockStripe {
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn create_session(
    State(mock): State<MockStripe>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    mock.captured.lock().unwrap().push(Captured {
        authorization: header("authorization"),
        idempotency_key: header("idempotency-key"),
        form: form.clone(),
    });

    if form.get("line_items[0][price]").map(String::as_str) == Some("price_missing") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "type": "invalid_request_error",
                    "message": "No such price: 'price_missing'"
                }
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "cs_test_mock",
            "object": "checkout.session",
            "url": "https://checkout.stripe.com/c/pay/cs_test_mock",
            "mode": "subscription"
        })),
    )
}

async fn spawn_mock() -> (String, MockStripe) {
    let mock = MockStripe::default();
    let app = Router::new()
        .route("/v1/checkout/sessions", post(create_session))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock Stripe");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock Stripe failed");
    });

    (format!("http://{addr}/"), mock)
}

fn stripe_config(api_base: &str, secret_key: Option<&str>) -> StripeConfig {
    StripeConfig {
        secret_key: secret_key.map(str::to_string),
        publishable_key: None,
        webhook_secret: None,
        webhook_tolerance_secs: 300,
        api_base: api_base.to_string(),
        prices: PlanPrices::default(),
    }
}

fn checkout_request(price_id: &str) -> CheckoutRequest {
    CheckoutRequest {
        plan: Plan::Enterprise,
        price_id: price_id.to_string(),
        success_url: "https://outpost.test/outpost?checkout=success".to_string(),
        cancel_url: "https://outpost.test/outpost?checkout=cancel".to_string(),
        idempotency_key: "idem-1".to_string(),
    }
}

#[tokio::test]
async fn creates_subscription_checkout_session() {
    let (base, mock) = spawn_mock().await;
    let client = StripeClient::new(&stripe_config(&base, Some("sk_test_abc"))).unwrap();

    let session = client
        .create_checkout_session(&checkout_request("price_ent"))
        .await
        .unwrap();
    assert_eq!(session.id, "cs_test_mock");
    assert_eq!(
        session.url.as_deref(),
        Some("https://checkout.stripe.com/c/pay/cs_test_mock")
    );

    let captured = mock.captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let req = &captured[0];
    assert_eq!(req.authorization.as_deref(), Some("Bearer sk_test_abc"));
    assert_eq!(req.idempotency_key.as_deref(), Some("idem-1"));
    assert_eq!(req.form["mode"], "subscription");
    assert_eq!(req.form["line_items[0][price]"], "price_ent");
    assert_eq!(req.form["line_items[0][quantity]"], "1");
    assert_eq!(
        req.form["success_url"],
        "https://outpost.test/outpost?checkout=success"
    );
    assert_eq!(
        req.form["cancel_url"],
        "https://outpost.test/outpost?checkout=cancel"
    );
    assert_eq!(req.form["metadata[plan]"], "enterprise");
}

#[tokio::test]
async fn surfaces_stripe_error_message() {
    let (base, _mock) = spawn_mock().await;
    let client = StripeClient::new(&stripe_config(&base, Some("sk_test_abc"))).unwrap();

    let err = client
        .create_checkout_session(&checkout_request("price_missing"))
        .await
        .unwrap_err();
    match &err {
        BillingError::Api { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "No such price: 'price_missing'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "No such price: 'price_missing'");
}

#[tokio::test]
async fn fails_without_secret_key_and_sends_nothing() {
    let (base, mock) = spawn_mock().await;
    let client = StripeClient::new(&stripe_config(&base, None)).unwrap();

    let err = client
        .create_checkout_session(&checkout_request("price_ent"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "STRIPE_SECRET_KEY not configured");
    assert!(mock.captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reports_unreachable_api_as_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = format!("http://{addr}");
    let client = StripeClient::new(&stripe_config(&base, Some("sk_test_abc"))).unwrap();

    let err = client
        .create_checkout_session(&checkout_request("price_ent"))
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Request(_)), "{err:?}");
}
