#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use outpost::billing::signature;
use outpost::billing::{
    BillingError, BillingProvider, CheckoutRequest, CheckoutSession, PlanPrices,
};
use outpost::config::{Config, StripeConfig};

pub const API_KEY: &str = "test-outpost-key";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Billing provider double that records every checkout it is asked to create.
#[derive(Default)]
pub struct FakeBilling {
    pub requests: Mutex<Vec<CheckoutRequest>>,
    pub fail_with: Mutex<Option<String>>,
}

impl FakeBilling {
    pub fn calls(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fail(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(BillingError::Api {
                status: 402,
                message,
            });
        }

        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let id = format!("cs_test_{}", requests.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.stripe.test/{id}")),
            id,
        })
    }
}

/// A running test server writing its audit log into a temporary directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub billing: Arc<FakeBilling>,
    pub log_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Raw lines currently in the audit log (empty if it doesn't exist yet).
    pub fn log_lines(&self) -> Vec<Value> {
        match std::fs::read_to_string(&self.log_path) {
            Ok(content) => content
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| serde_json::from_str(l).expect("log line is not JSON"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Put a directory where the audit log file belongs so every open fails.
    pub fn break_log(&self) {
        std::fs::create_dir_all(&self.log_path).expect("Failed to block audit log path");
    }

    pub fn repair_log(&self) {
        std::fs::remove_dir(&self.log_path).expect("Failed to unblock audit log path");
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_json_with_key(
        &self,
        path: &str,
        key: Option<&str>,
        body: &Value,
    ) -> (Value, StatusCode) {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(key) = key {
            req = req.header("x-api-key", key);
        }
        let resp = req.send().await.expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_with_key(&self, path: &str, key: Option<&str>) -> (Value, StatusCode) {
        let mut req = self.client.get(self.url(path));
        if let Some(key) = key {
            req = req.header("x-api-key", key);
        }
        let resp = req.send().await.expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Post a webhook body with an explicit `stripe-signature` header (or none).
    pub async fn post_webhook(&self, payload: &str, signature: Option<&str>) -> (Value, StatusCode) {
        let mut req = self
            .client
            .post(self.url("/api/webhook"))
            .header("content-type", "application/json")
            .body(payload.to_string());
        if let Some(sig) = signature {
            req = req.header("stripe-signature", sig);
        }
        let resp = req.send().await.expect("webhook request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Post a webhook body signed with the test secret at the current time.
    pub async fn post_signed_webhook(&self, payload: &str) -> (Value, StatusCode) {
        let header = signature::sign(
            payload.as_bytes(),
            WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
        );
        self.post_webhook(payload, Some(&header)).await
    }
}

pub fn test_config(log_path: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:3000".to_string(),
        api_key: Some(API_KEY.to_string()),
        audit_log_path: log_path,
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        stripe: StripeConfig {
            secret_key: Some("sk_test_123".to_string()),
            publishable_key: Some("pk_test_123".to_string()),
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            webhook_tolerance_secs: 300,
            api_base: "http://127.0.0.1:9".to_string(),
            prices: PlanPrices {
                free: Some("price_free_1".to_string()),
                pro: Some("price_pro_1".to_string()),
                enterprise: Some("price_enterprise_1".to_string()),
            },
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a test app, letting the caller adjust the config first.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log_path = dir.path().join("logs").join("transactions.log");

    let mut config = test_config(log_path.clone());
    configure(&mut config);

    let billing = Arc::new(FakeBilling::default());
    let (app, _state) = outpost::build_app(config, billing.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        billing,
        log_path,
        _dir: dir,
    }
}
