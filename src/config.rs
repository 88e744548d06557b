use std::net::IpAddr;
use std::path::PathBuf;

use crate::billing::{Plan, PlanPrices};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub api_key: Option<String>,
    pub audit_log_path: PathBuf,
    pub max_body_size: usize,
    pub log_level: String,
    pub stripe: StripeConfig,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub publishable_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub webhook_tolerance_secs: u64,
    pub api_base: String,
    pub prices: PlanPrices,
}

pub const DEFAULT_AUDIT_LOG_PATH: &str = "logs/transactions.log";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("OUTPOST_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid OUTPOST_HOST: {e}"))?;

        let port: u16 = env_or("OUTPOST_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid OUTPOST_PORT: {e}"))?;

        let base_url = env_or("OUTPOST_BASE_URL", &format!("http://{host}:{port}"));

        let max_body_size: usize = env_or("OUTPOST_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid OUTPOST_MAX_BODY_SIZE: {e}"))?;

        let webhook_tolerance_secs: u64 = env_or("STRIPE_WEBHOOK_TOLERANCE_SECS", "300")
            .parse()
            .map_err(|e| format!("Invalid STRIPE_WEBHOOK_TOLERANCE_SECS: {e}"))?;

        let prices = PlanPrices {
            free: env_optional(&format!("STRIPE_PRICE_{}", Plan::Free.env_suffix())),
            pro: env_optional(&format!("STRIPE_PRICE_{}", Plan::Pro.env_suffix())),
            enterprise: env_optional(&format!("STRIPE_PRICE_{}", Plan::Enterprise.env_suffix())),
        };

        Ok(Config {
            host,
            port,
            base_url,
            api_key: env_optional("OUTPOST_API_KEY"),
            audit_log_path: PathBuf::from(env_or("OUTPOST_AUDIT_LOG", DEFAULT_AUDIT_LOG_PATH)),
            max_body_size,
            log_level: env_or("OUTPOST_LOG_LEVEL", "info"),
            stripe: StripeConfig {
                secret_key: env_optional("STRIPE_SECRET_KEY"),
                publishable_key: env_optional("STRIPE_PUBLISHABLE_KEY"),
                webhook_secret: env_optional("STRIPE_WEBHOOK_SECRET"),
                webhook_tolerance_secs,
                api_base: env_or("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE),
                prices,
            },
        })
    }
}

/// Empty values count as unset so a blank line in `.env` doesn't configure an empty secret.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}
