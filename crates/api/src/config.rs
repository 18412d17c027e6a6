use std::fmt;
use std::str::FromStr;

use rankforge_core::credentials::MIN_SECRET_LEN;
use rankforge_core::integrations::IntegrationProvider;
use rankforge_core::plans::Plan;
use rankforge_integrations::llm::LlmEndpoints;
use rankforge_integrations::{pagespeed, payments, serp};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout applied to every outbound third-party call (default: `20`).
    pub outbound_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Secret the credential cipher derives its keys from.
    pub credentials_secret: String,
    /// Bearer secret for `/cron/*`. Cron endpoints reject everything when unset.
    pub cron_secret: Option<String>,
    /// Public URL of the web app, used for checkout redirects.
    pub app_url: String,
    pub payments: PaymentConfig,
    pub platform_keys: PlatformKeys,
    pub endpoints: IntegrationEndpoints,
    /// Whether the request rate limiter is active (default: `true`).
    pub rate_limit_enabled: bool,
    /// Take the client address from `X-Forwarded-For`. Only enable behind a
    /// reverse proxy that overwrites the header (default: `false`).
    pub trust_proxy_headers: bool,
    /// Let audits fetch loopback, private and link-local hosts (default: `false`).
    pub allow_private_fetch: bool,
}

/// Payment processor settings. Billing endpoints answer 422 while the
/// relevant value is missing.
#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    pub api_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub price_pro: Option<String>,
    pub price_agency: Option<String>,
}

impl PaymentConfig {
    /// Processor price id for a purchasable plan.
    pub fn price_for(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Free => None,
            Plan::Pro => self.price_pro.as_deref(),
            Plan::Agency => self.price_agency.as_deref(),
        }
    }

    /// Reverse of [`price_for`](Self::price_for).
    pub fn plan_for_price(&self, price_id: &str) -> Option<Plan> {
        [Plan::Pro, Plan::Agency]
            .into_iter()
            .find(|p| self.price_for(*p) == Some(price_id))
    }
}

/// Platform-wide fallback keys for bring-your-own-key integrations.
#[derive(Debug, Clone, Default)]
pub struct PlatformKeys {
    pub serp: Option<String>,
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub pagespeed: Option<String>,
}

impl PlatformKeys {
    pub fn from_env() -> Self {
        let read = |p: IntegrationProvider| optional_env(p.platform_env_var());
        Self {
            serp: read(IntegrationProvider::Serp),
            openai: read(IntegrationProvider::Openai),
            anthropic: read(IntegrationProvider::Anthropic),
            pagespeed: read(IntegrationProvider::Pagespeed),
        }
    }

    pub fn get(&self, provider: IntegrationProvider) -> Option<&str> {
        match provider {
            IntegrationProvider::Serp => self.serp.as_deref(),
            IntegrationProvider::Openai => self.openai.as_deref(),
            IntegrationProvider::Anthropic => self.anthropic.as_deref(),
            IntegrationProvider::Pagespeed => self.pagespeed.as_deref(),
        }
    }
}

/// Base URLs of the third-party APIs.
#[derive(Debug, Clone)]
pub struct IntegrationEndpoints {
    pub serp: String,
    pub pagespeed: String,
    pub payments: String,
    pub llm: LlmEndpoints,
}

impl Default for IntegrationEndpoints {
    fn default() -> Self {
        Self {
            serp: serp::DEFAULT_BASE_URL.to_string(),
            pagespeed: pagespeed::DEFAULT_BASE_URL.to_string(),
            payments: payments::DEFAULT_BASE_URL.to_string(),
            llm: LlmEndpoints::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `OUTBOUND_TIMEOUT_SECS`  | `20`                       |
    /// | `CREDENTIALS_SECRET`     | **required**, 32+ chars    |
    /// | `CRON_SECRET`            | unset                      |
    /// | `APP_URL`                | `http://localhost:5173`    |
    /// | `PAYMENT_API_KEY`        | unset                      |
    /// | `PAYMENT_WEBHOOK_SECRET` | unset                      |
    /// | `PAYMENT_PRICE_PRO`      | unset                      |
    /// | `PAYMENT_PRICE_AGENCY`   | unset                      |
    /// | `SERP_API_KEY`, `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `PAGESPEED_API_KEY` | unset |
    /// | `SERP_API_BASE_URL`, `PAGESPEED_BASE_URL`, `PAYMENT_API_BASE_URL`, `OPENAI_BASE_URL`, `ANTHROPIC_BASE_URL` | provider defaults |
    /// | `RATE_LIMIT_ENABLED`     | `true`                     |
    /// | `TRUST_PROXY_HEADERS`    | `false`                    |
    /// | `ALLOW_PRIVATE_FETCH`    | `false`                    |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparsable values or a missing or short `CREDENTIALS_SECRET`.
    pub fn from_env() -> Self {
        let credentials_secret = required_env("CREDENTIALS_SECRET");
        assert!(
            credentials_secret.len() >= MIN_SECRET_LEN,
            "CREDENTIALS_SECRET must be at least {MIN_SECRET_LEN} characters"
        );

        let cors_origins = optional_env("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = IntegrationEndpoints::default();
        let endpoints = IntegrationEndpoints {
            serp: optional_env("SERP_API_BASE_URL").unwrap_or(defaults.serp),
            pagespeed: optional_env("PAGESPEED_BASE_URL").unwrap_or(defaults.pagespeed),
            payments: optional_env("PAYMENT_API_BASE_URL").unwrap_or(defaults.payments),
            llm: LlmEndpoints {
                openai: optional_env("OPENAI_BASE_URL").unwrap_or(defaults.llm.openai),
                anthropic: optional_env("ANTHROPIC_BASE_URL").unwrap_or(defaults.llm.anthropic),
            },
        };

        Self {
            host: optional_env("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            outbound_timeout_secs: env_or("OUTBOUND_TIMEOUT_SECS", 20),
            jwt: JwtConfig::from_env(),
            credentials_secret,
            cron_secret: optional_env("CRON_SECRET"),
            app_url: optional_env("APP_URL").unwrap_or_else(|| "http://localhost:5173".into()),
            payments: PaymentConfig {
                api_key: optional_env("PAYMENT_API_KEY"),
                webhook_secret: optional_env("PAYMENT_WEBHOOK_SECRET"),
                price_pro: optional_env("PAYMENT_PRICE_PRO"),
                price_agency: optional_env("PAYMENT_PRICE_AGENCY"),
            },
            platform_keys: PlatformKeys::from_env(),
            endpoints,
            rate_limit_enabled: env_or("RATE_LIMIT_ENABLED", true),
            trust_proxy_headers: env_or("TRUST_PROXY_HEADERS", false),
            allow_private_fetch: env_or("ALLOW_PRIVATE_FETCH", false),
        }
    }
}

/// A set, non-blank env var.
pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// # Panics
///
/// Panics when `name` is unset or blank.
pub(crate) fn required_env(name: &str) -> String {
    optional_env(name).unwrap_or_else(|| panic!("{name} must be set in the environment"))
}

/// Parse `name`, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
pub(crate) fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional_env(name) {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        None => default,
    }
}
