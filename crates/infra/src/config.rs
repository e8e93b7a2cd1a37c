use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Which APNs host the gateway client talks to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApnsEnvironment {
    Sandbox,
    Production,
}

impl ApnsEnvironment {
    pub fn host(&self) -> &'static str {
        match self {
            Self::Sandbox => "api.sandbox.push.apple.com",
            Self::Production => "api.push.apple.com",
        }
    }
}

impl FromStr for ApnsEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" | "development" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!("Unknown APNs environment: {}", other)),
        }
    }
}

/// Credentials and target of the APNs provider connection
#[derive(Debug, Clone)]
pub struct ApnsConfig {
    /// Identifier of the signing key, sent as `kid`
    pub key_id: String,
    /// Apple developer team, sent as `iss`
    pub team_id: String,
    /// PKCS#8 PEM of the ES256 signing key
    pub private_key: String,
    /// Application bundle id, sent as `apns-topic`
    pub bundle_id: String,
    pub environment: ApnsEnvironment,
}

impl ApnsConfig {
    pub fn base_url(&self) -> String {
        format!("https://{}", self.environment.host())
    }
}

/// How long push data is kept around
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    /// Push log rows older than this are deleted
    pub push_log_days: i64,
    /// Sent flags of timed events starting longer ago than this are reset
    pub timed_event_days: i64,
    /// Sent flags of undated events whose anchor day is longer ago than this are reset
    pub undated_event_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            push_log_days: 30,
            timed_event_days: 7,
            undated_event_days: 14,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    pub apns: ApnsConfig,
    /// When set, the scheduler trigger requires this value in the `x-api-key` header
    pub scheduler_api_key: Option<String>,
    /// Key callers of the cron forwarder must present. Without it the
    /// forwarder only runs when the scheduler trigger is unprotected too
    pub cron_api_key: Option<String>,
    /// Scheduler trigger the cron forwarding endpoint calls
    pub scheduler_url: String,
    /// Runs the scheduler in-process at this cadence when set. Otherwise an
    /// external cron is expected to call the trigger endpoint.
    pub scheduler_interval_secs: Option<u64>,
    /// Upper bound for a single request to the push gateway
    pub gateway_timeout: Duration,
    /// Upper bound for acquiring a store connection and for each statement
    pub store_timeout: Duration,
    /// Batches delivered at the same time during one run
    pub batch_concurrency: usize,
    pub retention: RetentionPolicy,
    /// Apply the bundled schema migrations on startup
    pub run_migrations: bool,
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default value.",
                    name, raw
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_env(name: &str) -> String {
    match optional_env(name) {
        Some(value) => value,
        None => {
            warn!(
                "Did not find {} environment variable. Push delivery will fail until it is set.",
                name
            );
            String::new()
        }
    }
}

impl ApnsConfig {
    fn from_env() -> Self {
        let environment = match optional_env("APNS_ENV") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}. Falling back to the sandbox environment.", e);
                ApnsEnvironment::Sandbox
            }),
            None => ApnsEnvironment::Sandbox,
        };
        Self {
            key_id: required_env("APNS_KEY_ID"),
            team_id: required_env("APNS_TEAM_ID"),
            // Keys stored in a single-line env var carry escaped newlines
            private_key: required_env("APNS_PRIVATE_KEY").replace("\\n", "\n"),
            bundle_id: optional_env("BUNDLE_ID")
                .unwrap_or_else(|| "com.chenzhencong.HiCalendar".into()),
            environment,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let default_port = 5000;
        let port = parse_env("PORT", default_port);

        let default_scheduler_url = format!("http://localhost:{}/api/v1/push/scheduler", port);
        let scheduler_url = match optional_env("PUSH_SCHEDULER_URL") {
            Some(raw) => match Url::parse(&raw) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => raw,
                _ => {
                    warn!(
                        "The given PUSH_SCHEDULER_URL: {} is not valid, falling back to {}.",
                        raw, default_scheduler_url
                    );
                    default_scheduler_url
                }
            },
            None => default_scheduler_url,
        };

        let scheduler_api_key = optional_env("PUSH_SCHEDULER_API_KEY");
        if scheduler_api_key.is_none() {
            info!("Did not find PUSH_SCHEDULER_API_KEY environment variable. The scheduler trigger is unprotected.");
        }

        let cron_api_key = optional_env("PUSH_CRON_API_KEY");
        if cron_api_key.is_none() && scheduler_api_key.is_some() {
            warn!("PUSH_SCHEDULER_API_KEY is set but PUSH_CRON_API_KEY is not. The cron forwarder is disabled.");
        }

        let scheduler_interval_secs = match optional_env("PUSH_SCHEDULER_INTERVAL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(secs),
                _ => {
                    warn!(
                        "The given PUSH_SCHEDULER_INTERVAL_SECS: {} is not valid, the in-process scheduler is disabled.",
                        raw
                    );
                    None
                }
            },
            None => None,
        };

        let batch_concurrency = parse_env("PUSH_BATCH_CONCURRENCY", 4_usize).max(1);

        Self {
            port,
            apns: ApnsConfig::from_env(),
            scheduler_api_key,
            cron_api_key,
            scheduler_url,
            scheduler_interval_secs,
            gateway_timeout: Duration::from_secs(parse_env("PUSH_GATEWAY_TIMEOUT_SECS", 10)),
            store_timeout: Duration::from_secs(parse_env("STORE_TIMEOUT_SECS", 10)),
            batch_concurrency,
            retention: Default::default(),
            run_migrations: parse_env("PUSH_RUN_MIGRATIONS", false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
