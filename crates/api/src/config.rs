//! Environment-driven configuration.

use std::time::Duration;

/// SMTP settings; present only when a relay is configured.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub timeout: Duration,
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub identity_url: String,
    pub identity_timeout: Duration,
    pub smtp: Option<SmtpSettings>,
    pub database_url: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_millis(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let smtp = match (
            std::env::var("SMTP_HOST"),
            std::env::var("SMTP_USERNAME"),
            std::env::var("SMTP_PASSWORD"),
        ) {
            (Ok(host), Ok(username), Ok(password)) => Some(SmtpSettings {
                host,
                username,
                password,
                from: env_or("SMTP_FROM", "noreply@jobboard.example"),
                timeout: env_millis("SMTP_TIMEOUT_MS", 10_000),
            }),
            _ => None,
        };

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            identity_url: env_or("IDENTITY_URL", "http://127.0.0.1:8081"),
            identity_timeout: env_millis("IDENTITY_TIMEOUT_MS", 5_000),
            smtp,
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }
}
