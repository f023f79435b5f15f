//! Server configuration loaded from environment variables.
//!
//! Secrets and tunables are injected explicitly at startup; nothing in the
//! request path reads the process environment.

use std::env;

/// Signing configuration for the token service.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | `JWT_SECRET` | *(required)* | HMAC-SHA256 signing secret |
/// | `JWT_ISSUER` | `dreamshepherd` | `iss` claim stamped on every token |
/// | `JWT_AUDIENCE` | `dreamshepherd-api` | `aud` claim stamped on every token |
/// | `ACCESS_TOKEN_MINUTES` | `15` | access token lifetime |
/// | `REFRESH_TOKEN_DAYS` | `7` | refresh token lifetime |
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, String> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;
        if secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 bytes".to_string());
        }
        Ok(Self {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "dreamshepherd".to_string()),
            audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "dreamshepherd-api".to_string()),
            access_token_minutes: parse_env("ACCESS_TOKEN_MINUTES", 15)?,
            refresh_token_days: parse_env("REFRESH_TOKEN_DAYS", 7)?,
        })
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_seconds(&self) -> i64 {
        self.access_token_minutes * 60
    }

    /// Refresh token lifetime in seconds, used for the cookie `Max-Age`.
    pub fn refresh_token_seconds(&self) -> i64 {
        self.refresh_token_days * 24 * 60 * 60
    }
}

/// Top-level server configuration.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | `HOST` | `0.0.0.0` | bind address |
/// | `PORT` | `3000` | bind port |
/// | `CORS_ORIGINS` | *(empty)* | comma-separated allowed origins |
/// | `REQUEST_TIMEOUT_SECS` | `30` | per-request timeout |
/// | `SECURE_COOKIES` | `true` iff `ENVIRONMENT=production` | add `Secure` to auth cookies |
/// | `SWEEP_INTERVAL_SECS` | `3600` | expired-session sweep cadence |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub secure_cookies: bool,
    pub sweep_interval_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let secure_cookies = match env::var("SECURE_COOKIES") {
            Ok(v) => v == "true" || v == "1",
            Err(_) => env::var("ENVIRONMENT").as_deref() == Ok("production"),
        };
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 3000)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30)?,
            secure_cookies,
            sweep_interval_secs: parse_env("SWEEP_INTERVAL_SECS", 3600)?,
            jwt: JwtConfig::from_env()?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
