//! Server configuration

use std::time::Duration;

use crate::BoxError;

/// `DATABASE_URL` value selecting the in-process store
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Prefix of the placeholder secrets filled in for development
const DEV_SECRET_PREFIX: &str = "dev-";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP listen port
    pub http_port: u16,
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
    pub email: EmailConfig,
    /// Storefront origin, always allowed by CORS
    pub frontend_url: String,
    /// Additional CORS origins; `*` allows any
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, or `memory://`
    pub url: String,
    /// Overrides the database named in `url` when set
    pub name: Option<String>,
    pub max_connections: u32,
    /// Bound on waiting for a pooled connection
    pub acquire_timeout: Duration,
    /// Server-side statement timeout
    pub statement_timeout: Duration,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Public key id, handed to the checkout widget
    pub key_id: String,
    /// Shared secret for API auth and callback signatures
    pub key_secret: String,
    pub base_url: String,
    pub currency: String,
    pub timeout: Duration,
}

impl PaymentConfig {
    /// Whether the gateway secret is the development placeholder, which anyone can
    /// use to sign payment callbacks.
    pub fn uses_placeholder_secret(&self) -> bool {
        self.key_secret == placeholder_secret("RAZORPAY_KEY_SECRET")
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Sender address, defaults to `user`
    pub from: Option<String>,
}

impl EmailConfig {
    /// SMTP credentials, if both halves are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let frontend_url = var("FRONTEND_URL").unwrap_or_else(|| "http://localhost:5173".into());
        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173,http://localhost:3000".into())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let user = var("EMAIL_USER");

        Ok(Self {
            http_port: parse_or(&var, "HTTP_PORT", 5000)?,
            database: DatabaseConfig {
                url: var("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
                name: var("DATABASE_NAME"),
                max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_millis(parse_or(
                    &var,
                    "DB_ACQUIRE_TIMEOUT_MS",
                    5_000,
                )?),
                statement_timeout: Duration::from_millis(parse_or(
                    &var,
                    "DB_STATEMENT_TIMEOUT_MS",
                    45_000,
                )?),
            },
            payment: PaymentConfig {
                key_id: require_secret(&var, "RAZORPAY_KEY_ID", &environment)?,
                key_secret: require_secret(&var, "RAZORPAY_KEY_SECRET", &environment)?,
                base_url: var("RAZORPAY_BASE_URL")
                    .unwrap_or_else(|| "https://api.razorpay.com/v1".into())
                    .trim_end_matches('/')
                    .to_string(),
                currency: var("PAYMENT_CURRENCY").unwrap_or_else(|| "INR".into()),
                timeout: Duration::from_millis(parse_or(&var, "GATEWAY_TIMEOUT_MS", 30_000)?),
            },
            email: EmailConfig {
                host: var("EMAIL_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
                port: parse_or(&var, "EMAIL_PORT", 587)?,
                from: var("EMAIL_FROM").or_else(|| user.clone()),
                user,
                password: var("EMAIL_PASSWORD"),
            },
            frontend_url,
            allowed_origins,
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Every origin CORS should accept; the storefront URL is always included.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = self.allowed_origins.clone();
        if !origins.iter().any(|o| o == &self.frontend_url) {
            origins.push(self.frontend_url.clone());
        }
        origins
    }
}

/// Require a secret env var: must be set and non-empty in non-development environments.
fn require_secret<F>(var: &F, name: &str, environment: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(v) => Ok(v),
        None if environment == "development" => Ok(placeholder_secret(name)),
        None => Err(format!("{name} must be set in {environment} environment").into()),
    }
}

fn placeholder_secret(name: &str) -> String {
    format!("{DEV_SECRET_PREFIX}{name}-not-for-production")
}

fn parse_or<F, T>(var: &F, name: &str, default: T) -> Result<T, BoxError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, BoxError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/app")]).unwrap();
        assert_eq!(config.environment, "development");
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.database.name, None);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.database.statement_timeout, Duration::from_secs(45));
        assert_eq!(config.payment.currency, "INR");
        assert_eq!(config.payment.base_url, "https://api.razorpay.com/v1");
        assert_eq!(config.payment.timeout, Duration::from_secs(30));
        assert_eq!(config.email.host, "smtp.gmail.com");
        assert_eq!(config.email.port, 587);
        assert!(config.email.credentials().is_none());
        assert!(config.payment.key_secret.starts_with(DEV_SECRET_PREFIX));
        assert!(config.payment.uses_placeholder_secret());
    }

    #[test]
    fn test_configured_secret_is_not_placeholder() {
        let config = load(&[
            ("DATABASE_URL", "memory://"),
            ("RAZORPAY_KEY_SECRET", "real_secret"),
        ])
        .unwrap();
        assert!(!config.payment.uses_placeholder_secret());
    }

    #[test]
    fn test_database_name_override() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_NAME", "bookstore"),
        ])
        .unwrap();
        assert_eq!(config.database.name.as_deref(), Some("bookstore"));
    }

    #[test]
    fn test_database_url_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_secrets_required_outside_development() {
        let err = load(&[
            ("DATABASE_URL", "memory://"),
            ("ENVIRONMENT", "production"),
            ("RAZORPAY_KEY_ID", "rzp_live_x"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("RAZORPAY_KEY_SECRET"));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = load(&[("DATABASE_URL", "memory://"), ("HTTP_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
    }

    #[test]
    fn test_email_from_defaults_to_user() {
        let config = load(&[
            ("DATABASE_URL", "memory://"),
            ("EMAIL_USER", "shop@example.com"),
            ("EMAIL_PASSWORD", "secret"),
        ])
        .unwrap();
        assert_eq!(config.email.from.as_deref(), Some("shop@example.com"));
        assert_eq!(
            config.email.credentials(),
            Some(("shop@example.com", "secret"))
        );
        assert!(config.database.is_memory());
    }

    #[test]
    fn test_cors_origins_include_frontend() {
        let config = load(&[
            ("DATABASE_URL", "memory://"),
            ("FRONTEND_URL", "https://shop.example.com"),
            ("ALLOWED_ORIGINS", "http://localhost:3000, "),
        ])
        .unwrap();
        assert_eq!(
            config.cors_origins(),
            vec![
                "http://localhost:3000".to_string(),
                "https://shop.example.com".to_string()
            ]
        );
    }
}
