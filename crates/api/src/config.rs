use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`). Covers both
    /// completion calls of a generation request.
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Credentials and endpoints for the external providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub stripe_secret_key: String,
    pub stripe_base_url: Option<String>,
    pub s3_bucket: String,
    /// Public URL prefix for stored objects; defaults to the bucket endpoint.
    pub s3_public_base_url: Option<String>,
}

impl ProviderConfig {
    /// Load provider configuration from environment variables.
    ///
    /// | Env Var              | Required | Default        |
    /// |----------------------|----------|----------------|
    /// | `OPENAI_API_KEY`     | **yes**  | --             |
    /// | `OPENAI_MODEL`       | no       | `gpt-4o-mini`  |
    /// | `OPENAI_BASE_URL`    | no       | OpenAI API     |
    /// | `STRIPE_SECRET_KEY`  | **yes**  | --             |
    /// | `STRIPE_BASE_URL`    | no       | Stripe API     |
    /// | `S3_BUCKET`          | **yes**  | --             |
    /// | `S3_PUBLIC_BASE_URL` | no       | bucket endpoint|
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: required("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| mailspark_cloud::openai::DEFAULT_MODEL.into()),
            openai_base_url: optional("OPENAI_BASE_URL"),
            stripe_secret_key: required("STRIPE_SECRET_KEY"),
            stripe_base_url: optional("STRIPE_BASE_URL"),
            s3_bucket: required("S3_BUCKET"),
            s3_public_base_url: optional("S3_PUBLIC_BASE_URL"),
        }
    }
}

fn required(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    assert!(!value.is_empty(), "{name} must not be empty");
    value
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
