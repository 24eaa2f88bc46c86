//! Environment-driven configuration, read once at startup.

/// Outbound mail gateway settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

/// Invoice-parsing LLM settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Address autocomplete settings.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Public base URL used in emailed links.
    pub app_url: String,
    pub jwt_secret: String,
    pub session_ttl_days: i64,
    /// Mark session cookies `Secure` (on in production).
    pub cookie_secure: bool,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub mail: Option<MailConfig>,
    pub llm: Option<LlmConfig>,
    pub places: Option<PlacesConfig>,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env_opt("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let mail = env_opt("MAIL_API_URL").map(|api_url| MailConfig {
            api_url,
            api_key: env_opt("MAIL_API_KEY").unwrap_or_default(),
            from: env_opt("EMAIL_FROM").unwrap_or_else(|| "noreply@example.com".to_string()),
        });

        let llm = env_opt("LLM_API_KEY").map(|api_key| LlmConfig {
            api_url: env_opt("LLM_API_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key,
            model: env_opt("LLM_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
        });

        let places = env_opt("PLACES_API_KEY").map(|api_key| PlacesConfig {
            api_url: env_opt("PLACES_API_URL")
                .unwrap_or_else(|| billfold_places::DEFAULT_ENDPOINT.to_string()),
            api_key,
        });

        Self {
            port: env_opt("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            app_url: env_opt("APP_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            jwt_secret,
            session_ttl_days: 7,
            cookie_secure: env_opt("APP_ENV").as_deref() == Some("production"),
            database_url: env_opt("DATABASE_URL"),
            use_persistent_stores: env_opt("USE_PERSISTENT_STORES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            mail,
            llm,
            places,
        }
    }

    /// In-memory everything, no external gateways. Used by the test suite.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            port: 0,
            app_url: "http://localhost:8080".to_string(),
            jwt_secret: jwt_secret.to_string(),
            session_ttl_days: 7,
            cookie_secure: false,
            database_url: None,
            use_persistent_stores: false,
            mail: None,
            llm: None,
            places: None,
        }
    }
}
