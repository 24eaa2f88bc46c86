//! Infrastructure wiring: stores, mailer, external clients, session tokens.

use std::sync::Arc;

use billfold_auth::Hs256Jwt;
use billfold_mailer::{HttpMailer, Mailer, NoopMailer};
use billfold_parser::LlmParser;
use billfold_places::PlacesClient;
use billfold_store::{
    AuthTokenStore, InMemoryInvoiceStore, InMemoryTokenStore, InMemoryUserStore, InvoiceStore,
    UserStore,
};

use crate::config::AppConfig;

/// Everything handlers need, injected as one extension.
pub struct AppServices {
    pub invoices: Arc<dyn InvoiceStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn AuthTokenStore>,
    pub mailer: Arc<dyn Mailer>,
    pub parser: Option<Arc<LlmParser>>,
    pub places: Option<Arc<PlacesClient>>,
    pub jwt: Arc<Hs256Jwt>,
    pub config: AppConfig,
}

impl AppServices {
    /// In-memory stores (dev/test). External clients come from the config;
    /// mail falls back to the logging no-op when no gateway is configured.
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            invoices: Arc::new(InMemoryInvoiceStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            tokens: Arc::new(InMemoryTokenStore::new()),
            mailer: mailer_from_config(&config),
            parser: parser_from_config(&config),
            places: places_from_config(&config),
            jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
            config,
        }
    }

    /// Swap the mailer (test hook: recording outbound email).
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    #[cfg(feature = "postgres")]
    pub async fn postgres(config: AppConfig, pool: sqlx::PgPool) -> Self {
        use billfold_store::{PgInvoiceStore, PgTokenStore, PgUserStore};

        Self {
            invoices: Arc::new(PgInvoiceStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            tokens: Arc::new(PgTokenStore::new(pool)),
            mailer: mailer_from_config(&config),
            parser: parser_from_config(&config),
            places: places_from_config(&config),
            jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
            config,
        }
    }
}

fn mailer_from_config(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(&mail.api_url, &mail.api_key, &mail.from)),
        None => Arc::new(NoopMailer),
    }
}

fn parser_from_config(config: &AppConfig) -> Option<Arc<LlmParser>> {
    config
        .llm
        .as_ref()
        .map(|llm| Arc::new(LlmParser::new(&llm.api_url, &llm.api_key, &llm.model)))
}

fn places_from_config(config: &AppConfig) -> Option<Arc<PlacesClient>> {
    config
        .places
        .as_ref()
        .map(|places| Arc::new(PlacesClient::new(&places.api_url, &places.api_key)))
}

/// Pick the storage backend from the environment, mirroring the
/// `USE_PERSISTENT_STORES` switch.
pub async fn build_services(config: AppConfig) -> AppServices {
    if config.use_persistent_stores {
        #[cfg(feature = "postgres")]
        {
            let database_url = config
                .database_url
                .clone()
                .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("failed to connect to Postgres");
            billfold_store::migrate(&pool)
                .await
                .expect("failed to run store migrations");

            return AppServices::postgres(config, pool).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    AppServices::in_memory(config)
}
