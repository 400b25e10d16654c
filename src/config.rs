// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AnalyticsRepository, AuditRepository, DocumentRepository, EnergyRepository, UserRepository,
        WorkOrderRepository, WorkRequestRepository,
    },
    services::{
        analytics_service::AnalyticsService,
        auth::AuthService,
        document_service::DocumentService,
        effects::EffectRunner,
        energy_service::EnergyService,
        mailer::{HttpMailer, LogMailer, Mailer},
        user_service::UserService,
        work_order_service::WorkOrderService,
        work_request_service::WorkRequestService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub token_ttl_hours: i64,
    pub notify_default_recipient: String,
    pub mail_from: String,
    pub mail_relay_url: Option<String>,
    pub mail_relay_token: Option<String>,
    pub mail_timeout_secs: u64,
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bootstrap_admin = match (optional("BOOTSTRAP_ADMIN_USERNAME"), optional("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 24)?,
            notify_default_recipient: optional("NOTIFY_DEFAULT_RECIPIENT")
                .unwrap_or_else(|| "maintenance@localhost".to_string()),
            mail_from: optional("MAIL_FROM").unwrap_or_else(|| "noreply@localhost".to_string()),
            mail_relay_url: optional("MAIL_RELAY_URL"),
            mail_relay_token: optional("MAIL_RELAY_TOKEN"),
            mail_timeout_secs: parse_or("MAIL_TIMEOUT_SECS", 10)?,
            bootstrap_admin,
        })
    }
}

/// Unset and blank both count as absent.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub work_request_service: WorkRequestService,
    pub work_order_service: WorkOrderService,
    pub analytics_service: AnalyticsService,
    pub energy_service: EnergyService,
    pub document_service: DocumentService,
    pub audit_repo: AuditRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Could not connect to the database")?;

        tracing::info!("Database connection established");

        Self::with_pool(db_pool, config)
    }

    /// Wires repositories and services on top of an existing pool.
    pub fn with_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let user_repo = UserRepository::new(db_pool.clone());
        let wr_repo = WorkRequestRepository::new(db_pool.clone());
        let wo_repo = WorkOrderRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
            Some(url) => {
                tracing::info!(relay = %url, "Mail goes through the HTTP relay");
                Arc::new(
                    HttpMailer::new(
                        url.clone(),
                        config.mail_relay_token.clone(),
                        config.mail_from.clone(),
                        Duration::from_secs(config.mail_timeout_secs),
                    )
                    .context("Could not build the mail relay client")?,
                )
            }
            None => {
                tracing::warn!("MAIL_RELAY_URL not set, notifications are only logged");
                Arc::new(LogMailer)
            }
        };
        let effects = EffectRunner::new(mailer, Arc::new(audit_repo.clone()));

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_hours,
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo.clone(), auth_service.clone());
        let work_request_service = WorkRequestService::new(
            db_pool.clone(),
            wr_repo,
            wo_repo.clone(),
            user_repo.clone(),
            effects.clone(),
            config.notify_default_recipient.clone(),
        );
        let work_order_service = WorkOrderService::new(
            db_pool.clone(),
            wo_repo,
            user_repo,
            effects.clone(),
            config.notify_default_recipient.clone(),
        );
        let analytics_service = AnalyticsService::new(
            AnalyticsRepository::new(db_pool.clone()),
            effects,
            config.notify_default_recipient.clone(),
        );
        let energy_service = EnergyService::new(EnergyRepository::new(db_pool.clone()));
        let document_service = DocumentService::new(DocumentRepository::new(db_pool.clone()));

        Ok(Self {
            db_pool,
            auth_service,
            user_service,
            work_request_service,
            work_order_service,
            analytics_service,
            energy_service,
            document_service,
            audit_repo,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub const TEST_SECRET: &str = "test-secret";

    pub fn config() -> Config {
        Config {
            database_url: "postgres://localhost/unused".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            token_ttl_hours: 1,
            notify_default_recipient: "ops@plant.local".to_string(),
            mail_from: "noreply@plant.local".to_string(),
            mail_relay_url: None,
            mail_relay_token: None,
            mail_timeout_secs: 1,
            bootstrap_admin: None,
        }
    }

    /// State over a pool that never connects until a query runs.
    pub fn lazy_state() -> AppState {
        let config = config();
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState::with_pool(pool, config).expect("state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_uses_default_and_rejects_garbage() {
        // Keys unique to this test so parallel tests don't interfere
        unsafe {
            env::remove_var("CFG_TEST_UNSET");
            env::set_var("CFG_TEST_BAD", "many");
            env::set_var("CFG_TEST_GOOD", " 12 ");
        }

        assert_eq!(parse_or::<u32>("CFG_TEST_UNSET", 5).unwrap(), 5);
        assert!(parse_or::<u32>("CFG_TEST_BAD", 5).is_err());
        assert_eq!(parse_or::<u32>("CFG_TEST_GOOD", 5).unwrap(), 12);
    }
}
