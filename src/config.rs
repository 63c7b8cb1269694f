// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{
        clock::{Clock, SystemClock},
        i18n::I18nStore,
    },
    db::{
        ClientRepository, FirmRepository, LedgerRepository, OrderRepository, SaleRepository,
        UserRepository, WorkerRepository,
    },
    services::{
        auth::AuthService,
        client_service::ClientService,
        firm_service::FirmService,
        image_store::{ImageStore, LocalDiskStore},
        ledger::LedgerService,
        order_service::OrderService,
        payroll::PayrollPolicy,
        sale_service::SaleService,
        worker_service::WorkerService,
    },
};

// Configuração lida do ambiente (.env opcional)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub payroll_utc_offset_hours: i32,
    pub payroll_cutoff_hour: u32,
    pub upload_dir: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            payroll_utc_offset_hours: parse_or("PAYROLL_UTC_OFFSET_HOURS", 5)?,
            payroll_cutoff_hour: parse_or("PAYROLL_CUTOFF_HOUR", 11)?,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/public".to_string()),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválido: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub clock: Arc<dyn Clock>,
    pub payroll: PayrollPolicy,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub firm_service: FirmService,
    pub order_service: OrderService,
    pub sale_service: SaleService,
    pub worker_service: WorkerService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let image_store: Arc<dyn ImageStore> = Arc::new(LocalDiskStore::new(&settings.upload_dir));
        Self::build(db_pool, settings, Arc::new(SystemClock), image_store)
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(
        db_pool: PgPool,
        settings: &Settings,
        clock: Arc<dyn Clock>,
        image_store: Arc<dyn ImageStore>,
    ) -> anyhow::Result<Self> {
        let payroll = PayrollPolicy::new(settings.payroll_utc_offset_hours, settings.payroll_cutoff_hour)?;
        let ledger = LedgerService::new(LedgerRepository::new());
        let firm_repo = FirmRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            UserRepository::new(db_pool.clone()),
            settings.jwt_secret.clone(),
            db_pool.clone(),
        );
        let client_service = ClientService::new(
            ClientRepository::new(db_pool.clone()),
            ledger.clone(),
            db_pool.clone(),
        );
        let firm_service = FirmService::new(firm_repo.clone(), ledger, db_pool.clone());
        let order_service = OrderService::new(order_repo.clone(), firm_repo, db_pool.clone());
        let sale_service = SaleService::new(SaleRepository::new(db_pool.clone()), order_repo, db_pool.clone());
        let worker_service = WorkerService::new(
            WorkerRepository::new(db_pool.clone()),
            db_pool.clone(),
            payroll,
            clock.clone(),
            image_store,
        );

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::global().clone(),
            clock,
            payroll,
            auth_service,
            client_service,
            firm_service,
            order_service,
            sale_service,
            worker_service,
        })
    }
}
