// src/models/workers.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::ledger::LedgerStatus;

// Mapeia o CREATE TYPE worker_status: "trabalhando" / "não trabalhando"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "worker_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Ishlayabdi,
    Ishlamayabdi,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub phone: String,

    // Diária, em unidades inteiras da moeda
    #[serde(rename = "amount")]
    #[schema(example = 50000)]
    pub daily_rate: i64,

    #[serde(rename = "day")]
    #[schema(value_type = String, format = Date, example = "2025-07-01")]
    pub start_day: NaiveDate,

    pub status: WorkerStatus,

    // Caminho da foto no storage
    pub image: Option<String>,

    // Diárias acumuladas (congeladas enquanto inativo)
    pub accrued: i64,

    #[serde(rename = "summa")]
    pub balance: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Worker {
    pub fn is_active(&self) -> bool {
        self.status == WorkerStatus::Ishlayabdi
    }
}

/// Pagamento manual: "oldi" = o trabalhador recebeu, "berdi" = ficou a crédito.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WorkerPay {
    pub id: i64,
    pub worker_id: i64,
    pub amount: i64,
    pub status: LedgerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkerDetail {
    pub worker: Worker,
    pub pays: Vec<WorkerPay>,
}
