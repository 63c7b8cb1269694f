// src/models/clients.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::ledger::LedgerStatus;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Client {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Aziz")]
    pub name: String,
    pub info: String,
    #[schema(example = "+998901234567")]
    pub phone: String,
    pub image: Option<String>,

    // Saldo derivado do livro de dívidas. Nunca é escrito diretamente.
    #[schema(example = "70000")]
    pub debt: Decimal,

    pub recorded_by: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Um lançamento no livro de dívidas do cliente.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Debt {
    pub id: i64,
    pub client_id: i64,
    #[schema(example = "30000")]
    pub amount: Decimal,
    pub status: LedgerStatus,
    pub recorded_by: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub debts: Vec<Debt>,
}
