// src/models/firms.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::ledger::LedgerStatus;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Firm {
    pub id: i64,
    #[schema(example = "Coca-Cola Bottlers")]
    pub name: String,

    // Contatos: supervisor, agente e entregador
    pub supervisor: String,
    pub s_phone: Option<String>,
    pub agent: String,
    pub a_phone: Option<String>,
    pub currier: String,
    pub c_phone: Option<String>,

    // Aceita cartões locais?
    pub humo: bool,
    pub uzcard: bool,

    // Dia da semana de visita (texto livre)
    #[schema(example = "Dushanba")]
    pub day: String,

    pub debt: Decimal,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Lançamentos da firma não têm soft delete
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FirmDebt {
    pub id: i64,
    pub firm_id: i64,
    pub amount: Decimal,
    pub status: LedgerStatus,
    pub recorded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FirmDetail {
    #[serde(flatten)]
    pub firm: Firm,
    pub firm_debts: Vec<FirmDebt>,
}
