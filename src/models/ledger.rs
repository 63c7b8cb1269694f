// src/models/ledger.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Mapeia o CREATE TYPE ledger_status do banco.
// "oldi" = aumenta o saldo (recebeu / ficou devendo), "berdi" = diminui (pagou).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ledger_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    Oldi,
    Berdi,
}

impl LedgerStatus {
    pub fn sign(self) -> Decimal {
        match self {
            LedgerStatus::Oldi => Decimal::ONE,
            LedgerStatus::Berdi => Decimal::NEGATIVE_ONE,
        }
    }
}

// Projeção mínima de uma linha do livro, usada no recálculo
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct LedgerLine {
    pub amount: Decimal,
    pub status: LedgerStatus,
}
