// src/db/ledger_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::ledger::LedgerLine,
    services::ledger::PartyKind,
};

// Consultas comuns aos dois livros (clientes e firmas).
// Os nomes de tabela vêm de PartyKind (constantes), nunca da requisição.
// Sempre roda dentro da transação de quem chama, por isso não guarda o pool.
#[derive(Clone, Default)]
pub struct LedgerRepository;

impl LedgerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn lock_party<'e, E>(
        &self,
        executor: E,
        kind: PartyKind,
        party_id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", kind.parent_table());
        let found: Option<i64> = sqlx::query_scalar(&sql)
            .bind(party_id)
            .fetch_optional(executor)
            .await?;
        Ok(found.is_some())
    }

    pub async fn active_lines<'e, E>(
        &self,
        executor: E,
        kind: PartyKind,
        party_id: i64,
    ) -> Result<Vec<LedgerLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filter = if kind.supports_soft_delete() { " AND is_deleted = FALSE" } else { "" };
        let sql = format!(
            "SELECT amount, status FROM {} WHERE {} = $1{}",
            kind.entries_table(),
            kind.owner_column(),
            filter
        );
        let lines = sqlx::query_as::<_, LedgerLine>(&sql)
            .bind(party_id)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }

    pub async fn set_balance<'e, E>(
        &self,
        executor: E,
        kind: PartyKind,
        party_id: i64,
        balance: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET debt = $2, updated_at = NOW() WHERE id = $1",
            kind.parent_table()
        );
        sqlx::query(&sql)
            .bind(party_id)
            .bind(balance)
            .execute(executor)
            .await?;
        Ok(())
    }
}
