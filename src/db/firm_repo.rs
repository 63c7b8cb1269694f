// src/db/firm_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{error::AppError, pagination::PageQuery},
    models::{
        firms::{Firm, FirmDebt},
        ledger::LedgerStatus,
    },
};

// Campos de cadastro da firma (criação e atualização parcial)
#[derive(Debug, Default)]
pub struct FirmFields<'a> {
    pub name: Option<&'a str>,
    pub supervisor: Option<&'a str>,
    pub s_phone: Option<&'a str>,
    pub agent: Option<&'a str>,
    pub a_phone: Option<&'a str>,
    pub currier: Option<&'a str>,
    pub c_phone: Option<&'a str>,
    pub humo: Option<bool>,
    pub uzcard: Option<bool>,
    pub day: Option<&'a str>,
}

#[derive(Clone)]
pub struct FirmRepository {
    pool: PgPool,
}

impl FirmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        name: Option<&str>,
        page: &PageQuery,
    ) -> Result<(Vec<Firm>, i64), AppError> {
        let firms = sqlx::query_as::<_, Firm>(
            r#"
            SELECT * FROM firms
            WHERE is_deleted = FALSE
              AND ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(name)
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM firms
            WHERE is_deleted = FALSE
              AND ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok((firms, total))
    }

    // Apenas firmas ativas
    pub async fn find_active<'e, E>(&self, executor: E, id: i64) -> Result<Option<Firm>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let firm = sqlx::query_as::<_, Firm>(
            "SELECT * FROM firms WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(firm)
    }

    pub async fn create<'e, E>(&self, executor: E, fields: &FirmFields<'_>) -> Result<Firm, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let firm = sqlx::query_as::<_, Firm>(
            r#"
            INSERT INTO firms (
                name, supervisor, s_phone, agent, a_phone,
                currier, c_phone, humo, uzcard, day
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(fields.name)
        .bind(fields.supervisor)
        .bind(fields.s_phone)
        .bind(fields.agent)
        .bind(fields.a_phone)
        .bind(fields.currier)
        .bind(fields.c_phone)
        .bind(fields.humo)
        .bind(fields.uzcard)
        .bind(fields.day)
        .fetch_one(executor)
        .await?;
        Ok(firm)
    }

    pub async fn update(&self, id: i64, fields: &FirmFields<'_>) -> Result<Option<Firm>, AppError> {
        let firm = sqlx::query_as::<_, Firm>(
            r#"
            UPDATE firms SET
                name = COALESCE($2, name),
                supervisor = COALESCE($3, supervisor),
                s_phone = COALESCE($4, s_phone),
                agent = COALESCE($5, agent),
                a_phone = COALESCE($6, a_phone),
                currier = COALESCE($7, currier),
                c_phone = COALESCE($8, c_phone),
                humo = COALESCE($9, humo),
                uzcard = COALESCE($10, uzcard),
                day = COALESCE($11, day),
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.supervisor)
        .bind(fields.s_phone)
        .bind(fields.agent)
        .bind(fields.a_phone)
        .bind(fields.currier)
        .bind(fields.c_phone)
        .bind(fields.humo)
        .bind(fields.uzcard)
        .bind(fields.day)
        .fetch_optional(&self.pool)
        .await?;
        Ok(firm)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE firms SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LIVRO DA FIRMA
    // =========================================================================

    pub async fn list_debts(&self, firm_id: i64) -> Result<Vec<FirmDebt>, AppError> {
        let debts = sqlx::query_as::<_, FirmDebt>(
            "SELECT * FROM firm_debts WHERE firm_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(firm_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(debts)
    }

    pub async fn insert_debt<'e, E>(
        &self,
        executor: E,
        firm_id: i64,
        amount: Decimal,
        status: LedgerStatus,
        recorded_by: Option<&str>,
    ) -> Result<FirmDebt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let debt = sqlx::query_as::<_, FirmDebt>(
            r#"
            INSERT INTO firm_debts (firm_id, amount, status, recorded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(firm_id)
        .bind(amount)
        .bind(status)
        .bind(recorded_by)
        .fetch_one(executor)
        .await?;
        Ok(debt)
    }

    pub async fn update_debt<'e, E>(
        &self,
        executor: E,
        firm_id: i64,
        debt_id: i64,
        amount: Option<Decimal>,
        status: Option<LedgerStatus>,
        recorded_by: Option<&str>,
    ) -> Result<Option<FirmDebt>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let debt = sqlx::query_as::<_, FirmDebt>(
            r#"
            UPDATE firm_debts SET
                amount = COALESCE($3, amount),
                status = COALESCE($4, status),
                recorded_by = COALESCE($5, recorded_by),
                updated_at = NOW()
            WHERE id = $2 AND firm_id = $1
            RETURNING *
            "#,
        )
        .bind(firm_id)
        .bind(debt_id)
        .bind(amount)
        .bind(status)
        .bind(recorded_by)
        .fetch_optional(executor)
        .await?;
        Ok(debt)
    }
}
