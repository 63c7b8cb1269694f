// src/db/client_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{error::AppError, pagination::PageQuery},
    models::{
        clients::{Client, Debt},
        ledger::LedgerStatus,
    },
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list(
        &self,
        name: Option<&str>,
        phone: Option<&str>,
        is_deleted: bool,
        page: &PageQuery,
    ) -> Result<(Vec<Client>, i64), AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE is_deleted = $1
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::TEXT IS NULL OR phone ILIKE '%' || $3 || '%')
            ORDER BY id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(is_deleted)
        .bind(name)
        .bind(phone)
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM clients
            WHERE is_deleted = $1
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::TEXT IS NULL OR phone ILIKE '%' || $3 || '%')
            "#,
        )
        .bind(is_deleted)
        .bind(name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok((clients, total))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    // O saldo nasce zerado; o lançamento de abertura o preenche via recálculo
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        info: &str,
        phone: &str,
        image: Option<&str>,
        recorded_by: &str,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, info, phone, image, recorded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(info)
        .bind(phone)
        .bind(image)
        .bind(recorded_by)
        .fetch_one(executor)
        .await?;
        Ok(client)
    }

    pub async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        info: Option<&str>,
        phone: Option<&str>,
        image: Option<&str>,
        recorded_by: Option<&str>,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name = COALESCE($2, name),
                info = COALESCE($3, info),
                phone = COALESCE($4, phone),
                image = COALESCE($5, image),
                recorded_by = COALESCE($6, recorded_by),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(info)
        .bind(phone)
        .bind(image)
        .bind(recorded_by)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    // Idempotente: apagar de novo só confirma
    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE clients SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LIVRO DE DÍVIDAS
    // =========================================================================

    pub async fn list_debts(&self, client_id: i64) -> Result<Vec<Debt>, AppError> {
        let debts = sqlx::query_as::<_, Debt>(
            r#"
            SELECT * FROM debts
            WHERE client_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(debts)
    }

    pub async fn insert_debt<'e, E>(
        &self,
        executor: E,
        client_id: i64,
        amount: Decimal,
        status: LedgerStatus,
        recorded_by: Option<&str>,
    ) -> Result<Debt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let debt = sqlx::query_as::<_, Debt>(
            r#"
            INSERT INTO debts (client_id, amount, status, recorded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(client_id)
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
        client_id: i64,
        debt_id: i64,
        amount: Option<Decimal>,
        status: Option<LedgerStatus>,
        recorded_by: Option<&str>,
    ) -> Result<Option<Debt>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let debt = sqlx::query_as::<_, Debt>(
            r#"
            UPDATE debts SET
                amount = COALESCE($3, amount),
                status = COALESCE($4, status),
                recorded_by = COALESCE($5, recorded_by),
                updated_at = NOW()
            WHERE id = $2 AND client_id = $1
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(debt_id)
        .bind(amount)
        .bind(status)
        .bind(recorded_by)
        .fetch_optional(executor)
        .await?;
        Ok(debt)
    }

    // Só marca o lançamento; o saldo do cliente NÃO é recalculado aqui.
    pub async fn void_debt(&self, client_id: i64, debt_id: i64) -> Result<Option<Debt>, AppError> {
        let debt = sqlx::query_as::<_, Debt>(
            r#"
            UPDATE debts SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $2 AND client_id = $1
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(debt_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(debt)
    }
}
