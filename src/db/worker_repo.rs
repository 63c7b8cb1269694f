// src/db/worker_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        ledger::LedgerStatus,
        workers::{Worker, WorkerPay, WorkerStatus},
    },
};

#[derive(Clone)]
pub struct WorkerRepository {
    pool: PgPool,
}

impl WorkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, name: Option<&str>) -> Result<Vec<Worker>, AppError> {
        let workers = sqlx::query_as::<_, Worker>(
            r#"
            SELECT * FROM workers
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY id DESC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(workers)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Worker>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let worker = sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(worker)
    }

    /// Trava a linha do trabalhador até o fim da transação.
    pub async fn lock<'e, E>(&self, executor: E, id: i64) -> Result<Option<Worker>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let worker = sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(worker)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: &str,
        daily_rate: i64,
        start_day: NaiveDate,
        status: WorkerStatus,
    ) -> Result<Worker, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let worker = sqlx::query_as::<_, Worker>(
            r#"
            INSERT INTO workers (name, phone, daily_rate, start_day, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(daily_rate)
        .bind(start_day)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(worker)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        name: Option<&str>,
        phone: Option<&str>,
        daily_rate: Option<i64>,
        start_day: Option<NaiveDate>,
        status: Option<WorkerStatus>,
    ) -> Result<Worker, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let worker = sqlx::query_as::<_, Worker>(
            r#"
            UPDATE workers SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                daily_rate = COALESCE($4, daily_rate),
                start_day = COALESCE($5, start_day),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(daily_rate)
        .bind(start_day)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(worker)
    }

    pub async fn set_amounts<'e, E>(
        &self,
        executor: E,
        id: i64,
        accrued: i64,
        balance: i64,
    ) -> Result<Worker, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let worker = sqlx::query_as::<_, Worker>(
            r#"
            UPDATE workers SET accrued = $2, balance = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(accrued)
        .bind(balance)
        .fetch_one(executor)
        .await?;
        Ok(worker)
    }

    pub async fn set_image(&self, id: i64, image: &str) -> Result<Option<Worker>, AppError> {
        let worker = sqlx::query_as::<_, Worker>(
            "UPDATE workers SET image = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(image)
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    // worker_pays caem junto (ON DELETE CASCADE)
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn active_ids(&self) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM workers WHERE status = 'ishlayabdi' ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    // =========================================================================
    //  PAGAMENTOS
    // =========================================================================

    pub async fn pays_of<'e, E>(&self, executor: E, worker_id: i64) -> Result<Vec<WorkerPay>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pays = sqlx::query_as::<_, WorkerPay>(
            "SELECT * FROM worker_pays WHERE worker_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(worker_id)
        .fetch_all(executor)
        .await?;
        Ok(pays)
    }

    pub async fn insert_pay<'e, E>(
        &self,
        executor: E,
        worker_id: i64,
        amount: i64,
        status: LedgerStatus,
    ) -> Result<WorkerPay, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pay = sqlx::query_as::<_, WorkerPay>(
            r#"
            INSERT INTO worker_pays (worker_id, amount, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(worker_id)
        .bind(amount)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(pay)
    }
}
