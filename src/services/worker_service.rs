// src/services/worker_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use crate::{
    common::{clock::Clock, error::AppError},
    db::WorkerRepository,
    models::{
        ledger::LedgerStatus,
        workers::{Worker, WorkerDetail, WorkerPay, WorkerStatus},
    },
    services::{
        image_store::{sniff_image, ImageStore},
        payroll::{balance_from, PayrollPolicy},
    },
};

#[derive(Debug, Default)]
pub struct WorkerPatch<'a> {
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub daily_rate: Option<i64>,
    pub start_day: Option<NaiveDate>,
    pub status: Option<WorkerStatus>,
}

#[derive(Clone)]
pub struct WorkerService {
    repo: WorkerRepository,
    pool: PgPool,
    policy: PayrollPolicy,
    clock: Arc<dyn Clock>,
    images: Arc<dyn ImageStore>,
}

impl WorkerService {
    pub fn new(
        repo: WorkerRepository,
        pool: PgPool,
        policy: PayrollPolicy,
        clock: Arc<dyn Clock>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self { repo, pool, policy, clock, images }
    }

    /// Refaz `accrued` (só se ativo) e o saldo a partir de todos os pagamentos.
    /// A linha do trabalhador já deve estar travada na transação.
    async fn recompute_locked(&self, conn: &mut PgConnection, worker: &Worker) -> Result<Worker, AppError> {
        let accrued = if worker.is_active() {
            self.policy
                .accrued(worker.start_day, worker.daily_rate, self.clock.now())
                .ok_or_else(too_large)?
        } else {
            worker.accrued
        };

        let pays = self.repo.pays_of(&mut *conn, worker.id).await?;
        let balance = balance_from(accrued, pays.iter().map(|p| (p.amount, p.status)))
            .ok_or_else(too_large)?;

        if accrued == worker.accrued && balance == worker.balance {
            return Ok(worker.clone());
        }

        self.repo.set_amounts(&mut *conn, worker.id, accrued, balance).await
    }

    /// Recalcula um trabalhador na sua própria transação.
    pub async fn recompute_balance(&self, id: i64) -> Result<Worker, AppError> {
        let mut tx = self.pool.begin().await?;

        let worker = self.repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("worker_not_found"))?;
        let worker = self.recompute_locked(&mut *tx, &worker).await?;

        tx.commit().await?;
        Ok(worker)
    }

    pub async fn list(&self, name: Option<&str>) -> Result<Vec<Worker>, AppError> {
        let workers = self.repo.list(name).await?;

        let mut refreshed = Vec::with_capacity(workers.len());
        for worker in workers {
            if !worker.is_active() {
                refreshed.push(worker);
                continue;
            }
            match self.recompute_balance(worker.id).await {
                Ok(worker) => refreshed.push(worker),
                // Um registro fora do limite não derruba a listagem
                Err(AppError::ValidationError(_)) => {
                    tracing::warn!("⚠️ Saldo do trabalhador {} fora do limite, mantido o valor salvo", worker.id);
                    refreshed.push(worker);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(refreshed)
    }

    pub async fn detail(&self, id: i64) -> Result<WorkerDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let worker = self.repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("worker_not_found"))?;
        let worker = self.recompute_locked(&mut *tx, &worker).await?;
        let pays = self.repo.pays_of(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(WorkerDetail { worker, pays })
    }

    pub async fn create(
        &self,
        name: &str,
        phone: &str,
        daily_rate: i64,
        start_day: NaiveDate,
    ) -> Result<Worker, AppError> {
        let mut tx = self.pool.begin().await?;

        let worker = self.repo
            .create(&mut *tx, name, phone, daily_rate, start_day, WorkerStatus::Ishlayabdi)
            .await?;
        let worker = self.recompute_locked(&mut *tx, &worker).await?;

        tx.commit().await?;

        tracing::info!("👷 Trabalhador {} criado, saldo inicial {}", worker.id, worker.balance);
        Ok(worker)
    }

    /// Fecha a conta com os dados antigos, aplica a edição e recalcula de novo.
    /// Assim, desativar congela o acumulado até aquele momento.
    pub async fn update(&self, id: i64, patch: WorkerPatch<'_>) -> Result<Worker, AppError> {
        let mut tx = self.pool.begin().await?;

        let worker = self.repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("worker_not_found"))?;
        self.recompute_locked(&mut *tx, &worker).await?;

        let worker = self.repo
            .update(
                &mut *tx,
                id,
                patch.name,
                patch.phone,
                patch.daily_rate,
                patch.start_day,
                patch.status,
            )
            .await?;
        let worker = self.recompute_locked(&mut *tx, &worker).await?;

        tx.commit().await?;
        Ok(worker)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let worker = self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("worker_not_found"))?;

        if let Some(image) = worker.image.as_deref() {
            self.images.delete(image).await?;
        }

        self.repo.delete(id).await?;
        tracing::info!("🗑️ Trabalhador {} removido", id);
        Ok(())
    }

    /// Registra um pagamento e refaz o saldo sob a trava da linha.
    pub async fn pay(&self, id: i64, amount: i64, status: LedgerStatus) -> Result<(WorkerPay, Worker), AppError> {
        let mut tx = self.pool.begin().await?;

        let worker = self.repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("worker_not_found"))?;

        let pay = self.repo.insert_pay(&mut *tx, id, amount, status).await?;
        let worker = self.recompute_locked(&mut *tx, &worker).await?;

        tx.commit().await?;
        Ok((pay, worker))
    }

    /// Troca a foto: o arquivo antigo é apagado antes de gravar o novo.
    pub async fn set_image(&self, id: i64, bytes: &[u8]) -> Result<Worker, AppError> {
        let ext = sniff_image(bytes)?;

        let worker = self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("worker_not_found"))?;

        if let Some(old) = worker.image.as_deref() {
            self.images.delete(old).await?;
        }

        let path = self.images.put("workers", ext, bytes).await?;

        match self.repo.set_image(id, &path).await? {
            Some(worker) => Ok(worker),
            None => {
                // Removido no meio do caminho
                self.images.delete(&path).await?;
                Err(AppError::NotFound("worker_not_found"))
            }
        }
    }

    /// Passada diária: cada trabalhador ativo na sua transação. Falhas são
    /// registradas e a passada continua. Devolve (ok, falhas).
    pub async fn sweep(&self) -> Result<(usize, usize), AppError> {
        let ids = self.repo.active_ids().await?;

        let (mut ok, mut failed) = (0, 0);
        for id in ids {
            match self.recompute_balance(id).await {
                Ok(_) => ok += 1,
                Err(e) => {
                    tracing::error!("🔥 Falha ao atualizar trabalhador {}: {:?}", id, e);
                    failed += 1;
                }
            }
        }
        Ok((ok, failed))
    }
}

fn too_large() -> AppError {
    AppError::field("amount", "too_large")
}

// Precisam de um Postgres (DATABASE_URL): cargo test -- --ignored
#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{common::clock::FixedClock, services::image_store::LocalDiskStore};

    // 2025-07-05 12:00 em Tashkent: o dia de hoje já conta
    fn service(pool: PgPool, dir: &std::path::Path) -> WorkerService {
        let now = Utc.with_ymd_and_hms(2025, 7, 5, 7, 0, 0).unwrap();
        WorkerService::new(
            WorkerRepository::new(pool.clone()),
            pool,
            PayrollPolicy::new(5, 11).unwrap(),
            Arc::new(FixedClock(now)),
            Arc::new(LocalDiskStore::new(dir)),
        )
    }

    fn july(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn balance_is_accrual_plus_payments(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let service = service(pool, dir.path());

        let worker = service.create("Bobur", "+998900000001", 50_000, july(1)).await.unwrap();
        assert_eq!(worker.accrued, 250_000);
        assert_eq!(worker.balance, 250_000);

        let (_, worker) = service.pay(worker.id, 100_000, LedgerStatus::Oldi).await.unwrap();
        assert_eq!(worker.balance, 150_000);

        let (_, worker) = service.pay(worker.id, 20_000, LedgerStatus::Berdi).await.unwrap();
        assert_eq!(worker.balance, 170_000);

        let detail = service.detail(worker.id).await.unwrap();
        assert_eq!(detail.pays.len(), 2);
        assert_eq!(detail.worker.balance, 170_000);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn overflowing_rate_is_rejected_before_saving(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let service = service(pool, dir.path());
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();

        let err = service
            .create("Rustam", "+998900000009", 90_000_000_000_000_000, start)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn list_survives_a_stored_row_out_of_range(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        sqlx::query(
            "INSERT INTO workers (name, phone, daily_rate, start_day) VALUES ('Legacy', '+998900000010', $1, '2000-01-01')",
        )
        .bind(90_000_000_000_000_000i64)
        .execute(&pool)
        .await
        .unwrap();

        let service = service(pool, dir.path());
        service.create("Bobur", "+998900000011", 50_000, july(1)).await.unwrap();

        let workers = service.list(None).await.unwrap();
        assert_eq!(workers.len(), 2);
        assert!(workers.iter().any(|w| w.name == "Bobur" && w.balance == 250_000));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn deactivated_worker_keeps_frozen_accrual(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let service = service(pool, dir.path());
        let worker = service.create("Dilshod", "+998900000002", 40_000, july(3)).await.unwrap();

        let patch = WorkerPatch { status: Some(WorkerStatus::Ishlamayabdi), ..Default::default() };
        let worker = service.update(worker.id, patch).await.unwrap();
        assert_eq!(worker.accrued, 3 * 40_000);

        let (ok, failed) = service.sweep().await.unwrap();
        assert_eq!((ok, failed), (0, 0));
        assert_eq!(service.recompute_balance(worker.id).await.unwrap().accrued, 3 * 40_000);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn uploaded_photo_replaces_the_old_file(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let service = service(pool, dir.path());
        let worker = service.create("Sardor", "+998900000003", 30_000, july(1)).await.unwrap();
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

        let first = service.set_image(worker.id, &png).await.unwrap();
        let first_path = first.image.clone().unwrap();
        let second = service.set_image(worker.id, &png).await.unwrap();

        assert!(!dir.path().join(&first_path).exists());
        assert!(dir.path().join(second.image.unwrap()).exists());
    }
}
