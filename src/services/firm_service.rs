// src/services/firm_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageQuery},
    },
    db::{firm_repo::FirmFields, FirmRepository},
    models::{
        firms::{Firm, FirmDebt, FirmDetail},
        ledger::LedgerStatus,
    },
    services::{
        client_service::DebtPatch,
        ledger::{LedgerService, PartyKind},
    },
};

#[derive(Clone)]
pub struct FirmService {
    repo: FirmRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl FirmService {
    pub fn new(repo: FirmRepository, ledger: LedgerService, pool: PgPool) -> Self {
        Self { repo, ledger, pool }
    }

    pub async fn list(&self, name: Option<&str>, page: &PageQuery) -> Result<Page<Firm>, AppError> {
        let (firms, total) = self.repo.list(name, page).await?;
        Ok(Page::new(firms, page, total))
    }

    pub async fn detail(&self, id: i64) -> Result<FirmDetail, AppError> {
        let firm = self.repo
            .find_active(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("firm_not_found"))?;
        let firm_debts = self.repo.list_debts(id).await?;
        Ok(FirmDetail { firm, firm_debts })
    }

    /// Cadastra a firma com o saldo de abertura lançado como "oldi".
    pub async fn create(
        &self,
        fields: &FirmFields<'_>,
        opening_debt: Decimal,
        recorded_by: Option<&str>,
    ) -> Result<Firm, AppError> {
        let mut tx = self.pool.begin().await?;

        let firm = self.repo.create(&mut *tx, fields).await?;

        self.repo
            .insert_debt(&mut *tx, firm.id, opening_debt, LedgerStatus::Oldi, recorded_by)
            .await?;

        self.ledger.recompute(&mut *tx, PartyKind::Firm, firm.id).await?;

        let firm = self.repo
            .find_active(&mut *tx, firm.id)
            .await?
            .ok_or(AppError::NotFound("firm_not_found"))?;

        tx.commit().await?;

        tracing::info!("🏭 Firma {} criada com saldo inicial {}", firm.id, firm.debt);
        Ok(firm)
    }

    pub async fn update(&self, id: i64, fields: &FirmFields<'_>) -> Result<Firm, AppError> {
        self.repo
            .update(id, fields)
            .await?
            .ok_or(AppError::NotFound("firm_not_found"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::NotFound("firm_not_found"));
        }
        Ok(())
    }

    pub async fn change_debt(
        &self,
        firm_id: i64,
        amount: Decimal,
        status: LedgerStatus,
        recorded_by: Option<&str>,
    ) -> Result<FirmDebt, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava primeiro: a leitura seguinte já enxerga um soft delete concorrente
        if !self.ledger.lock_party(&mut *tx, PartyKind::Firm, firm_id).await? {
            return Err(AppError::NotFound("firm_not_found"));
        }
        if self.repo.find_active(&mut *tx, firm_id).await?.is_none() {
            return Err(AppError::NotFound("firm_not_found"));
        }

        let firm_debt = self.repo
            .insert_debt(&mut *tx, firm_id, amount, status, recorded_by)
            .await?;

        self.ledger.recompute(&mut *tx, PartyKind::Firm, firm_id).await?;
        tx.commit().await?;

        Ok(firm_debt)
    }

    pub async fn update_debt(
        &self,
        firm_id: i64,
        debt_id: i64,
        patch: DebtPatch<'_>,
    ) -> Result<(FirmDebt, Firm), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.ledger.lock_party(&mut *tx, PartyKind::Firm, firm_id).await? {
            return Err(AppError::NotFound("firm_not_found"));
        }

        let firm_debt = self.repo
            .update_debt(&mut *tx, firm_id, debt_id, patch.amount, patch.status, patch.recorded_by)
            .await?
            .ok_or(AppError::NotFound("debt_not_found"))?;

        let balance = self.ledger.recompute(&mut *tx, PartyKind::Firm, firm_id).await?;

        let firm = self.repo
            .find_active(&mut *tx, firm_id)
            .await?
            .ok_or(AppError::NotFound("firm_not_found"))?;

        tx.commit().await?;

        tracing::debug!("Lançamento {} da firma {} corrigido, saldo {:?}", debt_id, firm_id, balance);
        Ok((firm_debt, firm))
    }
}

// Precisam de um Postgres (DATABASE_URL): cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LedgerRepository;

    fn service(pool: PgPool) -> FirmService {
        FirmService::new(
            FirmRepository::new(pool.clone()),
            LedgerService::new(LedgerRepository::new()),
            pool,
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn firm_ledger_is_recomputed_from_history(pool: PgPool) {
        let service = service(pool);
        let fields = FirmFields { name: Some("Coca-Cola"), day: Some("dushanba"), ..Default::default() };
        let firm = service.create(&fields, Decimal::from(500_000), Some("admin")).await.unwrap();
        assert_eq!(firm.debt, Decimal::from(500_000));

        let payment = service
            .change_debt(firm.id, Decimal::from(200_000), LedgerStatus::Berdi, None)
            .await
            .unwrap();
        assert_eq!(service.detail(firm.id).await.unwrap().firm.debt, Decimal::from(300_000));

        let patch = DebtPatch { amount: Some(Decimal::from(450_000)), ..Default::default() };
        let (_, firm) = service.update_debt(firm.id, payment.id, patch).await.unwrap();
        assert_eq!(firm.debt, Decimal::from(50_000));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn deleted_firm_rejects_new_entries(pool: PgPool) {
        let service = service(pool);
        let fields = FirmFields { name: Some("Pepsi"), ..Default::default() };
        let firm = service.create(&fields, Decimal::ZERO, None).await.unwrap();
        service.delete(firm.id).await.unwrap();

        let err = service
            .change_debt(firm.id, Decimal::from(1_000), LedgerStatus::Oldi, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("firm_not_found")));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn entry_waits_for_a_concurrent_delete_and_is_refused(pool: PgPool) {
        let service = service(pool.clone());
        let fields = FirmFields { name: Some("Fanta"), ..Default::default() };
        let firm = service.create(&fields, Decimal::ZERO, None).await.unwrap();

        // Soft delete ainda não confirmado segurando a linha
        let mut deleting = pool.begin().await.unwrap();
        sqlx::query("UPDATE firms SET is_deleted = TRUE WHERE id = $1")
            .bind(firm.id)
            .execute(&mut *deleting)
            .await
            .unwrap();

        let writer = service.clone();
        let entry = tokio::spawn(async move {
            writer
                .change_debt(firm.id, Decimal::from(1_000), LedgerStatus::Oldi, None)
                .await
        });

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        deleting.commit().await.unwrap();

        let err = entry.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::NotFound("firm_not_found")));
        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM firm_debts WHERE firm_id = $1")
            .bind(firm.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(entries, 1);
    }
}
