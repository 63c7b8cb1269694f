// src/services/client_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageQuery},
    },
    db::ClientRepository,
    models::{
        clients::{Client, ClientDetail, Debt},
        ledger::LedgerStatus,
    },
    services::ledger::{LedgerService, PartyKind},
};

// Dados de cadastro do cliente + dívida de abertura
#[derive(Debug)]
pub struct NewClient<'a> {
    pub name: &'a str,
    pub info: &'a str,
    pub phone: &'a str,
    pub image: Option<&'a str>,
    pub debt: Decimal,
    pub recorded_by: &'a str,
}

#[derive(Debug, Default)]
pub struct ClientPatch<'a> {
    pub name: Option<&'a str>,
    pub info: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub image: Option<&'a str>,
    pub recorded_by: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct DebtPatch<'a> {
    pub amount: Option<Decimal>,
    pub status: Option<LedgerStatus>,
    pub recorded_by: Option<&'a str>,
}

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl ClientService {
    pub fn new(repo: ClientRepository, ledger: LedgerService, pool: PgPool) -> Self {
        Self { repo, ledger, pool }
    }

    pub async fn list(
        &self,
        name: Option<&str>,
        phone: Option<&str>,
        is_deleted: bool,
        page: &PageQuery,
    ) -> Result<Page<Client>, AppError> {
        let (clients, total) = self.repo.list(name, phone, is_deleted, page).await?;
        Ok(Page::new(clients, page, total))
    }

    pub async fn detail(&self, id: i64) -> Result<ClientDetail, AppError> {
        let client = self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("client_not_found"))?;
        let debts = self.repo.list_debts(id).await?;
        Ok(ClientDetail { client, debts })
    }

    /// Cria o cliente e lança a dívida inicial como "oldi", tudo na mesma transação.
    pub async fn create(&self, new: NewClient<'_>) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.repo
            .create(&mut *tx, new.name, new.info, new.phone, new.image, new.recorded_by)
            .await?;

        self.repo
            .insert_debt(&mut *tx, client.id, new.debt, LedgerStatus::Oldi, Some(new.recorded_by))
            .await?;

        self.ledger.recompute(&mut *tx, PartyKind::Client, client.id).await?;

        let client = self.repo
            .find_by_id(&mut *tx, client.id)
            .await?
            .ok_or(AppError::NotFound("client_not_found"))?;

        tx.commit().await?;

        tracing::info!("🧾 Cliente {} criado com dívida inicial {}", client.id, client.debt);
        Ok(client)
    }

    pub async fn update(&self, id: i64, patch: ClientPatch<'_>) -> Result<Client, AppError> {
        self.repo
            .update(id, patch.name, patch.info, patch.phone, patch.image, patch.recorded_by)
            .await?
            .ok_or(AppError::NotFound("client_not_found"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::NotFound("client_not_found"));
        }
        Ok(())
    }

    /// Novo lançamento no livro do cliente + recálculo do saldo.
    pub async fn change_debt(
        &self,
        client_id: i64,
        amount: Decimal,
        status: LedgerStatus,
        recorded_by: &str,
    ) -> Result<Debt, AppError> {
        let mut tx = self.pool.begin().await?;

        // A trava vem antes do insert: escritores do mesmo cliente ficam em fila
        if !self.ledger.lock_party(&mut *tx, PartyKind::Client, client_id).await? {
            return Err(AppError::NotFound("client_not_found"));
        }

        let debt = self.repo
            .insert_debt(&mut *tx, client_id, amount, status, Some(recorded_by))
            .await?;

        self.ledger.recompute(&mut *tx, PartyKind::Client, client_id).await?;
        tx.commit().await?;

        Ok(debt)
    }

    /// Corrige um lançamento antigo e recalcula o saldo inteiro.
    pub async fn update_debt(
        &self,
        client_id: i64,
        debt_id: i64,
        patch: DebtPatch<'_>,
    ) -> Result<(Debt, Client), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.ledger.lock_party(&mut *tx, PartyKind::Client, client_id).await? {
            return Err(AppError::NotFound("client_not_found"));
        }

        let debt = self.repo
            .update_debt(&mut *tx, client_id, debt_id, patch.amount, patch.status, patch.recorded_by)
            .await?
            .ok_or(AppError::NotFound("debt_not_found"))?;

        self.ledger.recompute(&mut *tx, PartyKind::Client, client_id).await?;

        let client = self.repo
            .find_by_id(&mut *tx, client_id)
            .await?
            .ok_or(AppError::NotFound("client_not_found"))?;

        tx.commit().await?;
        Ok((debt, client))
    }

    /// Marca o lançamento como apagado. O saldo do cliente fica como está.
    pub async fn void_debt(&self, client_id: i64, debt_id: i64) -> Result<Debt, AppError> {
        self.repo
            .void_debt(client_id, debt_id)
            .await?
            .ok_or(AppError::NotFound("debt_not_found"))
    }
}

// Precisam de um Postgres (DATABASE_URL): cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LedgerRepository;

    fn service(pool: PgPool) -> ClientService {
        ClientService::new(
            ClientRepository::new(pool.clone()),
            LedgerService::new(LedgerRepository::new()),
            pool,
        )
    }

    fn new_client(debt: i64) -> NewClient<'static> {
        NewClient {
            name: "Aziz",
            info: "Chorsu bozori",
            phone: "+998901234567",
            image: None,
            debt: Decimal::from(debt),
            recorded_by: "admin",
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn opening_debt_then_payment_is_recomputed(pool: PgPool) {
        let service = service(pool);
        let client = service.create(new_client(100_000)).await.unwrap();
        assert_eq!(client.debt, Decimal::from(100_000));

        service
            .change_debt(client.id, Decimal::from(30_000), LedgerStatus::Berdi, "admin")
            .await
            .unwrap();

        let detail = service.detail(client.id).await.unwrap();
        assert_eq!(detail.client.debt, Decimal::from(70_000));
        assert_eq!(detail.debts.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn editing_an_old_entry_rewrites_the_balance(pool: PgPool) {
        let service = service(pool);
        let client = service.create(new_client(50_000)).await.unwrap();
        let payment = service
            .change_debt(client.id, Decimal::from(20_000), LedgerStatus::Berdi, "admin")
            .await
            .unwrap();

        let patch = DebtPatch { status: Some(LedgerStatus::Oldi), ..Default::default() };
        let (_, client) = service.update_debt(client.id, payment.id, patch).await.unwrap();
        assert_eq!(client.debt, Decimal::from(70_000));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn voiding_keeps_the_stored_balance(pool: PgPool) {
        let service = service(pool);
        let client = service.create(new_client(100_000)).await.unwrap();
        let payment = service
            .change_debt(client.id, Decimal::from(30_000), LedgerStatus::Berdi, "admin")
            .await
            .unwrap();

        service.void_debt(client.id, payment.id).await.unwrap();
        let detail = service.detail(client.id).await.unwrap();
        assert_eq!(detail.client.debt, Decimal::from(70_000));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn unknown_client_is_not_found(pool: PgPool) {
        let err = service(pool)
            .change_debt(9_999, Decimal::from(1), LedgerStatus::Oldi, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("client_not_found")));
    }
}
