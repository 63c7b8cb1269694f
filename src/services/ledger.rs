// src/services/ledger.rs

use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::LedgerRepository,
    models::ledger::LedgerLine,
};

/// As duas entidades que carregam um saldo derivado de um livro de lançamentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyKind {
    Client,
    Firm,
}

impl PartyKind {
    pub fn parent_table(self) -> &'static str {
        match self {
            PartyKind::Client => "clients",
            PartyKind::Firm => "firms",
        }
    }

    pub fn entries_table(self) -> &'static str {
        match self {
            PartyKind::Client => "debts",
            PartyKind::Firm => "firm_debts",
        }
    }

    pub fn owner_column(self) -> &'static str {
        match self {
            PartyKind::Client => "client_id",
            PartyKind::Firm => "firm_id",
        }
    }

    // firm_debts não tem coluna is_deleted
    pub fn supports_soft_delete(self) -> bool {
        matches!(self, PartyKind::Client)
    }
}

/// Σ amount para "oldi", −amount para "berdi".
pub fn signed_total<'a>(lines: impl IntoIterator<Item = &'a LedgerLine>) -> Decimal {
    lines
        .into_iter()
        .map(|line| line.amount * line.status.sign())
        .sum()
}

#[derive(Clone)]
pub struct LedgerService {
    repo: LedgerRepository,
}

impl LedgerService {
    pub fn new(repo: LedgerRepository) -> Self {
        Self { repo }
    }

    /// Trava a linha da parte até o fim da transação.
    /// Escritores concorrentes no mesmo livro ficam em fila aqui.
    pub async fn lock_party(
        &self,
        conn: &mut PgConnection,
        kind: PartyKind,
        party_id: i64,
    ) -> Result<bool, AppError> {
        self.repo.lock_party(&mut *conn, kind, party_id).await
    }

    /// Recalcula o saldo inteiro a partir do histórico e sobrescreve o campo `debt`.
    ///
    /// Deve rodar na mesma transação do lançamento que disparou o recálculo.
    /// Se a parte não existir mais, o recálculo é ignorado e devolve `None`.
    pub async fn recompute(
        &self,
        conn: &mut PgConnection,
        kind: PartyKind,
        party_id: i64,
    ) -> Result<Option<Decimal>, AppError> {
        if !self.repo.lock_party(&mut *conn, kind, party_id).await? {
            tracing::warn!(
                "Recálculo ignorado: {} {} não encontrado",
                kind.parent_table(),
                party_id
            );
            return Ok(None);
        }

        let lines = self.repo.active_lines(&mut *conn, kind, party_id).await?;
        let balance = signed_total(&lines);

        self.repo.set_balance(&mut *conn, kind, party_id, balance).await?;

        tracing::debug!(
            "Saldo de {} {} recalculado: {} ({} lançamentos)",
            kind.parent_table(),
            party_id,
            balance,
            lines.len()
        );

        Ok(Some(balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ledger::LedgerStatus::{Berdi, Oldi};

    fn line(amount: i64, status: crate::models::ledger::LedgerStatus) -> LedgerLine {
        LedgerLine { amount: Decimal::from(amount), status }
    }

    #[test]
    fn empty_ledger_is_zero() {
        assert_eq!(signed_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn opening_debt_then_payment() {
        // Cliente criado com dívida 100000 ("oldi") e depois paga 30000 ("berdi")
        let mut lines = vec![line(100_000, Oldi)];
        assert_eq!(signed_total(&lines), Decimal::from(100_000));

        lines.push(line(30_000, Berdi));
        assert_eq!(signed_total(&lines), Decimal::from(70_000));
    }

    #[test]
    fn full_recompute_reflects_edited_history() {
        let mut lines = vec![line(50_000, Oldi), line(20_000, Berdi), line(5_000, Oldi)];
        assert_eq!(signed_total(&lines), Decimal::from(35_000));

        // Correção manual de um lançamento antigo
        lines[1] = line(20_000, Oldi);
        assert_eq!(signed_total(&lines), Decimal::from(75_000));
    }

    #[test]
    fn balance_may_go_negative_when_overpaid() {
        let lines = [line(10_000, Oldi), line(12_500, Berdi)];
        assert_eq!(signed_total(&lines), Decimal::from(-2_500));
    }

    #[test]
    fn fractional_amounts_sum_exactly() {
        let lines = [
            LedgerLine { amount: Decimal::new(1010, 2), status: Oldi },
            LedgerLine { amount: Decimal::new(2020, 2), status: Oldi },
            LedgerLine { amount: Decimal::new(30, 2), status: Berdi },
        ];
        assert_eq!(signed_total(&lines), Decimal::new(3000, 2));
    }

    #[test]
    fn only_client_entries_support_soft_delete() {
        assert!(PartyKind::Client.supports_soft_delete());
        assert!(!PartyKind::Firm.supports_soft_delete());
        assert_eq!(PartyKind::Firm.entries_table(), "firm_debts");
        assert_eq!(PartyKind::Client.owner_column(), "client_id");
    }
}
