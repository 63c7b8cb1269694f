// src/services/payroll.rs

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use crate::models::ledger::LedgerStatus;

/// Regras de acúmulo da diária: fuso civil fixo e hora de corte.
#[derive(Debug, Clone, Copy)]
pub struct PayrollPolicy {
    pub offset: FixedOffset,
    pub cutoff_hour: u32,
}

impl PayrollPolicy {
    pub fn new(utc_offset_hours: i32, cutoff_hour: u32) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("Fuso inválido: {} horas", utc_offset_hours))?;
        if cutoff_hour > 23 {
            anyhow::bail!("Hora de corte inválida: {}", cutoff_hour);
        }
        Ok(Self { offset, cutoff_hour })
    }

    pub fn local(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// Dias completos desde `start_day` + o dia de hoje, se já passou do corte.
    /// Início no futuro não acumula nada.
    pub fn days_worked(&self, start_day: NaiveDate, now: DateTime<Utc>) -> i64 {
        let local = self.local(now);
        let elapsed = (local.date_naive() - start_day).num_days();
        if elapsed < 0 {
            return 0;
        }
        let today = if local.hour() >= self.cutoff_hour { 1 } else { 0 };
        elapsed + today
    }

    /// `None` se dias × diária estoura o i64.
    pub fn accrued(&self, start_day: NaiveDate, daily_rate: i64, now: DateTime<Utc>) -> Option<i64> {
        self.days_worked(start_day, now).checked_mul(daily_rate)
    }

    /// Quanto falta até a próxima execução diária (na hora de corte local).
    pub fn until_next_sweep(&self, now: DateTime<Utc>) -> Duration {
        let local = self.local(now);
        let today_run = local
            .date_naive()
            .and_hms_opt(self.cutoff_hour, 0, 0)
            .and_then(|naive| self.offset.from_local_datetime(&naive).single());

        match today_run {
            Some(run) if run > local => run - local,
            Some(run) => run + Duration::days(1) - local,
            None => Duration::days(1),
        }
    }
}

/// "oldi" (recebeu) desconta do saldo, "berdi" credita.
pub fn apply_payment(balance: i64, amount: i64, status: LedgerStatus) -> Option<i64> {
    match status {
        LedgerStatus::Oldi => balance.checked_sub(amount),
        LedgerStatus::Berdi => balance.checked_add(amount),
    }
}

/// Saldo = diárias acumuladas + todos os pagamentos.
pub fn balance_from<I>(accrued: i64, pays: I) -> Option<i64>
where
    I: IntoIterator<Item = (i64, LedgerStatus)>,
{
    pays.into_iter()
        .try_fold(accrued, |balance, (amount, status)| apply_payment(balance, amount, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tashkent() -> PayrollPolicy {
        PayrollPolicy::new(5, 11).unwrap()
    }

    // Hora local de Tashkent (+05:00) convertida para UTC
    fn at_local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn before_cutoff_counts_only_elapsed_days() {
        let summa = tashkent().accrued(day(2025, 7, 1), 50_000, at_local(2025, 7, 5, 10, 0));
        assert_eq!(summa, Some(4 * 50_000));
    }

    #[test]
    fn after_cutoff_counts_today() {
        let summa = tashkent().accrued(day(2025, 7, 1), 50_000, at_local(2025, 7, 5, 12, 0));
        assert_eq!(summa, Some(5 * 50_000));
    }

    #[test]
    fn cutoff_is_inclusive_at_eleven_sharp() {
        let policy = tashkent();
        let start = day(2025, 7, 1);
        assert_eq!(policy.days_worked(start, at_local(2025, 7, 5, 10, 59)), 4);
        assert_eq!(policy.days_worked(start, at_local(2025, 7, 5, 11, 0)), 5);
    }

    #[test]
    fn uses_the_civil_calendar_not_utc() {
        // 2025-07-04 20:30 UTC já é 2025-07-05 01:30 em Tashkent
        let now = Utc.with_ymd_and_hms(2025, 7, 4, 20, 30, 0).unwrap();
        assert_eq!(tashkent().days_worked(day(2025, 7, 1), now), 4);
    }

    #[test]
    fn first_day_accrues_after_cutoff() {
        let policy = tashkent();
        let start = day(2025, 7, 1);
        assert_eq!(policy.accrued(start, 50_000, at_local(2025, 7, 1, 9, 0)), Some(0));
        assert_eq!(policy.accrued(start, 50_000, at_local(2025, 7, 1, 15, 0)), Some(50_000));
    }

    #[test]
    fn future_start_accrues_nothing() {
        let now = at_local(2025, 7, 1, 15, 0);
        assert_eq!(tashkent().accrued(day(2025, 7, 10), 50_000, now), Some(0));
    }

    #[test]
    fn payments_adjust_the_balance() {
        assert_eq!(apply_payment(200_000, 30_000, LedgerStatus::Oldi), Some(170_000));
        assert_eq!(apply_payment(200_000, 30_000, LedgerStatus::Berdi), Some(230_000));
    }

    #[test]
    fn balance_replays_every_payment_on_top_of_accrual() {
        let pays = [
            (100_000, LedgerStatus::Oldi),
            (20_000, LedgerStatus::Berdi),
            (50_000, LedgerStatus::Oldi),
        ];
        assert_eq!(balance_from(250_000, pays), Some(120_000));
        assert_eq!(balance_from(250_000, []), Some(250_000));
    }

    #[test]
    fn overflowing_accrual_and_payments_are_reported() {
        // 9e16 por dia desde 2000-01-01 passa do i64 em 2025
        let now = at_local(2025, 7, 5, 12, 0);
        assert_eq!(tashkent().accrued(day(2000, 1, 1), 90_000_000_000_000_000, now), None);

        assert_eq!(apply_payment(i64::MAX, 1, LedgerStatus::Berdi), None);
        assert_eq!(apply_payment(i64::MIN, 1, LedgerStatus::Oldi), None);
        assert_eq!(balance_from(0, [(i64::MAX, LedgerStatus::Berdi), (1, LedgerStatus::Berdi)]), None);
    }

    #[test]
    fn next_sweep_is_today_before_cutoff_and_tomorrow_after() {
        let policy = tashkent();
        assert_eq!(
            policy.until_next_sweep(at_local(2025, 7, 5, 9, 30)),
            Duration::minutes(90)
        );
        assert_eq!(
            policy.until_next_sweep(at_local(2025, 7, 5, 11, 0)),
            Duration::days(1)
        );
        assert_eq!(
            policy.until_next_sweep(at_local(2025, 7, 5, 23, 0)),
            Duration::hours(12)
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(PayrollPolicy::new(5, 24).is_err());
        assert!(PayrollPolicy::new(30, 11).is_err());
    }
}
