// src/common/validation.rs

use std::borrow::Borrow;

use rust_decimal::Decimal;
use validator::ValidationError;

// Validadores usados nos payloads. O código do erro é a chave de tradução.

// Teto para preços, quantidades e pagamentos (som)
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

// Teto da diária: mantém dias × diária longe do limite do i64
pub const MAX_DAILY_RATE: i64 = 1_000_000_000;

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn validate_not_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

// Diárias são múltiplos de 100 som
pub fn multiple_of_100(value: impl Borrow<i64>) -> Result<(), ValidationError> {
    if value.borrow() % 100 != 0 {
        return Err(ValidationError::new("not_multiple_of_100"));
    }
    Ok(())
}

pub fn within_amount_limit(value: impl Borrow<i64>) -> Result<(), ValidationError> {
    if *value.borrow() > MAX_AMOUNT {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

pub fn within_daily_rate_limit(value: impl Borrow<i64>) -> Result<(), ValidationError> {
    if *value.borrow() > MAX_DAILY_RATE {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

pub fn valid_daily_rate(value: impl Borrow<i64>) -> Result<(), ValidationError> {
    let value = value.borrow();
    within_daily_rate_limit(value)?;
    multiple_of_100(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_required_errors() {
        assert!(not_blank("Aziz").is_ok());
        assert_eq!(not_blank("   ").unwrap_err().code, "required");
    }

    #[test]
    fn decimals_must_not_be_negative() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(1050, 2)).is_ok());
        assert_eq!(
            validate_not_negative(&Decimal::new(-1, 0)).unwrap_err().code,
            "negative"
        );
    }

    #[test]
    fn daily_rate_granularity() {
        assert!(multiple_of_100(&50_000).is_ok());
        assert!(multiple_of_100(&0).is_ok());
        assert!(multiple_of_100(&50_050).is_err());
    }

    #[test]
    fn amounts_are_capped_at_the_limit() {
        assert!(within_amount_limit(&MAX_AMOUNT).is_ok());
        assert_eq!(within_amount_limit(&(MAX_AMOUNT + 1)).unwrap_err().code, "too_large");
        assert!(within_daily_rate_limit(&MAX_DAILY_RATE).is_ok());
        assert_eq!(within_daily_rate_limit(&i64::MAX).unwrap_err().code, "too_large");
        assert_eq!(valid_daily_rate(&(MAX_DAILY_RATE + 100)).unwrap_err().code, "too_large");
        assert_eq!(valid_daily_rate(&50_050).unwrap_err().code, "not_multiple_of_100");
    }
}
