// src/models/sales.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- ENUMS ---

// Mapeia o CREATE TYPE sale_type: atacado ou festa (to'y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    #[default]
    Optom,
    Toychi,
}

// Mapeia o CREATE TYPE sale_unit: unidade avulsa ou bloco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SaleUnit {
    Dona,
    Blok,
}

// --- COMPRADOR ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Optom {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub sale_type: SaleType,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- VENDA ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Sale {
    pub id: i64,
    pub optom_id: i64,
    pub created_by: Option<String>,
    // Sempre igual à soma dos subtotais dos itens
    pub total_sum: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: Option<i64>,
    // Só preenchido para itens avulsos (sem produto)
    pub name: Option<String>,
    pub quantity: i64,
    pub unit: SaleUnit,
    pub price: i64,
    pub subtotal: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub sale_items: Vec<SaleItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OptomDetail {
    #[serde(flatten)]
    pub optom: Optom,
    pub sales: Vec<SaleWithItems>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProductOption {
    pub id: i64,
    pub name: String,
}

/// `None` quando o produto estoura o i64.
pub fn line_subtotal(quantity: i64, price: i64) -> Option<i64> {
    quantity.checked_mul(price)
}

pub fn sale_total<'a>(items: impl IntoIterator<Item = &'a SaleItem>) -> Option<i64> {
    items
        .into_iter()
        .try_fold(0i64, |total, item| total.checked_add(item.subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, price: i64) -> SaleItem {
        SaleItem {
            id: 0,
            sale_id: 1,
            product_id: None,
            name: Some("Pepsi".into()),
            quantity,
            unit: SaleUnit::Dona,
            price,
            subtotal: line_subtotal(quantity, price).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn total_is_the_sum_of_line_subtotals() {
        let items = [item(3, 12_000), item(2, 7_500)];
        assert_eq!(sale_total(&items), Some(36_000 + 15_000));
    }

    #[test]
    fn empty_sale_totals_zero() {
        assert_eq!(sale_total(&[]), Some(0));
    }

    #[test]
    fn oversized_lines_and_totals_are_rejected() {
        assert_eq!(line_subtotal(4_000_000_000, 4_000_000_000), None);
        assert_eq!(line_subtotal(i64::MAX, 1), Some(i64::MAX));

        let mut huge = item(1, 1);
        huge.subtotal = i64::MAX;
        assert_eq!(sale_total(&[huge.clone(), item(1, 1)]), None);
        assert_eq!(sale_total(&[huge]), Some(i64::MAX));
    }

    #[test]
    fn sale_type_defaults_to_optom_and_uses_lowercase_names() {
        assert_eq!(SaleType::default(), SaleType::Optom);
        assert_eq!(serde_json::to_value(SaleType::Toychi).unwrap(), "toychi");
        let unit: SaleUnit = serde_json::from_str("\"blok\"").unwrap();
        assert_eq!(unit, SaleUnit::Blok);
    }
}
