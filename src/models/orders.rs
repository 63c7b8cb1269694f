// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::sales::{SaleType, SaleUnit};

// Pedido de compra feito a uma firma
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub firm_id: i64,
    #[schema(value_type = String, format = Date, example = "2025-07-28")]
    pub day: NaiveDate,
    pub recorded_by: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Produto recebido num pedido, com os preços de compra e de venda.
///
/// Os nomes no JSON são os que o frontend já usa.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub order_id: i64,
    pub name: String,

    #[serde(rename = "karobkadagi_soni")]
    pub units_per_box: i64,
    #[serde(rename = "necha_karobka_kelgani")]
    pub boxes_received: i64,

    #[serde(rename = "kelgan_narxi_dona")]
    pub purchase_price_unit: i64,
    #[serde(rename = "kelgan_narxi_blok")]
    pub purchase_price_block: i64,

    #[serde(rename = "sotish_narxi_dona")]
    pub retail_price_unit: i64,
    #[serde(rename = "sotish_narxi_blok")]
    pub retail_price_block: i64,

    #[serde(rename = "sotish_narxi_optom_dona")]
    pub wholesale_price_unit: i64,
    #[serde(rename = "sotish_narxi_optom_blok")]
    pub wholesale_price_block: i64,

    #[serde(rename = "sotish_narxi_toyga_dona")]
    pub wedding_price_unit: i64,
    #[serde(rename = "sotish_narxi_toyga_blok")]
    pub wedding_price_block: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// As quatro colunas de preço que uma venda pode usar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    WholesaleUnit,
    WholesaleBlock,
    WeddingUnit,
    WeddingBlock,
}

impl PriceField {
    // Tabela (tipo de venda, unidade) -> coluna de preço
    pub fn for_sale(sale_type: SaleType, unit: SaleUnit) -> Self {
        match (sale_type, unit) {
            (SaleType::Optom, SaleUnit::Dona) => PriceField::WholesaleUnit,
            (SaleType::Optom, SaleUnit::Blok) => PriceField::WholesaleBlock,
            (SaleType::Toychi, SaleUnit::Dona) => PriceField::WeddingUnit,
            (SaleType::Toychi, SaleUnit::Blok) => PriceField::WeddingBlock,
        }
    }
}

impl Product {
    pub fn price(&self, field: PriceField) -> i64 {
        match field {
            PriceField::WholesaleUnit => self.wholesale_price_unit,
            PriceField::WholesaleBlock => self.wholesale_price_block,
            PriceField::WeddingUnit => self.wedding_price_unit,
            PriceField::WeddingBlock => self.wedding_price_block,
        }
    }

    pub fn price_for(&self, sale_type: SaleType, unit: SaleUnit) -> i64 {
        self.price(PriceField::for_sale(sale_type, unit))
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub products: Vec<Product>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_product() -> Product {
        Product {
            id: 7,
            order_id: 1,
            name: "Pepsi 1.5L".to_string(),
            units_per_box: 6,
            boxes_received: 20,
            purchase_price_unit: 9_000,
            purchase_price_block: 54_000,
            retail_price_unit: 12_000,
            retail_price_block: 70_000,
            wholesale_price_unit: 10_500,
            wholesale_price_block: 62_000,
            wedding_price_unit: 11_000,
            wedding_price_block: 65_000,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn price_lookup_covers_every_sale_type_and_unit() {
        let p = sample_product();
        assert_eq!(p.price_for(SaleType::Optom, SaleUnit::Dona), 10_500);
        assert_eq!(p.price_for(SaleType::Optom, SaleUnit::Blok), 62_000);
        assert_eq!(p.price_for(SaleType::Toychi, SaleUnit::Dona), 11_000);
        assert_eq!(p.price_for(SaleType::Toychi, SaleUnit::Blok), 65_000);
    }

    #[test]
    fn product_serializes_with_frontend_field_names() {
        let json = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(json["karobkadagi_soni"], 6);
        assert_eq!(json["sotish_narxi_optom_blok"], 62_000);
        assert_eq!(json["sotish_narxi_toyga_dona"], 11_000);
        assert!(json.get("wholesale_price_unit").is_none());
    }
}
