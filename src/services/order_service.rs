// src/services/order_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageQuery},
    },
    db::{order_repo::ProductNumbers, FirmRepository, OrderRepository},
    models::{
        orders::{Order, OrderDetail, Product},
        sales::{SaleType, SaleUnit},
    },
};

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    firm_repo: FirmRepository,
    pool: PgPool,
}

impl OrderService {
    pub fn new(repo: OrderRepository, firm_repo: FirmRepository, pool: PgPool) -> Self {
        Self { repo, firm_repo, pool }
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn list(&self, day: Option<NaiveDate>, page: &PageQuery) -> Result<Page<Order>, AppError> {
        let (orders, total) = self.repo.list(day, page).await?;
        Ok(Page::new(orders, page, total))
    }

    pub async fn detail(&self, id: i64) -> Result<OrderDetail, AppError> {
        let order = self.repo
            .find_active(id)
            .await?
            .ok_or(AppError::NotFound("order_not_found"))?;
        let products = self.repo.products_of_order(id).await?;
        Ok(OrderDetail { order, products })
    }

    pub async fn create(&self, firm_id: i64, day: NaiveDate, recorded_by: &str) -> Result<Order, AppError> {
        // A firma precisa existir (e não estar apagada)
        if self.firm_repo.find_active(&self.pool, firm_id).await?.is_none() {
            return Err(AppError::field("firm_id", "unknown_firm"));
        }
        self.repo.create(firm_id, day, recorded_by).await
    }

    pub async fn update(
        &self,
        id: i64,
        day: Option<NaiveDate>,
        recorded_by: Option<&str>,
    ) -> Result<Order, AppError> {
        self.repo
            .update(id, day, recorded_by)
            .await?
            .ok_or(AppError::NotFound("order_not_found"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::NotFound("order_not_found"));
        }
        Ok(())
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products(&self, name: Option<&str>) -> Result<Vec<Product>, AppError> {
        self.repo.list_products(name).await
    }

    pub async fn product(&self, id: i64) -> Result<Product, AppError> {
        self.repo
            .find_product(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("product_not_found"))
    }

    pub async fn create_product(
        &self,
        order_id: i64,
        name: &str,
        numbers: &ProductNumbers,
    ) -> Result<Product, AppError> {
        if !self.repo.exists(order_id).await? {
            return Err(AppError::field("order_id", "unknown_order"));
        }
        self.repo.create_product(order_id, name, numbers).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        order_id: Option<i64>,
        name: Option<&str>,
        numbers: &ProductNumbers,
    ) -> Result<Product, AppError> {
        if let Some(order_id) = order_id {
            if !self.repo.exists(order_id).await? {
                return Err(AppError::field("order_id", "unknown_order"));
            }
        }
        self.repo
            .update_product(id, order_id, name, numbers)
            .await?
            .ok_or(AppError::NotFound("product_not_found"))
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_product(id).await? {
            return Err(AppError::NotFound("product_not_found"));
        }
        Ok(())
    }

    /// Preço de venda do produto para o par (tipo de venda, unidade).
    pub async fn price(&self, id: i64, sale_type: SaleType, unit: SaleUnit) -> Result<i64, AppError> {
        let product = self.product(id).await?;
        Ok(product.price_for(sale_type, unit))
    }
}
