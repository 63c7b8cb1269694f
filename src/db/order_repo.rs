// src/db/order_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{error::AppError, pagination::PageQuery},
    models::orders::{Order, Product},
};

// Todas as colunas de quantidade/preço de um produto, na ordem das colunas
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductNumbers {
    pub units_per_box: Option<i64>,
    pub boxes_received: Option<i64>,
    pub purchase_price_unit: Option<i64>,
    pub purchase_price_block: Option<i64>,
    pub retail_price_unit: Option<i64>,
    pub retail_price_block: Option<i64>,
    pub wholesale_price_unit: Option<i64>,
    pub wholesale_price_block: Option<i64>,
    pub wedding_price_unit: Option<i64>,
    pub wedding_price_block: Option<i64>,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn list(
        &self,
        day: Option<NaiveDate>,
        page: &PageQuery,
    ) -> Result<(Vec<Order>, i64), AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE is_deleted = FALSE
              AND ($1::DATE IS NULL OR day = $1)
            ORDER BY day DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(day)
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE is_deleted = FALSE AND ($1::DATE IS NULL OR day = $1)",
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok((orders, total))
    }

    pub async fn find_active(&self, id: i64) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn create(
        &self,
        firm_id: i64,
        day: NaiveDate,
        recorded_by: &str,
    ) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (firm_id, day, recorded_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(firm_id)
        .bind(day)
        .bind(recorded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn update(
        &self,
        id: i64,
        day: Option<NaiveDate>,
        recorded_by: Option<&str>,
    ) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET
                day = COALESCE($2, day),
                recorded_by = COALESCE($3, recorded_by),
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(day)
        .bind(recorded_by)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE orders SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products(&self, name: Option<&str>) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY id ASC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn products_of_order(&self, order_id: i64) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE order_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: i64) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn create_product(
        &self,
        order_id: i64,
        name: &str,
        n: &ProductNumbers,
    ) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                order_id, name, units_per_box, boxes_received,
                purchase_price_unit, purchase_price_block,
                retail_price_unit, retail_price_block,
                wholesale_price_unit, wholesale_price_block,
                wedding_price_unit, wedding_price_block
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(name)
        .bind(n.units_per_box)
        .bind(n.boxes_received)
        .bind(n.purchase_price_unit)
        .bind(n.purchase_price_block)
        .bind(n.retail_price_unit)
        .bind(n.retail_price_block)
        .bind(n.wholesale_price_unit)
        .bind(n.wholesale_price_block)
        .bind(n.wedding_price_unit)
        .bind(n.wedding_price_block)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: i64,
        order_id: Option<i64>,
        name: Option<&str>,
        n: &ProductNumbers,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                order_id = COALESCE($2, order_id),
                name = COALESCE($3, name),
                units_per_box = COALESCE($4, units_per_box),
                boxes_received = COALESCE($5, boxes_received),
                purchase_price_unit = COALESCE($6, purchase_price_unit),
                purchase_price_block = COALESCE($7, purchase_price_block),
                retail_price_unit = COALESCE($8, retail_price_unit),
                retail_price_block = COALESCE($9, retail_price_block),
                wholesale_price_unit = COALESCE($10, wholesale_price_unit),
                wholesale_price_block = COALESCE($11, wholesale_price_block),
                wedding_price_unit = COALESCE($12, wedding_price_unit),
                wedding_price_block = COALESCE($13, wedding_price_block),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(order_id)
        .bind(name)
        .bind(n.units_per_box)
        .bind(n.boxes_received)
        .bind(n.purchase_price_unit)
        .bind(n.purchase_price_block)
        .bind(n.retail_price_unit)
        .bind(n.retail_price_block)
        .bind(n.wholesale_price_unit)
        .bind(n.wholesale_price_block)
        .bind(n.wedding_price_unit)
        .bind(n.wedding_price_block)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
