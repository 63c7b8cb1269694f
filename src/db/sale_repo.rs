// src/db/sale_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::sales::{Optom, ProductOption, Sale, SaleItem, SaleType, SaleUnit},
};

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  COMPRADORES (OPTOMCHILAR)
    // =========================================================================

    pub async fn list_optoms(
        &self,
        search: Option<&str>,
        sale_type: SaleType,
    ) -> Result<Vec<Optom>, AppError> {
        let optoms = sqlx::query_as::<_, Optom>(
            r#"
            SELECT * FROM optoms
            WHERE sale_type = $1
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY id ASC
            "#,
        )
        .bind(sale_type)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;
        Ok(optoms)
    }

    pub async fn find_optom<'e, E>(&self, executor: E, id: i64) -> Result<Option<Optom>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let optom = sqlx::query_as::<_, Optom>("SELECT * FROM optoms WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(optom)
    }

    // O telefone é único entre compradores (ignorando o próprio registro na edição)
    pub async fn phone_taken<'e, E>(
        &self,
        executor: E,
        phone: &str,
        except_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM optoms WHERE phone = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(phone)
        .bind(except_id)
        .fetch_optional(executor)
        .await?;
        Ok(found.is_some())
    }

    pub async fn create_optom<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: &str,
        address: &str,
        sale_type: SaleType,
        created_by: &str,
    ) -> Result<Optom, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let optom = sqlx::query_as::<_, Optom>(
            r#"
            INSERT INTO optoms (name, phone, address, sale_type, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(address)
        .bind(sale_type)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(optom)
    }

    pub async fn update_optom<'e, E>(
        &self,
        executor: E,
        id: i64,
        name: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Optom, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let optom = sqlx::query_as::<_, Optom>(
            r#"
            UPDATE optoms SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(address)
        .fetch_one(executor)
        .await?;
        Ok(optom)
    }

    // sales e sale_items caem junto (ON DELETE CASCADE)
    pub async fn delete_optom(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM optoms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  VENDAS E ITENS
    // =========================================================================

    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        optom_id: i64,
        created_by: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            "INSERT INTO sales (optom_id, created_by) VALUES ($1, $2) RETURNING *",
        )
        .bind(optom_id)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    pub async fn sales_of_optom(&self, optom_id: i64) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE optom_id = $1 ORDER BY id ASC",
        )
        .bind(optom_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    pub async fn items_of_sales(&self, sale_ids: &[i64]) -> Result<Vec<SaleItem>, AppError> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ANY($1) ORDER BY id ASC",
        )
        .bind(sale_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn items_of_sale<'e, E>(&self, executor: E, sale_id: i64) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = $1 ORDER BY id ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: i64,
        product_id: Option<i64>,
        name: Option<&str>,
        quantity: i64,
        unit: SaleUnit,
        price: i64,
        subtotal: i64,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, name, quantity, unit, price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(name)
        .bind(quantity)
        .bind(unit)
        .bind(price)
        .bind(subtotal)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn lock_item<'e, E>(&self, executor: E, item_id: i64) -> Result<Option<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE id = $1 FOR UPDATE",
        )
        .bind(item_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    // Trava a venda inteira enquanto o total é recalculado
    pub async fn lock_sale<'e, E>(&self, executor: E, sale_id: i64) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(sale_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        quantity: i64,
        unit: SaleUnit,
        price: i64,
        subtotal: i64,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            UPDATE sale_items SET
                quantity = $2, unit = $3, price = $4, subtotal = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .bind(unit)
        .bind(price)
        .bind(subtotal)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, item_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM sale_items WHERE id = $1")
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_total<'e, E>(&self, executor: E, sale_id: i64, total: i64) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            "UPDATE sales SET total_sum = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(sale_id)
        .bind(total)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    // =========================================================================
    //  PRODUTOS (seleção no formulário de venda)
    // =========================================================================

    pub async fn product_options(&self, search: Option<&str>) -> Result<Vec<ProductOption>, AppError> {
        let products = sqlx::query_as::<_, ProductOption>(
            r#"
            SELECT id, name FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC
            "#,
        )
        .bind(search)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}
