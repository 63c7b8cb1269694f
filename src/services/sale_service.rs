// src/services/sale_service.rs

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{OrderRepository, SaleRepository},
    models::{
        orders::Product,
        sales::{
            line_subtotal, sale_total, Optom, OptomDetail, ProductOption, Sale, SaleItem,
            SaleType, SaleUnit, SaleWithItems,
        },
    },
};

#[derive(Debug)]
pub struct NewOptom<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub sale_type: SaleType,
    pub created_by: &'a str,
}

#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Option<i64>,
    pub name: Option<String>,
    pub quantity: i64,
    pub unit: SaleUnit,
    pub price: Option<i64>,
}

#[derive(Debug, Default)]
pub struct OptomPatch<'a> {
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct SaleItemPatch {
    pub id: i64,
    pub quantity: Option<i64>,
    pub unit: Option<SaleUnit>,
    pub price: Option<i64>,
}

// Resultado da criação: comprador, venda e itens
#[derive(Debug)]
pub struct CreatedSale {
    pub optom: Optom,
    pub sale: Sale,
    pub sale_items: Vec<SaleItem>,
}

/// Preço unitário de uma linha: com produto vinculado vem da tabela de preços,
/// sem produto vale o preço enviado.
pub fn line_price(
    product: Option<&Product>,
    sale_type: SaleType,
    unit: SaleUnit,
    submitted: Option<i64>,
) -> Option<i64> {
    match product {
        Some(product) => Some(product.price_for(sale_type, unit)),
        None => submitted,
    }
}

#[derive(Clone)]
pub struct SaleService {
    repo: SaleRepository,
    order_repo: OrderRepository,
    pool: PgPool,
}

impl SaleService {
    pub fn new(repo: SaleRepository, order_repo: OrderRepository, pool: PgPool) -> Self {
        Self { repo, order_repo, pool }
    }

    pub async fn list(&self, search: Option<&str>, sale_type: SaleType) -> Result<Vec<Optom>, AppError> {
        self.repo.list_optoms(search, sale_type).await
    }

    pub async fn product_options(&self, search: Option<&str>) -> Result<Vec<ProductOption>, AppError> {
        self.repo.product_options(search).await
    }

    pub async fn detail(&self, id: i64) -> Result<OptomDetail, AppError> {
        let optom = self.repo
            .find_optom(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("optomchi_not_found"))?;

        let sales = self.repo.sales_of_optom(id).await?;
        let sale_ids: Vec<i64> = sales.iter().map(|s| s.id).collect();
        let items = self.repo.items_of_sales(&sale_ids).await?;

        let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id).or_default().push(item);
        }

        let sales = sales
            .into_iter()
            .map(|sale| {
                let sale_items = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, sale_items }
            })
            .collect();

        Ok(OptomDetail { optom, sales })
    }

    /// Cria comprador, venda e itens numa única transação.
    /// `total_sum` é sempre a soma exata dos subtotais.
    pub async fn create(&self, new: NewOptom<'_>, items: &[NewSaleItem]) -> Result<CreatedSale, AppError> {
        if items.is_empty() {
            return Err(AppError::field("items", "empty_items"));
        }

        let mut tx = self.pool.begin().await?;

        if self.repo.phone_taken(&mut *tx, new.phone, None).await? {
            return Err(AppError::field("phone", "phone_taken"));
        }

        let optom = self.repo
            .create_optom(&mut *tx, new.name, new.phone, new.address, new.sale_type, new.created_by)
            .await
            .map_err(phone_conflict)?;

        let sale = self.repo.create_sale(&mut *tx, optom.id, new.created_by).await?;

        let mut sale_items = Vec::with_capacity(items.len());
        for item in items {
            let product = match item.product_id {
                Some(product_id) => Some(
                    self.order_repo
                        .find_product(&mut *tx, product_id)
                        .await?
                        .ok_or_else(|| AppError::field("items", "unknown_product"))?,
                ),
                None => None,
            };

            if product.is_none() && item.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                return Err(AppError::field("items", "name_required_without_product"));
            }

            let price = line_price(product.as_ref(), new.sale_type, item.unit, item.price)
                .ok_or_else(|| AppError::field("items", "required"))?;
            let subtotal = line_subtotal(item.quantity, price).ok_or_else(too_large)?;

            let saved = self.repo
                .insert_item(
                    &mut *tx,
                    sale.id,
                    item.product_id,
                    item.name.as_deref(),
                    item.quantity,
                    item.unit,
                    price,
                    subtotal,
                )
                .await?;
            sale_items.push(saved);
        }

        let total = sale_total(&sale_items).ok_or_else(too_large)?;
        let sale = self.repo.set_total(&mut *tx, sale.id, total).await?;
        tx.commit().await?;

        tracing::info!(
            "🛒 Venda {} registrada para o comprador {} ({} itens, total {})",
            sale.id,
            optom.id,
            sale_items.len(),
            sale.total_sum
        );

        Ok(CreatedSale { optom, sale, sale_items })
    }

    /// Atualiza o cadastro e os itens indicados; cada venda tocada tem o total refeito.
    pub async fn update(
        &self,
        id: i64,
        patch: OptomPatch<'_>,
        item_patches: &[SaleItemPatch],
    ) -> Result<OptomDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let optom = self.repo
            .find_optom(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("optomchi_not_found"))?;

        if let Some(phone) = patch.phone {
            if self.repo.phone_taken(&mut *tx, phone, Some(id)).await? {
                return Err(AppError::field("phone", "phone_taken"));
            }
        }

        let optom = self.repo
            .update_optom(&mut *tx, id, patch.name, patch.phone, patch.address)
            .await
            .map_err(phone_conflict)?;

        let mut touched_sales = BTreeSet::new();
        for item_patch in item_patches {
            let item = self.repo
                .lock_item(&mut *tx, item_patch.id)
                .await?
                .ok_or(AppError::NotFound("sale_item_not_found"))?;

            let Some(sale) = self.repo.lock_sale(&mut *tx, item.sale_id).await? else {
                continue;
            };
            // Item de outro comprador: ignorado
            if sale.optom_id != optom.id {
                tracing::debug!("Item {} não pertence ao comprador {}", item.id, optom.id);
                continue;
            }

            let product = match item.product_id {
                Some(product_id) => self.order_repo.find_product(&mut *tx, product_id).await?,
                None => None,
            };

            let quantity = item_patch.quantity.unwrap_or(item.quantity);
            let unit = item_patch.unit.unwrap_or(item.unit);
            let price = line_price(product.as_ref(), optom.sale_type, unit, item_patch.price)
                .unwrap_or(item.price);

            let subtotal = line_subtotal(quantity, price).ok_or_else(too_large)?;
            self.repo
                .update_item(&mut *tx, item.id, quantity, unit, price, subtotal)
                .await?;
            touched_sales.insert(sale.id);
        }

        for sale_id in touched_sales {
            self.refresh_total(&mut tx, sale_id).await?;
        }

        tx.commit().await?;
        self.detail(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_optom(id).await? {
            return Err(AppError::NotFound("optomchi_not_found"));
        }
        Ok(())
    }

    /// Remove um item e devolve o novo total da venda.
    pub async fn delete_item(&self, item_id: i64) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let item = self.repo
            .lock_item(&mut *tx, item_id)
            .await?
            .ok_or(AppError::NotFound("sale_item_not_found"))?;

        self.repo.lock_sale(&mut *tx, item.sale_id).await?;
        self.repo.delete_item(&mut *tx, item.id).await?;
        let sale = self.refresh_total(&mut tx, item.sale_id).await?;

        tx.commit().await?;
        Ok(sale.total_sum)
    }

    async fn refresh_total(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        sale_id: i64,
    ) -> Result<Sale, AppError> {
        let items = self.repo.items_of_sale(&mut **tx, sale_id).await?;
        let total = sale_total(&items).ok_or_else(too_large)?;
        self.repo.set_total(&mut **tx, sale_id, total).await
    }
}

fn too_large() -> AppError {
    AppError::field("items", "too_large")
}

// A corrida entre a checagem e o INSERT cai na constraint UNIQUE
fn phone_conflict(err: AppError) -> AppError {
    match &err {
        AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            AppError::field("phone", "phone_taken")
        }
        _ => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::tests::sample_product;

    #[test]
    fn linked_product_price_wins_over_submitted_price() {
        let product = sample_product();
        assert_eq!(
            line_price(Some(&product), SaleType::Optom, SaleUnit::Blok, Some(1)),
            Some(62_000)
        );
        assert_eq!(
            line_price(Some(&product), SaleType::Toychi, SaleUnit::Dona, None),
            Some(11_000)
        );
    }

    #[test]
    fn free_line_uses_submitted_price() {
        assert_eq!(line_price(None, SaleType::Optom, SaleUnit::Dona, Some(4_000)), Some(4_000));
        assert_eq!(line_price(None, SaleType::Optom, SaleUnit::Dona, None), None);
    }

    #[test]
    fn two_line_sale_totals_exactly() {
        // Quantidades 10 e 5, preços vindos da coluna de atacado
        let product = sample_product();
        let a = line_subtotal(10, line_price(Some(&product), SaleType::Optom, SaleUnit::Dona, None).unwrap()).unwrap();
        let b = line_subtotal(5, line_price(Some(&product), SaleType::Optom, SaleUnit::Blok, None).unwrap()).unwrap();
        assert_eq!(a, 105_000);
        assert_eq!(b, 310_000);
        assert_eq!(a + b, 415_000);
    }

    #[test]
    fn unique_violation_is_not_confused_with_other_errors() {
        let err = phone_conflict(AppError::NotFound("optomchi_not_found"));
        assert!(matches!(err, AppError::NotFound(_)));
    }

    fn free_line(name: &str, quantity: i64, price: i64) -> NewSaleItem {
        NewSaleItem {
            product_id: None,
            name: Some(name.to_string()),
            quantity,
            unit: SaleUnit::Dona,
            price: Some(price),
        }
    }

    fn buyer(phone: &str) -> NewOptom<'_> {
        NewOptom {
            name: "Jasur",
            phone,
            address: "Samarqand",
            sale_type: SaleType::Optom,
            created_by: "admin",
        }
    }

    // Precisa de um Postgres (DATABASE_URL): cargo test -- --ignored
    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn sale_total_follows_its_items(pool: PgPool) {
        let service = SaleService::new(
            SaleRepository::new(pool.clone()),
            OrderRepository::new(pool.clone()),
            pool,
        );

        let items = [free_line("Choy", 10, 10_500), free_line("Shakar", 5, 62_000)];
        let created = service.create(buyer("+998901112233"), &items).await.unwrap();
        assert_eq!(created.sale.total_sum, 415_000);

        let err = service.create(buyer("+998901112233"), &items).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let new_total = service.delete_item(created.sale_items[0].id).await.unwrap();
        assert_eq!(new_total, 310_000);
    }
}
