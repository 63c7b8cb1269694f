// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{not_blank, within_amount_limit},
    },
    config::AppState,
    db::order_repo::ProductNumbers,
    middleware::i18n::Locale,
    models::{
        orders::Product,
        sales::{SaleType, SaleUnit},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub name: Option<String>,
}

// Os nomes dos campos seguem o JSON do frontend
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductPayload {
    pub order_id: i64,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    #[schema(example = "Pepsi 1.5L")]
    pub name: String,

    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub karobkadagi_soni: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub necha_karobka_kelgani: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub kelgan_narxi_dona: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub kelgan_narxi_blok: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_dona: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_blok: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_optom_dona: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_optom_blok: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_toyga_dona: i64,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_toyga_blok: i64,
}

impl CreateProductPayload {
    fn numbers(&self) -> ProductNumbers {
        ProductNumbers {
            units_per_box: Some(self.karobkadagi_soni),
            boxes_received: Some(self.necha_karobka_kelgani),
            purchase_price_unit: Some(self.kelgan_narxi_dona),
            purchase_price_block: Some(self.kelgan_narxi_blok),
            retail_price_unit: Some(self.sotish_narxi_dona),
            retail_price_block: Some(self.sotish_narxi_blok),
            wholesale_price_unit: Some(self.sotish_narxi_optom_dona),
            wholesale_price_block: Some(self.sotish_narxi_optom_blok),
            wedding_price_unit: Some(self.sotish_narxi_toyga_dona),
            wedding_price_block: Some(self.sotish_narxi_toyga_blok),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductPayload {
    pub order_id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "too_long"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub karobkadagi_soni: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub necha_karobka_kelgani: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub kelgan_narxi_dona: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub kelgan_narxi_blok: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_dona: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_blok: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_optom_dona: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_optom_blok: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_toyga_dona: Option<i64>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub sotish_narxi_toyga_blok: Option<i64>,
}

impl UpdateProductPayload {
    fn numbers(&self) -> ProductNumbers {
        ProductNumbers {
            units_per_box: self.karobkadagi_soni,
            boxes_received: self.necha_karobka_kelgani,
            purchase_price_unit: self.kelgan_narxi_dona,
            purchase_price_block: self.kelgan_narxi_blok,
            retail_price_unit: self.sotish_narxi_dona,
            retail_price_block: self.sotish_narxi_blok,
            wholesale_price_unit: self.sotish_narxi_optom_dona,
            wholesale_price_block: self.sotish_narxi_optom_blok,
            wedding_price_unit: self.sotish_narxi_toyga_dona,
            wedding_price_block: self.sotish_narxi_toyga_blok,
        }
    }
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductFilter),
    responses((status = 200, description = "Todos os produtos", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state.order_service
        .list_products(filter.name.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(products)))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado"),
        (status = 422, description = "Pedido inexistente ou dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state.order_service
        .create_product(payload.order_id, &payload.name, &payload.numbers())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success", "product": product }))))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state.order_service
        .product(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state.order_service
        .update_product(id, payload.order_id, payload.name.as_deref(), &payload.numbers())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "status": "success", "product": product }))))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.order_service
        .delete_product(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "product_deleted");
    Ok((StatusCode::OK, Json(json!({ "status": "success", "message": message }))))
}

// GET /api/products/{id}/price/{sale_type}/{unit}
#[utoipa::path(
    get,
    path = "/api/products/{id}/price/{sale_type}/{unit}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "ID do produto"),
        ("sale_type" = SaleType, Path, description = "optom ou toychi"),
        ("unit" = SaleUnit, Path, description = "dona ou blok")
    ),
    responses(
        (status = 200, description = "Preço unitário para a venda"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_price(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((id, sale_type, unit)): Path<(i64, SaleType, SaleUnit)>,
) -> Result<impl IntoResponse, ApiError> {
    let price = app_state.order_service
        .price(id, sale_type, unit)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "price": price }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_prices_are_rejected() {
        let payload: CreateProductPayload = serde_json::from_value(json!({
            "order_id": 1,
            "name": "Pepsi 1.5L",
            "karobkadagi_soni": 6,
            "necha_karobka_kelgani": 20,
            "kelgan_narxi_dona": 9000,
            "kelgan_narxi_blok": 54000,
            "sotish_narxi_dona": 12000,
            "sotish_narxi_blok": 70000,
            "sotish_narxi_optom_dona": -1,
            "sotish_narxi_optom_blok": 62000,
            "sotish_narxi_toyga_dona": 11000,
            "sotish_narxi_toyga_blok": 65000
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sotish_narxi_optom_dona"));
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn create_payload_maps_every_number_column() {
        let payload: CreateProductPayload = serde_json::from_value(json!({
            "order_id": 1, "name": "Cola",
            "karobkadagi_soni": 1, "necha_karobka_kelgani": 2,
            "kelgan_narxi_dona": 3, "kelgan_narxi_blok": 4,
            "sotish_narxi_dona": 5, "sotish_narxi_blok": 6,
            "sotish_narxi_optom_dona": 7, "sotish_narxi_optom_blok": 8,
            "sotish_narxi_toyga_dona": 9, "sotish_narxi_toyga_blok": 10
        }))
        .unwrap();
        let n = payload.numbers();
        assert_eq!(n.units_per_box, Some(1));
        assert_eq!(n.wholesale_price_block, Some(8));
        assert_eq!(n.wedding_price_block, Some(10));
    }
}
