// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{not_blank, within_amount_limit},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::sales::{Optom, OptomDetail, ProductOption, SaleType, SaleUnit},
    services::sale_service::{NewOptom, NewSaleItem, OptomPatch, SaleItemPatch},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OptomFilter {
    pub q: Option<String>,
    pub sale_type: Option<SaleType>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductSearch {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleItemPayload {
    pub product_id: Option<i64>,

    // Obrigatório quando não há produto vinculado
    #[validate(length(max = 255, message = "too_long"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "min_one"), custom(function = "within_amount_limit"))]
    #[schema(example = 10)]
    pub quantity: i64,

    pub unit: SaleUnit,

    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptomPayload {
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub name: String,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    #[schema(example = "+998901112233")]
    pub phone: String,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub address: String,

    #[serde(default)]
    pub sale_type: SaleType,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub created_by: String,

    #[validate(length(min = 1, message = "empty_items"), nested)]
    pub items: Vec<SaleItemPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaleItemPatchPayload {
    pub id: i64,
    #[validate(range(min = 1, message = "min_one"), custom(function = "within_amount_limit"))]
    pub quantity: Option<i64>,
    pub unit: Option<SaleUnit>,
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOptomPayload {
    #[validate(length(min = 1, max = 255, message = "too_long"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "too_long"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 255, message = "too_long"))]
    pub address: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub sale_items: Vec<SaleItemPatchPayload>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// GET /api/optomchilar
#[utoipa::path(
    get,
    path = "/api/optomchilar",
    tag = "Optomchilar",
    params(OptomFilter),
    responses((status = 200, description = "Compradores do tipo pedido", body = Vec<Optom>)),
    security(("api_jwt" = []))
)]
pub async fn list_optoms(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<OptomFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let optoms = app_state.sale_service
        .list(filter.q.as_deref(), filter.sale_type.unwrap_or_default())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(optoms)))
}

// POST /api/optomchilar
#[utoipa::path(
    post,
    path = "/api/optomchilar",
    tag = "Optomchilar",
    request_body = CreateOptomPayload,
    responses(
        (status = 201, description = "Comprador, venda e itens criados"),
        (status = 422, description = "Telefone repetido, produto inexistente ou dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_optom(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateOptomPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let items: Vec<NewSaleItem> = payload.items
        .iter()
        .map(|item| NewSaleItem {
            product_id: item.product_id,
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit,
            price: item.price,
        })
        .collect();

    let created = app_state.sale_service
        .create(
            NewOptom {
                name: &payload.name,
                phone: &payload.phone,
                address: &payload.address,
                sale_type: payload.sale_type,
                created_by: &payload.created_by,
            },
            &items,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "optomchi": created.optom,
            "sale": created.sale,
            "sale_items": created.sale_items,
        })),
    ))
}

// GET /api/optomchilar/products
#[utoipa::path(
    get,
    path = "/api/optomchilar/products",
    tag = "Optomchilar",
    params(ProductSearch),
    responses((status = 200, description = "Produtos para o formulário de venda", body = Vec<ProductOption>)),
    security(("api_jwt" = []))
)]
pub async fn product_options(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(search): Query<ProductSearch>,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state.sale_service
        .product_options(search.q.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(products)))
}

// GET /api/optomchilar/{id}
#[utoipa::path(
    get,
    path = "/api/optomchilar/{id}",
    tag = "Optomchilar",
    params(("id" = i64, Path, description = "ID do comprador")),
    responses(
        (status = 200, description = "Comprador com vendas e itens", body = OptomDetail),
        (status = 404, description = "Comprador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_optom(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let optom = app_state.sale_service
        .detail(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "status": "success", "optomchi": optom }))))
}

// PUT /api/optomchilar/{id}
#[utoipa::path(
    put,
    path = "/api/optomchilar/{id}",
    tag = "Optomchilar",
    params(("id" = i64, Path, description = "ID do comprador")),
    request_body = UpdateOptomPayload,
    responses(
        (status = 200, description = "Comprador atualizado e totais refeitos", body = OptomDetail),
        (status = 404, description = "Comprador ou item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_optom(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOptomPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let patches: Vec<SaleItemPatch> = payload.sale_items
        .iter()
        .map(|item| SaleItemPatch {
            id: item.id,
            quantity: item.quantity,
            unit: item.unit,
            price: item.price,
        })
        .collect();

    let optom = app_state.sale_service
        .update(
            id,
            OptomPatch {
                name: payload.name.as_deref(),
                phone: payload.phone.as_deref(),
                address: payload.address.as_deref(),
            },
            &patches,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "status": "success", "optomchi": optom }))))
}

// DELETE /api/optomchilar/{id}
#[utoipa::path(
    delete,
    path = "/api/optomchilar/{id}",
    tag = "Optomchilar",
    params(("id" = i64, Path, description = "ID do comprador")),
    responses(
        (status = 200, description = "Comprador removido com vendas e itens"),
        (status = 404, description = "Comprador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_optom(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.sale_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "optomchi_deleted");
    Ok((StatusCode::OK, Json(json!({ "status": "success", "message": message }))))
}

// DELETE /api/optomchilar/sale-items/{item_id}
#[utoipa::path(
    delete,
    path = "/api/optomchilar/sale-items/{item_id}",
    tag = "Optomchilar",
    params(("item_id" = i64, Path, description = "ID do item da venda")),
    responses(
        (status = 200, description = "Item removido, devolve o novo total da venda"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let new_total_sum = app_state.sale_service
        .delete_item(item_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "sale_item_deleted");
    Ok((
        StatusCode::OK,
        Json(json!({ "status": "success", "message": message, "new_total_sum": new_total_sum })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_needs_at_least_one_item_with_positive_quantity() {
        let empty: CreateOptomPayload = serde_json::from_value(json!({
            "name": "Bobur", "phone": "+998901112233", "address": "Chilonzor",
            "created_by": "admin", "items": []
        }))
        .unwrap();
        assert!(empty.validate().unwrap_err().field_errors().contains_key("items"));

        let zero_qty: CreateOptomPayload = serde_json::from_value(json!({
            "name": "Bobur", "phone": "+998901112233", "address": "Chilonzor",
            "created_by": "admin",
            "items": [{ "name": "Suv", "quantity": 0, "unit": "dona", "price": 3000 }]
        }))
        .unwrap();
        assert!(zero_qty.validate().is_err());
    }

    #[test]
    fn oversized_quantity_and_price_are_rejected() {
        let item: SaleItemPayload = serde_json::from_value(json!({
            "name": "Suv", "quantity": 4_000_000_000_000i64, "unit": "dona", "price": 4_000_000_000_000i64
        }))
        .unwrap();
        let errors = item.validate().unwrap_err();
        assert_eq!(errors.field_errors()["quantity"][0].code, "too_large");
        assert_eq!(errors.field_errors()["price"][0].code, "too_large");
    }

    #[test]
    fn sale_type_defaults_to_optom() {
        let payload: CreateOptomPayload = serde_json::from_value(json!({
            "name": "Bobur", "phone": "+998901112233", "address": "Chilonzor",
            "created_by": "admin",
            "items": [{ "product_id": 7, "quantity": 10, "unit": "dona" }]
        }))
        .unwrap();
        assert_eq!(payload.sale_type, SaleType::Optom);
        assert!(payload.validate().is_ok());
    }
}
