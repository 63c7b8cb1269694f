// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::PageQuery,
        validation::{validate_not_negative, not_blank},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        clients::{ClientDetail, Debt},
        ledger::LedgerStatus,
    },
    services::client_service::{ClientPatch, DebtPatch, NewClient},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientPayload {
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    #[schema(example = "Aziz")]
    pub name: String,

    #[validate(custom(function = "not_blank"))]
    pub info: String,

    #[validate(custom(function = "not_blank"), length(max = 20, message = "too_long"))]
    #[schema(example = "+998901234567")]
    pub phone: String,

    pub image: Option<String>,

    // Dívida de abertura, lançada como "oldi"
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 100000)]
    pub debt: Decimal,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub recorded_by: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClientPayload {
    #[validate(length(max = 255, message = "too_long"))]
    pub name: Option<String>,
    pub info: Option<String>,
    #[validate(length(max = 20, message = "too_long"))]
    pub phone: Option<String>,
    pub image: Option<String>,
    #[validate(length(max = 255, message = "too_long"))]
    pub recorded_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeDebtPayload {
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 30000)]
    pub amount: Decimal,

    pub status: LedgerStatus,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub recorded_by: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDebtPayload {
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub status: Option<LedgerStatus>,
    #[validate(length(max = 255, message = "too_long"))]
    pub recorded_by: Option<String>,
}

// =============================================================================
//  CLIENTES
// =============================================================================

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientFilter, PageQuery),
    responses(
        (status = 200, description = "Página de clientes")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ClientFilter>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state.client_service
        .list(
            filter.name.as_deref(),
            filter.phone.as_deref(),
            filter.is_deleted.unwrap_or(false),
            &page,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado com a dívida inicial"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state.client_service
        .create(NewClient {
            name: &payload.name,
            info: &payload.info,
            phone: &payload.phone,
            image: payload.image.as_deref(),
            debt: payload.debt,
            recorded_by: &payload.recorded_by,
        })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success", "client": client }))))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com o livro de dívidas", body = ClientDetail),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state.client_service
        .detail(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "client": client }))))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state.client_service
        .update(
            id,
            ClientPatch {
                name: payload.name.as_deref(),
                info: payload.info.as_deref(),
                phone: payload.phone.as_deref(),
                image: payload.image.as_deref(),
                recorded_by: payload.recorded_by.as_deref(),
            },
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "status": "success", "client": client }))))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente marcado como apagado"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.client_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "client_deleted");
    Ok((StatusCode::OK, Json(json!({ "status": "success", "message": message }))))
}

// =============================================================================
//  LIVRO DE DÍVIDAS
// =============================================================================

// POST /api/clients/{id}/change-debt
#[utoipa::path(
    post,
    path = "/api/clients/{id}/change-debt",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = ChangeDebtPayload,
    responses(
        (status = 201, description = "Lançamento registrado e saldo recalculado"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<ChangeDebtPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let debt: Debt = app_state.client_service
        .change_debt(id, payload.amount, payload.status, &payload.recorded_by)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success", "debt": debt }))))
}

// PUT /api/clients/{id}/debts/{debt_id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}/debts/{debt_id}",
    tag = "Clients",
    params(
        ("id" = i64, Path, description = "ID do cliente"),
        ("debt_id" = i64, Path, description = "ID do lançamento")
    ),
    request_body = UpdateDebtPayload,
    responses(
        (status = 200, description = "Lançamento corrigido e saldo recalculado"),
        (status = 404, description = "Cliente ou lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((id, debt_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateDebtPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (debt, client) = app_state.client_service
        .update_debt(
            id,
            debt_id,
            DebtPatch {
                amount: payload.amount,
                status: payload.status,
                recorded_by: payload.recorded_by.as_deref(),
            },
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "status": "success", "debt": debt, "client": client })),
    ))
}

// DELETE /api/clients/{id}/debts/{debt_id}
// O saldo do cliente não é recalculado aqui.
#[utoipa::path(
    delete,
    path = "/api/clients/{id}/debts/{debt_id}",
    tag = "Clients",
    params(
        ("id" = i64, Path, description = "ID do cliente"),
        ("debt_id" = i64, Path, description = "ID do lançamento")
    ),
    responses(
        (status = 200, description = "Lançamento marcado como apagado"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn void_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((id, debt_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.client_service
        .void_debt(id, debt_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "debt_deleted");
    Ok((StatusCode::OK, Json(json!({ "status": "success", "message": message }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_rejects_negative_debt_and_long_phone() {
        let payload: CreateClientPayload = serde_json::from_value(json!({
            "name": "Aziz",
            "info": "Chorsu bozori",
            "phone": "+99890123456789012345",
            "debt": -5,
            "recorded_by": "admin"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["debt"][0].code, "negative");
        assert_eq!(fields["phone"][0].message.as_deref(), Some("too_long"));
    }

    #[test]
    fn create_payload_accepts_the_usual_form() {
        let payload: CreateClientPayload = serde_json::from_value(json!({
            "name": "Aziz",
            "info": "Chorsu bozori",
            "phone": "+998901234567",
            "debt": 100000,
            "recorded_by": "admin"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.debt, Decimal::from(100_000));
    }

    #[test]
    fn change_debt_requires_a_known_status() {
        let parsed = serde_json::from_value::<ChangeDebtPayload>(json!({
            "amount": 30000,
            "status": "qarz",
            "recorded_by": "admin"
        }));
        assert!(parsed.is_err());
    }
}
