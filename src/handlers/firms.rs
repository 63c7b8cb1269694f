// src/handlers/firms.rs

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
        validation::{not_blank, validate_not_negative},
    },
    config::AppState,
    db::firm_repo::FirmFields,
    middleware::i18n::Locale,
    models::{firms::FirmDetail, ledger::LedgerStatus},
    services::client_service::DebtPatch,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FirmFilter {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFirmPayload {
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    #[schema(example = "Coca-Cola Bottlers")]
    pub name: String,
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub supervisor: String,
    #[validate(length(max = 20, message = "too_long"))]
    pub s_phone: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub agent: String,
    #[validate(length(max = 20, message = "too_long"))]
    pub a_phone: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub currier: String,
    #[validate(length(max = 20, message = "too_long"))]
    pub c_phone: Option<String>,
    pub humo: bool,
    pub uzcard: bool,
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    #[schema(example = "Dushanba")]
    pub day: String,

    // Saldo de abertura
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 500000)]
    pub debt: Decimal,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub recorded_by: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFirmPayload {
    #[validate(length(max = 255, message = "too_long"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "too_long"))]
    pub supervisor: Option<String>,
    #[validate(length(max = 20, message = "too_long"))]
    pub s_phone: Option<String>,
    #[validate(length(max = 255, message = "too_long"))]
    pub agent: Option<String>,
    #[validate(length(max = 20, message = "too_long"))]
    pub a_phone: Option<String>,
    #[validate(length(max = 255, message = "too_long"))]
    pub currier: Option<String>,
    #[validate(length(max = 20, message = "too_long"))]
    pub c_phone: Option<String>,
    pub humo: Option<bool>,
    pub uzcard: Option<bool>,
    #[validate(length(max = 255, message = "too_long"))]
    pub day: Option<String>,
}

impl UpdateFirmPayload {
    fn fields(&self) -> FirmFields<'_> {
        FirmFields {
            name: self.name.as_deref(),
            supervisor: self.supervisor.as_deref(),
            s_phone: self.s_phone.as_deref(),
            agent: self.agent.as_deref(),
            a_phone: self.a_phone.as_deref(),
            currier: self.currier.as_deref(),
            c_phone: self.c_phone.as_deref(),
            humo: self.humo,
            uzcard: self.uzcard,
            day: self.day.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeFirmDebtPayload {
    // O frontend antigo manda "debt"; "amount" também é aceito
    #[serde(alias = "amount")]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 150000)]
    pub debt: Decimal,

    pub status: LedgerStatus,

    #[validate(length(max = 255, message = "too_long"))]
    pub recorded_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFirmDebtPayload {
    #[serde(alias = "debt")]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub status: Option<LedgerStatus>,
    #[validate(length(max = 255, message = "too_long"))]
    pub recorded_by: Option<String>,
}

// GET /api/firms
#[utoipa::path(
    get,
    path = "/api/firms",
    tag = "Firms",
    params(FirmFilter, PageQuery),
    responses((status = 200, description = "Página de firmas ativas")),
    security(("api_jwt" = []))
)]
pub async fn list_firms(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<FirmFilter>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let firms = app_state.firm_service
        .list(filter.name.as_deref(), &page)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(firms)))
}

// POST /api/firms
#[utoipa::path(
    post,
    path = "/api/firms",
    tag = "Firms",
    request_body = CreateFirmPayload,
    responses(
        (status = 201, description = "Firma criada com o saldo de abertura"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_firm(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateFirmPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let fields = FirmFields {
        name: Some(&payload.name),
        supervisor: Some(&payload.supervisor),
        s_phone: payload.s_phone.as_deref(),
        agent: Some(&payload.agent),
        a_phone: payload.a_phone.as_deref(),
        currier: Some(&payload.currier),
        c_phone: payload.c_phone.as_deref(),
        humo: Some(payload.humo),
        uzcard: Some(payload.uzcard),
        day: Some(&payload.day),
    };

    let firm = app_state.firm_service
        .create(&fields, payload.debt, Some(&payload.recorded_by))
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success", "firm": firm }))))
}

// GET /api/firms/{id}
#[utoipa::path(
    get,
    path = "/api/firms/{id}",
    tag = "Firms",
    params(("id" = i64, Path, description = "ID da firma")),
    responses(
        (status = 200, description = "Firma com o livro de lançamentos", body = FirmDetail),
        (status = 404, description = "Firma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_firm(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let firm = app_state.firm_service
        .detail(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "firm": firm }))))
}

// PUT /api/firms/{id}
#[utoipa::path(
    put,
    path = "/api/firms/{id}",
    tag = "Firms",
    params(("id" = i64, Path, description = "ID da firma")),
    request_body = UpdateFirmPayload,
    responses(
        (status = 200, description = "Firma atualizada"),
        (status = 404, description = "Firma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_firm(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFirmPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let firm = app_state.firm_service
        .update(id, &payload.fields())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "status": "success", "firm": firm }))))
}

// DELETE /api/firms/{id}
#[utoipa::path(
    delete,
    path = "/api/firms/{id}",
    tag = "Firms",
    params(("id" = i64, Path, description = "ID da firma")),
    responses(
        (status = 200, description = "Firma marcada como apagada"),
        (status = 404, description = "Firma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_firm(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.firm_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "firm_deleted");
    Ok((StatusCode::OK, Json(json!({ "status": "success", "message": message }))))
}

// POST /api/firms/{id}/change-debt
#[utoipa::path(
    post,
    path = "/api/firms/{id}/change-debt",
    tag = "Firms",
    params(("id" = i64, Path, description = "ID da firma")),
    request_body = ChangeFirmDebtPayload,
    responses(
        (status = 201, description = "Lançamento registrado e saldo recalculado"),
        (status = 404, description = "Firma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_firm_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<ChangeFirmDebtPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let firm_debt = app_state.firm_service
        .change_debt(id, payload.debt, payload.status, payload.recorded_by.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success", "firm_debt": firm_debt }))))
}

// PUT /api/firms/{id}/debts/{debt_id}
#[utoipa::path(
    put,
    path = "/api/firms/{id}/debts/{debt_id}",
    tag = "Firms",
    params(
        ("id" = i64, Path, description = "ID da firma"),
        ("debt_id" = i64, Path, description = "ID do lançamento")
    ),
    request_body = UpdateFirmDebtPayload,
    responses(
        (status = 200, description = "Lançamento corrigido e saldo recalculado"),
        (status = 404, description = "Firma ou lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_firm_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((id, debt_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateFirmDebtPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (firm_debt, firm) = app_state.firm_service
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
        Json(json!({ "status": "success", "firm_debt": firm_debt, "firm": firm })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_debt_accepts_amount_as_an_alias() {
        let payload: ChangeFirmDebtPayload = serde_json::from_value(json!({
            "amount": 150000,
            "status": "berdi"
        }))
        .unwrap();
        assert_eq!(payload.debt, Decimal::from(150_000));
        assert_eq!(payload.status, LedgerStatus::Berdi);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn partial_update_only_touches_sent_fields() {
        let payload: UpdateFirmPayload = serde_json::from_value(json!({ "humo": true })).unwrap();
        let fields = payload.fields();
        assert_eq!(fields.humo, Some(true));
        assert!(fields.name.is_none() && fields.day.is_none());
    }
}
