// src/handlers/workers.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{not_blank, valid_daily_rate, within_amount_limit},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        ledger::LedgerStatus,
        workers::{Worker, WorkerDetail, WorkerStatus},
    },
    services::worker_service::WorkerPatch,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkerFilter {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkerPayload {
    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub name: String,

    #[validate(custom(function = "not_blank"), length(max = 255, message = "too_long"))]
    pub phone: String,

    // Diária
    #[validate(range(min = 0, message = "negative"), custom(function = "valid_daily_rate"))]
    #[schema(example = 50000)]
    pub amount: i64,

    // Primeiro dia de trabalho
    #[schema(value_type = String, format = Date, example = "2025-07-01")]
    pub day: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkerPayload {
    #[validate(length(min = 1, max = 255, message = "too_long"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "too_long"))]
    pub phone: Option<String>,
    #[validate(range(min = 0, message = "negative"), custom(function = "valid_daily_rate"))]
    pub amount: Option<i64>,
    #[schema(value_type = Option<String>, format = Date)]
    pub day: Option<NaiveDate>,
    pub status: Option<WorkerStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WorkerPayPayload {
    #[validate(range(min = 0, message = "negative"), custom(function = "within_amount_limit"))]
    #[schema(example = 100000)]
    pub amount: i64,
    pub status: LedgerStatus,
}

// GET /api/workers
#[utoipa::path(
    get,
    path = "/api/workers",
    tag = "Workers",
    params(WorkerFilter),
    responses((status = 200, description = "Trabalhadores com o saldo atualizado", body = Vec<Worker>)),
    security(("api_jwt" = []))
)]
pub async fn list_workers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<WorkerFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let workers = app_state.worker_service
        .list(filter.name.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(workers)))
}

// POST /api/workers
#[utoipa::path(
    post,
    path = "/api/workers",
    tag = "Workers",
    request_body = CreateWorkerPayload,
    responses(
        (status = 201, description = "Trabalhador criado", body = Worker),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateWorkerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state.worker_service
        .create(&payload.name, &payload.phone, payload.amount, payload.day)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(worker)))
}

// GET /api/workers/{id}
#[utoipa::path(
    get,
    path = "/api/workers/{id}",
    tag = "Workers",
    params(("id" = i64, Path, description = "ID do trabalhador")),
    responses(
        (status = 200, description = "Trabalhador com os pagamentos", body = WorkerDetail),
        (status = 404, description = "Trabalhador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state.worker_service
        .detail(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/workers/{id}
#[utoipa::path(
    put,
    path = "/api/workers/{id}",
    tag = "Workers",
    params(("id" = i64, Path, description = "ID do trabalhador")),
    request_body = UpdateWorkerPayload,
    responses(
        (status = 200, description = "Trabalhador atualizado", body = Worker),
        (status = 404, description = "Trabalhador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateWorkerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state.worker_service
        .update(
            id,
            WorkerPatch {
                name: payload.name.as_deref(),
                phone: payload.phone.as_deref(),
                daily_rate: payload.amount,
                start_day: payload.day,
                status: payload.status,
            },
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(worker)))
}

// DELETE /api/workers/{id}
#[utoipa::path(
    delete,
    path = "/api/workers/{id}",
    tag = "Workers",
    params(("id" = i64, Path, description = "ID do trabalhador")),
    responses(
        (status = 200, description = "Trabalhador e foto removidos"),
        (status = 404, description = "Trabalhador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.worker_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "worker_deleted");
    Ok((StatusCode::OK, Json(json!({ "status": "success", "message": message }))))
}

// POST /api/workers/{id}/pays
#[utoipa::path(
    post,
    path = "/api/workers/{id}/pays",
    tag = "Workers",
    params(("id" = i64, Path, description = "ID do trabalhador")),
    request_body = WorkerPayPayload,
    responses(
        (status = 201, description = "Pagamento registrado, saldo refeito"),
        (status = 404, description = "Trabalhador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pay(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<WorkerPayPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (pay, worker) = app_state.worker_service
        .pay(id, payload.amount, payload.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "pay": pay, "worker": worker })),
    ))
}

// POST /api/workers/{id}/image (multipart, campo "image")
#[utoipa::path(
    post,
    path = "/api/workers/{id}/image",
    tag = "Workers",
    params(("id" = i64, Path, description = "ID do trabalhador")),
    request_body(content_type = "multipart/form-data", description = "Campo 'image': jpeg, png ou gif até 2 MiB"),
    responses(
        (status = 200, description = "Foto substituída", body = Worker),
        (status = 404, description = "Trabalhador não encontrado"),
        (status = 422, description = "Arquivo ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_image(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::field("image", "invalid_image").to_api_error(&locale, &app_state.i18n_store))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|_| AppError::field("image", "image_too_large").to_api_error(&locale, &app_state.i18n_store))?;
            bytes = Some(data);
            break;
        }
    }

    let bytes = bytes
        .ok_or_else(|| AppError::field("image", "missing_image").to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state.worker_service
        .set_image(id, &bytes)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(worker)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_rate_must_be_a_multiple_of_100() {
        let payload: CreateWorkerPayload = serde_json::from_value(json!({
            "name": "Jasur", "phone": "+998935554433", "amount": 50050, "day": "2025-07-01"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.field_errors()["amount"][0].code, "not_multiple_of_100");
    }

    #[test]
    fn oversized_rates_and_pays_are_rejected() {
        let payload: CreateWorkerPayload = serde_json::from_value(json!({
            "name": "Jasur", "phone": "+998935554433", "amount": 90_000_000_000_000_000i64, "day": "2000-01-01"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.field_errors()["amount"][0].code, "too_large");

        let pay: WorkerPayPayload =
            serde_json::from_value(json!({ "amount": i64::MAX, "status": "berdi" })).unwrap();
        assert_eq!(pay.validate().unwrap_err().field_errors()["amount"][0].code, "too_large");
    }

    #[test]
    fn worker_payload_uses_amount_and_day_names() {
        let payload: CreateWorkerPayload = serde_json::from_value(json!({
            "name": "Jasur", "phone": "+998935554433", "amount": 50000, "day": "2025-07-01"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.day, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn pay_status_is_oldi_or_berdi() {
        let pay: WorkerPayPayload =
            serde_json::from_value(json!({ "amount": 100000, "status": "oldi" })).unwrap();
        assert_eq!(pay.status, LedgerStatus::Oldi);
        assert!(serde_json::from_value::<WorkerPayPayload>(json!({ "amount": 1, "status": "x" })).is_err());
    }
}
