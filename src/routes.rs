// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

// Foto de até 2 MiB + o envelope do multipart
const UPLOAD_BODY_LIMIT: usize = 3 * 1024 * 1024;

pub fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/login", post(handlers::auth::login));

    let client_routes = Router::new()
        .route("/clients"
               ,get(handlers::clients::list_clients)
               .post(handlers::clients::create_client)
        )
        .route("/clients/{id}"
               ,get(handlers::clients::get_client)
               .put(handlers::clients::update_client)
               .delete(handlers::clients::delete_client)
        )
        .route("/clients/{id}/change-debt", post(handlers::clients::change_debt))
        .route("/clients/{id}/debts/{debt_id}"
               ,put(handlers::clients::update_debt)
               .delete(handlers::clients::void_debt)
        );

    let firm_routes = Router::new()
        .route("/firms"
               ,get(handlers::firms::list_firms)
               .post(handlers::firms::create_firm)
        )
        .route("/firms/{id}"
               ,get(handlers::firms::get_firm)
               .put(handlers::firms::update_firm)
               .delete(handlers::firms::delete_firm)
        )
        .route("/firms/{id}/change-debt", post(handlers::firms::change_firm_debt))
        .route("/firms/{id}/debts/{debt_id}", put(handlers::firms::update_firm_debt));

    let order_routes = Router::new()
        .route("/orders"
               ,get(handlers::orders::list_orders)
               .post(handlers::orders::create_order)
        )
        .route("/orders/{id}"
               ,get(handlers::orders::get_order)
               .put(handlers::orders::update_order)
               .delete(handlers::orders::delete_order)
        )
        .route("/products"
               ,get(handlers::products::list_products)
               .post(handlers::products::create_product)
        )
        .route("/products/{id}"
               ,get(handlers::products::get_product)
               .put(handlers::products::update_product)
               .delete(handlers::products::delete_product)
        )
        .route("/products/{id}/price/{sale_type}/{unit}", get(handlers::products::get_price));

    let sale_routes = Router::new()
        .route("/optomchilar"
               ,get(handlers::sales::list_optoms)
               .post(handlers::sales::create_optom)
        )
        .route("/optomchilar/products", get(handlers::sales::product_options))
        .route("/optomchilar/sale-items/{item_id}", delete(handlers::sales::delete_sale_item))
        .route("/optomchilar/{id}"
               ,get(handlers::sales::get_optom)
               .put(handlers::sales::update_optom)
               .delete(handlers::sales::delete_optom)
        );

    let worker_routes = Router::new()
        .route("/workers"
               ,get(handlers::workers::list_workers)
               .post(handlers::workers::create_worker)
        )
        .route("/workers/{id}"
               ,get(handlers::workers::get_worker)
               .put(handlers::workers::update_worker)
               .delete(handlers::workers::delete_worker)
        )
        .route("/workers/{id}/pays", post(handlers::workers::create_pay))
        .route("/workers/{id}/image"
               ,post(handlers::workers::upload_image)
               .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        );

    // Tudo abaixo exige bearer token
    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/logout", post(handlers::auth::logout))
        .merge(client_routes)
        .merge(firm_routes)
        .merge(order_routes)
        .merge(sale_routes)
        .merge(worker_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api/docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        common::clock::FixedClock,
        config::Settings,
        services::image_store::LocalDiskStore,
    };

    // Pool preguiçoso: nenhuma destas requisições chega ao banco
    fn test_app() -> Router {
        let settings = Settings {
            database_url: "postgres://localhost/savdo_test".to_string(),
            jwt_secret: "segredo-de-teste".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            payroll_utc_offset_hours: 5,
            payroll_cutoff_hour: 11,
            upload_dir: std::env::temp_dir().display().to_string(),
            admin_email: None,
            admin_password: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&settings.database_url)
            .unwrap();
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 7, 5, 7, 0, 0).unwrap()));
        let images = Arc::new(LocalDiskStore::new(std::env::temp_dir()));
        app(AppState::build(pool, &settings, clock, images).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        for uri in ["/api/clients", "/api/workers/1", "/api/optomchilar", "/api/me"] {
            let response = test_app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn logout_is_routed_behind_the_guard() {
        let response = test_app()
            .oneshot(Request::post("/api/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized_with_translated_error() {
        let response = test_app()
            .oneshot(
                Request::post("/api/clients/1/change-debt")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"amount":1,"status":"oldi","recorded_by":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[tokio::test]
    async fn openapi_document_lists_the_resources() {
        let response = test_app()
            .oneshot(Request::get("/api/docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = body_json(response).await;
        for path in ["/api/clients", "/api/firms/{id}/change-debt", "/api/workers/{id}/pays", "/api/optomchilar", "/api/logout"] {
            assert!(doc["paths"].get(path).is_some(), "{path}");
        }
    }
}
