// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::logout,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::change_debt,
        handlers::clients::update_debt,
        handlers::clients::void_debt,

        // --- Firms ---
        handlers::firms::list_firms,
        handlers::firms::create_firm,
        handlers::firms::get_firm,
        handlers::firms::update_firm,
        handlers::firms::delete_firm,
        handlers::firms::change_firm_debt,
        handlers::firms::update_firm_debt,

        // --- Orders / Products ---
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::get_price,

        // --- Optomchilar ---
        handlers::sales::list_optoms,
        handlers::sales::create_optom,
        handlers::sales::product_options,
        handlers::sales::get_optom,
        handlers::sales::update_optom,
        handlers::sales::delete_optom,
        handlers::sales::delete_sale_item,

        // --- Workers ---
        handlers::workers::list_workers,
        handlers::workers::create_worker,
        handlers::workers::get_worker,
        handlers::workers::update_worker,
        handlers::workers::delete_worker,
        handlers::workers::create_pay,
        handlers::workers::upload_image,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Ledger ---
            models::ledger::LedgerStatus,
            models::clients::Client,
            models::clients::Debt,
            models::clients::ClientDetail,
            models::firms::Firm,
            models::firms::FirmDebt,
            models::firms::FirmDetail,

            // --- Orders ---
            models::orders::Order,
            models::orders::Product,
            models::orders::OrderDetail,

            // --- Sales ---
            models::sales::SaleType,
            models::sales::SaleUnit,
            models::sales::Optom,
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::SaleWithItems,
            models::sales::OptomDetail,
            models::sales::ProductOption,

            // --- Workers ---
            models::workers::WorkerStatus,
            models::workers::Worker,
            models::workers::WorkerPay,
            models::workers::WorkerDetail,

            // --- Payloads ---
            handlers::clients::CreateClientPayload,
            handlers::clients::UpdateClientPayload,
            handlers::clients::ChangeDebtPayload,
            handlers::clients::UpdateDebtPayload,
            handlers::firms::CreateFirmPayload,
            handlers::firms::UpdateFirmPayload,
            handlers::firms::ChangeFirmDebtPayload,
            handlers::firms::UpdateFirmDebtPayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::UpdateOrderPayload,
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductPayload,
            handlers::sales::SaleItemPayload,
            handlers::sales::CreateOptomPayload,
            handlers::sales::SaleItemPatchPayload,
            handlers::sales::UpdateOptomPayload,
            handlers::workers::CreateWorkerPayload,
            handlers::workers::UpdateWorkerPayload,
            handlers::workers::WorkerPayPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e usuário atual"),
        (name = "Clients", description = "Clientes e livro de dívidas"),
        (name = "Firms", description = "Firmas fornecedoras e seus lançamentos"),
        (name = "Orders", description = "Pedidos de compra"),
        (name = "Products", description = "Produtos recebidos e tabela de preços"),
        (name = "Optomchilar", description = "Compradores no atacado e suas vendas"),
        (name = "Workers", description = "Trabalhadores, diárias e pagamentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
