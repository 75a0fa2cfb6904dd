//! API route configuration.

use axum::Router;
use axum::routing::get;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::state::AppState;
use super::v1;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Global Electronics Retailer API",
        version = "0.1.0",
        description = "CRUD API over the Global Electronics Retailer database: \
                       customers, products, categories, stores, sales and exchange rates",
        license(name = "Apache-2.0")
    ),
    paths(
        v1::root,
        v1::health,
        v1::list_customers,
        v1::get_customer,
        v1::create_customer,
        v1::update_customer,
        v1::patch_customer,
        v1::delete_customer,
        v1::list_categories,
        v1::get_category,
        v1::create_category,
        v1::update_category,
        v1::delete_category,
        v1::list_subcategories,
        v1::create_subcategory,
        v1::get_subcategory,
        v1::update_subcategory,
        v1::delete_subcategory,
        v1::list_products,
        v1::get_product,
        v1::create_product,
        v1::update_product,
        v1::patch_product,
        v1::delete_product,
        v1::list_stores,
        v1::get_store,
        v1::create_store,
        v1::update_store,
        v1::patch_store,
        v1::delete_store,
        v1::list_sales,
        v1::get_sale,
        v1::create_sale,
        v1::update_sale,
        v1::patch_sale,
        v1::delete_sale,
        v1::list_exchange_rates,
        v1::get_exchange_rate,
        v1::create_exchange_rate,
        v1::update_exchange_rate,
        v1::patch_exchange_rate,
        v1::delete_exchange_rate,
    ),
    components(
        schemas(
            v1::ServiceInfo,
            v1::HealthResponse,
            v1::ErrorResponse,
            v1::CustomerResponse,
            v1::CreateCustomerRequest,
            v1::UpdateCustomerRequest,
            v1::PatchCustomerRequest,
            v1::PaginatedCustomers,
            v1::CategoryResponse,
            v1::CategoryRequest,
            v1::PaginatedCategories,
            v1::SubcategoryResponse,
            v1::CreateSubcategoryRequest,
            v1::UpdateSubcategoryRequest,
            v1::PaginatedSubcategories,
            v1::ProductResponse,
            v1::CreateProductRequest,
            v1::UpdateProductRequest,
            v1::PatchProductRequest,
            v1::PaginatedProducts,
            v1::StoreResponse,
            v1::CreateStoreRequest,
            v1::UpdateStoreRequest,
            v1::PatchStoreRequest,
            v1::PaginatedStores,
            v1::SaleResponse,
            v1::CreateSaleRequest,
            v1::UpdateSaleRequest,
            v1::PatchSaleRequest,
            v1::PaginatedSales,
            v1::ExchangeRateResponse,
            v1::CreateExchangeRateRequest,
            v1::UpdateExchangeRateRequest,
            v1::PatchExchangeRateRequest,
            v1::PaginatedExchangeRates,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "customers", description = "Customer management endpoints"),
        (name = "categories", description = "Category and subcategory endpoints"),
        (name = "products", description = "Product catalog endpoints"),
        (name = "stores", description = "Store management endpoints"),
        (name = "sales", description = "Sales (order line) endpoints"),
        (name = "exchange-rates", description = "Daily exchange rate endpoints")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router(state: AppState) -> Router {
    let api = ApiDoc::openapi();

    let system_routes = Router::new()
        .route("/", get(v1::root))
        .route("/health", get(v1::health));

    let v1_routes = Router::new()
        .route(
            "/customers",
            get(v1::list_customers).post(v1::create_customer),
        )
        .route(
            "/customers/{key}",
            get(v1::get_customer)
                .put(v1::update_customer)
                .patch(v1::patch_customer)
                .delete(v1::delete_customer),
        )
        .route(
            "/categories",
            get(v1::list_categories).post(v1::create_category),
        )
        .route(
            "/categories/{key}",
            get(v1::get_category)
                .put(v1::update_category)
                .delete(v1::delete_category),
        )
        .route(
            "/categories/{key}/subcategories",
            get(v1::list_subcategories).post(v1::create_subcategory),
        )
        .route(
            "/subcategories/{key}",
            get(v1::get_subcategory)
                .put(v1::update_subcategory)
                .delete(v1::delete_subcategory),
        )
        .route("/products", get(v1::list_products).post(v1::create_product))
        .route(
            "/products/{key}",
            get(v1::get_product)
                .put(v1::update_product)
                .patch(v1::patch_product)
                .delete(v1::delete_product),
        )
        .route("/stores", get(v1::list_stores).post(v1::create_store))
        .route(
            "/stores/{key}",
            get(v1::get_store)
                .put(v1::update_store)
                .patch(v1::patch_store)
                .delete(v1::delete_store),
        )
        .route("/sales", get(v1::list_sales).post(v1::create_sale))
        .route(
            "/sales/{key}",
            get(v1::get_sale)
                .put(v1::update_sale)
                .patch(v1::patch_sale)
                .delete(v1::delete_sale),
        )
        .route(
            "/exchange-rates",
            get(v1::list_exchange_rates).post(v1::create_exchange_rate),
        )
        .route(
            "/exchange-rates/{currency}/{date}",
            get(v1::get_exchange_rate)
                .put(v1::update_exchange_rate)
                .patch(v1::patch_exchange_rate)
                .delete(v1::delete_exchange_rate),
        );

    system_routes
        .nest("/api/v1", v1_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
