#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{FromRequest, Path, Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use crate::bill::{BillLineRequest, BillMeta, generate_bill};
use crate::catalog::{CatalogStore, ProductCatalog};
use crate::config::Config;
use crate::downloader::{XLSX_CONTENT_TYPE, bill_filename, to_xlsx};
use crate::error::AppError;
use crate::product::{NewProduct, ProductPatch};

/// Shared state handed to every handler
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub shop_name: String,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, shop_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            shop_name: shop_name.into(),
        })
    }
}

/// `Json` extractor whose rejections answer with the `{"error": ...}` body
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct AppJson<T>(T);

#[derive(Deserialize)]
struct ProductQuery {
    facility: Option<String>,
}

#[derive(Deserialize)]
struct BillRequest {
    #[serde(default)]
    items: Option<Vec<BillLineRequest>>,
    #[serde(default)]
    meta: Option<BillMeta>,
}

/// Run catalog work off the async workers
///
/// File-backed catalogs write to disk while holding their lock, so mutations
/// and bill rendering go through the blocking pool.
async fn with_catalog<T, F>(state: &AppState, work: F) -> Result<T, AppError>
where
    F: FnOnce(&dyn CatalogStore) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let catalog = Arc::clone(&state.catalog);
    tokio::task::spawn_blocking(move || work(catalog.as_ref())).await?
}

/// Build the HTTP router over the given state
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", put(update_product))
        .route("/bill/download", post(download_bill))
        .layer(cors)
        .with_state(state)
}

/// Open the catalog and serve until Ctrl+C or SIGTERM
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ProductCatalog::open(&config.catalog_path)?;
    let state = AppState::new(Arc::new(catalog), config.shop_name.clone());

    let app = router(state);

    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let facility = query.facility.as_deref().filter(|f| !f.is_empty());
    let products = state.catalog.list(facility)?;
    Ok(Json(products))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    AppJson(new): AppJson<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    if new.item_code.trim().is_empty() {
        return Err(AppError::ItemCodeRequired);
    }
    if new.price < 0.0 {
        return Err(AppError::NegativePrice);
    }

    let product = with_catalog(&state, move |catalog| Ok(catalog.create(new)?)).await?;
    info!("Product {} created as {}", product.item_code, product.id);

    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<ProductPatch>,
) -> Result<impl IntoResponse, AppError> {
    if patch.price.is_some_and(|p| p < 0.0) {
        return Err(AppError::NegativePrice);
    }
    if patch.item_code.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::ItemCodeRequired);
    }

    let key = id.clone();
    let product = with_catalog(&state, move |catalog| {
        catalog.update(&key, patch)?.ok_or(AppError::ProductNotFound)
    })
    .await?;
    info!("Product {id} updated");

    Ok(Json(product))
}

async fn download_bill(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<BillRequest>,
) -> Result<Response, AppError> {
    let items = request.items.unwrap_or_default();
    let requested = items.len();
    let meta = request.meta.unwrap_or_default();
    let shop_name = state.shop_name.clone();

    let (bill, buffer) = with_catalog(&state, move |catalog| {
        let bill = generate_bill(catalog, &items, meta, &shop_name)?;
        let buffer = to_xlsx(&bill)?;
        Ok((bill, buffer))
    })
    .await?;

    let filename = bill_filename(&bill.header.invoice_no);
    info!(
        "Generated {filename}: {} of {requested} lines, grand total {:.2}",
        bill.items().len(),
        bill.grand_total()
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        buffer,
    )
        .into_response())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
