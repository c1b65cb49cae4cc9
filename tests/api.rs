#![cfg(feature = "web")]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use cart::app::{AppState, router};
use cart::catalog::{CatalogError, CatalogStore, ProductCatalog};
use cart::downloader::XLSX_CONTENT_TYPE;
use cart::{NewProduct, Product, ProductPatch};
use serde_json::{Value, json};
use tower::ServiceExt;

/// A store whose every operation fails
struct BrokenCatalog;

impl CatalogStore for BrokenCatalog {
    fn list(&self, _: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::Poisoned)
    }
    fn get(&self, _: &str) -> Result<Option<Product>, CatalogError> {
        Err(CatalogError::Poisoned)
    }
    fn find_by_item_code(&self, _: &str) -> Result<Option<Product>, CatalogError> {
        Err(CatalogError::Poisoned)
    }
    fn create(&self, _: NewProduct) -> Result<Product, CatalogError> {
        Err(CatalogError::Poisoned)
    }
    fn update(&self, _: &str, _: ProductPatch) -> Result<Option<Product>, CatalogError> {
        Err(CatalogError::Poisoned)
    }
}

fn app_with(catalog: Arc<dyn CatalogStore>) -> Router {
    router(AppState::new(catalog, "Construction Cart"))
}

fn seeded() -> (Router, Arc<ProductCatalog>) {
    let catalog = Arc::new(ProductCatalog::in_memory());
    for (code, unit, price, facility) in [
        ("CEM-50", "bag", 380.0, Some("north")),
        ("SAND", "cft", 45.0, Some("south")),
        ("TMT-8", "kg", 64.0, None),
    ] {
        catalog
            .create(NewProduct {
                item_code: code.to_string(),
                description: format!("{code} description"),
                unit: unit.to_string(),
                price,
                facility: facility.map(str::to_string),
            })
            .unwrap();
    }
    (app_with(catalog.clone()), catalog)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = seeded();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn lists_products_with_optional_facility() {
    let (app, _) = seeded();

    let all = app
        .clone()
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(all).await.as_array().unwrap().len(), 3);

    let north = app
        .clone()
        .oneshot(Request::get("/products?facility=north").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let north = body_json(north).await;
    assert_eq!(north.as_array().unwrap().len(), 1);
    assert_eq!(north[0]["itemCode"], "CEM-50");

    let blank = app
        .oneshot(Request::get("/products?facility=").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(blank).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn create_then_read_returns_same_fields() {
    let (app, _) = seeded();

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "itemCode": "PVC-2", "description": "PVC pipe 2in", "unit": "m", "price": "118.5" }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    assert!(!created["id"].as_str().unwrap().is_empty());

    let listed = app
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let listed = body_json(listed).await;
    let found = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == created["id"])
        .unwrap();

    assert_eq!(found["itemCode"], "PVC-2");
    assert_eq!(found["description"], "PVC pipe 2in");
    assert_eq!(found["unit"], "m");
    assert_eq!(found["price"], 118.5);
}

#[tokio::test]
async fn create_requires_item_code_and_non_negative_price() {
    let (app, _) = seeded();

    let missing = app
        .clone()
        .oneshot(json_request("POST", "/products", json!({ "description": "nameless" })))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "Item code required");

    let negative = app
        .oneshot(json_request("POST", "/products", json!({ "itemCode": "X", "price": -1 })))
        .await
        .unwrap();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(negative).await["error"], "Price must be non-negative");
}

#[tokio::test]
async fn update_changes_only_sent_fields() {
    let (app, catalog) = seeded();
    let sand = catalog.find_by_item_code("SAND").unwrap().unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/products/{}", sand.id),
            json!({ "price": 47.25 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = catalog.get(&sand.id).unwrap().unwrap();
    assert_eq!(updated.price, 47.25);
    assert_eq!(updated.unit, "cft");
}

#[tokio::test]
async fn update_unknown_product_is_not_found() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request("PUT", "/products/nope", json!({ "price": 1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Product not found");
}

#[tokio::test]
async fn bill_download_streams_workbook() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request(
            "POST",
            "/bill/download",
            json!({
                "items": [{ "itemCode": "CEM-50", "qty": 2 }, { "itemCode": "SAND", "qty": 10 }],
                "meta": { "invoiceNo": "INV-9", "customer": "Site 4" }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=bill_INV-9.xlsx"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // xlsx files are zip archives
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn bill_without_invoice_uses_default_filename() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request(
            "POST",
            "/bill/download",
            json!({ "items": [{ "description": "Transport", "price": 500, "qty": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=bill.xlsx"
    );
}

#[tokio::test]
async fn bill_with_no_items_is_bad_request() {
    let (app, _) = seeded();

    for body in [json!({ "items": [] }), json!({})] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/bill/download", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Items required" }));
    }
}

#[tokio::test]
async fn bill_with_only_unknown_items_is_bad_request() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request(
            "POST",
            "/bill/download",
            json!({ "items": [{ "itemCode": "GHOST", "qty": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "No valid items found for bill" })
    );
}

#[tokio::test]
async fn catalog_failure_is_server_error() {
    let app = app_with(Arc::new(BrokenCatalog));
    let response = app
        .oneshot(json_request(
            "POST",
            "/bill/download",
            json!({ "items": [{ "itemCode": "CEM-50", "qty": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn numeric_item_code_is_accepted() {
    let (app, catalog) = seeded();
    catalog
        .create(NewProduct {
            item_code: "1001".to_string(),
            description: "Gravel 20mm".to_string(),
            unit: "cft".to_string(),
            price: 30.0,
            facility: None,
        })
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/bill/download",
            json!({ "items": [{ "itemCode": 1001, "qty": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
}

#[tokio::test]
async fn malformed_bodies_answer_with_json_error() {
    let (app, _) = seeded();

    let truncated = Request::post("/bill/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"items": [{"itemCode": "SAND""#))
        .unwrap();
    let mistyped = json_request("POST", "/products", json!({ "itemCode": ["not", "a", "code"] }));

    for request in [truncated, mistyped] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(body_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn update_with_null_facility_clears_it() {
    let (app, catalog) = seeded();
    let cement = catalog.find_by_item_code("CEM-50").unwrap().unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/products/{}", cement.id),
            json!({ "facility": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body.get("facility").is_none());
    assert_eq!(catalog.get(&cement.id).unwrap().unwrap().facility, None);
    assert_eq!(catalog.list(Some("north")).unwrap().len(), 0);
}

#[tokio::test]
async fn writes_through_file_catalog_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");
    let app = app_with(Arc::new(ProductCatalog::open(&path).unwrap()));

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "itemCode": "BRICK", "unit": "pcs", "price": 8 }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["id"].as_str().unwrap().to_string();

    let updated = app
        .oneshot(json_request("PUT", &format!("/products/{id}"), json!({ "price": 9 })))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);

    let reopened = ProductCatalog::open(&path).unwrap();
    let brick = reopened.get(&id).unwrap().unwrap();
    assert_eq!(brick.item_code, "BRICK");
    assert_eq!(brick.price, 9.0);
}
