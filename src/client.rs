#![cfg(feature = "web")]

use std::env;

use log::{error, warn};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::bill::{BillLineRequest, BillMeta};
use crate::product::{NewProduct, Product, ProductPatch};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

/// Aggregate result of [`ApiClient::save_all`]
///
/// Individual failures are not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAllOutcome {
    AllSaved,
    SomeFailed,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP wrapper around the catalog and bill endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for `CART_API_BASE_URL`, or the local default
    pub fn from_env() -> Self {
        let base_url = env::var("CART_API_BASE_URL").unwrap_or_else(|_| {
            warn!("CART_API_BASE_URL not set, using {DEFAULT_API_BASE_URL}");
            DEFAULT_API_BASE_URL.to_string()
        });
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the catalog, optionally for a single facility
    pub async fn get_products(&self, facility: Option<&str>) -> Result<Vec<Product>, ClientError> {
        let mut request = self.http.get(self.url("/products"));
        if let Some(facility) = facility.filter(|f| !f.is_empty()) {
            request = request.query(&[("facility", facility)]);
        }

        let response = check(request.send().await?, "Failed to load products").await?;
        Ok(response.json().await?)
    }

    pub async fn create_product(&self, new: &NewProduct) -> Result<Product, ClientError> {
        let response = self.http.post(self.url("/products")).json(new).send().await?;
        let response = check(response, "Add failed").await?;
        Ok(response.json().await?)
    }

    pub async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<Product, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/products/{id}")))
            .json(patch)
            .send()
            .await?;
        let response = check(response, "Save failed").await?;
        Ok(response.json().await?)
    }

    /// Request a bill and return the xlsx bytes
    pub async fn download_bill(
        &self,
        items: &[BillLineRequest],
        meta: Option<&BillMeta>,
    ) -> Result<Vec<u8>, ClientError> {
        let body = json!({
            "items": items,
            "meta": meta.cloned().unwrap_or_default(),
        });

        let response = self.http.post(self.url("/bill/download")).json(&body).send().await?;
        let response = check(response, "Download failed").await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Save every product's editable fields concurrently
    ///
    /// All updates are dispatched at once; the outcome only says whether
    /// any of them failed.
    pub async fn save_all(&self, products: &[Product]) -> SaveAllOutcome {
        let mut tasks = JoinSet::new();
        for product in products {
            let client = self.clone();
            let id = product.id.clone();
            let patch = product.to_patch();
            tasks.spawn(async move { client.update_product(&id, &patch).await });
        }

        let mut outcome = SaveAllOutcome::AllSaved;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    error!("Save failed: {e}");
                    outcome = SaveAllOutcome::SomeFailed;
                }
                Err(e) => {
                    error!("Save task aborted: {e}");
                    outcome = SaveAllOutcome::SomeFailed;
                }
            }
        }
        outcome
    }
}

/// Turn a non-success response into [`ClientError::Api`]
///
/// The message comes from the body's `error` field when there is one.
async fn check(response: Response, fallback: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| fallback.to_string());

    Err(ClientError::Api { status, message })
}
