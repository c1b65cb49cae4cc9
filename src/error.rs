#![cfg(feature = "web")]

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::bill::BillError;
use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Items required")]
    ItemsRequired,

    #[error("No valid items found for bill")]
    NoValidItems,

    #[error("Item code required")]
    ItemCodeRequired,

    #[error("Price must be non-negative")]
    NegativePrice,

    #[error("Product not found")]
    ProductNotFound,

    #[error(transparent)]
    BadRequest(#[from] JsonRejection),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to render bill: {0}")]
    Render(#[from] rust_xlsxwriter::XlsxError),

    #[error("Catalog task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<BillError> for AppError {
    fn from(err: BillError) -> Self {
        match err {
            BillError::ItemsRequired => AppError::ItemsRequired,
            BillError::NoValidItems => AppError::NoValidItems,
            BillError::Catalog(e) => AppError::Catalog(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ItemsRequired
            | AppError::NoValidItems
            | AppError::ItemCodeRequired
            | AppError::NegativePrice
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound => StatusCode::NOT_FOUND,
            AppError::Catalog(_) | AppError::Render(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
