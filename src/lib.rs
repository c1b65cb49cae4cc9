/*!
# Construction Cart

A catalog-backed ordering tool: pick products into a cart, adjust quantities
and download the order as an Excel invoice. An admin surface edits the
product catalog.

## Architecture

The application follows a client-server architecture:

### Server
- **Technologies**: Rust, axum, rust_xlsxwriter
- **Key Components**:
  - Catalog Store - Products kept in memory and mirrored to a JSON file
  - Bill Generator - Resolves requested lines against the catalog, totals them
    and renders the invoice workbook
  - HTTP layer - JSON endpoints for the catalog and the bill download

### Client
- **Technologies**: Rust, reqwest
- **Key Components**:
  - Cart - Session-local list of selected products and quantities
  - Quantity Calculator - Explicit quantities or length × width × height
  - API Client - Catalog fetch/edit, "save all" and bill download

## REST API Endpoints

- `GET /products?facility=` - Lists the catalog, optionally for one facility
- `POST /products` - Creates a product
- `PUT /products/{id}` - Updates a product's fields
- `POST /bill/download` - Returns the invoice as an `.xlsx` attachment
- `GET /health` - Liveness check

## Modules

- **numeric**: Lenient parsing of numbers sent by web forms
- **quantity**: Effective quantity from explicit or dimensional inputs
- **product**: Product records and their create/update payloads
- **catalog**: Catalog store trait, file-backed implementation, lookup fallback
- **bill**: Bill aggregation and totals
- **cart**: Client-side cart state
- **config**: Environment-driven server settings
- **downloader**: XLSX rendering of a bill (feature `web`)
- **error**: HTTP error mapping (feature `web`)
- **app**: Routing and handlers (feature `web`)
- **client**: HTTP client for the API (feature `web`)
*/

pub mod app;
pub mod bill;
pub mod cart;
pub mod catalog;
pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod numeric;
pub mod product;
pub mod quantity;

/// Re-export the commonly used types at the crate root
pub use bill::{Bill, BillError, BillItem, BillLineRequest, BillMeta, generate_bill};
pub use cart::{Cart, CartLine};
pub use catalog::{CatalogError, CatalogStore, ProductCatalog, resolve_product};
pub use product::{NewProduct, Product, ProductPatch};
pub use quantity::{QuantityInput, calculate_qty};
