use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, info};
use thiserror::Error;
use uuid::Uuid;

use crate::product::{NewProduct, Product, ProductPatch};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog data is corrupt: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Catalog lock poisoned")]
    Poisoned,
}

/// Persistent collection of products
///
/// There is intentionally no delete operation.
pub trait CatalogStore: Send + Sync {
    /// All products, optionally restricted to one facility tag
    fn list(&self, facility: Option<&str>) -> Result<Vec<Product>, CatalogError>;

    /// Look a product up by its identity
    fn get(&self, id: &str) -> Result<Option<Product>, CatalogError>;

    /// Look a product up by its business key
    fn find_by_item_code(&self, item_code: &str) -> Result<Option<Product>, CatalogError>;

    fn create(&self, new: NewProduct) -> Result<Product, CatalogError>;

    /// Apply a partial update; `None` when no product has this id
    fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, CatalogError>;
}

/// Resolve a line's lookup key to a product
///
/// The key is tried as an identity first and as a business key second.
pub fn resolve_product<S>(store: &S, key: &str) -> Result<Option<Product>, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    if let Some(product) = store.get(key)? {
        return Ok(Some(product));
    }
    store.find_by_item_code(key)
}

/// Product list held in memory, optionally mirrored to a JSON file
///
/// When backed by a file, the whole list is rewritten after every
/// mutation.
pub struct ProductCatalog {
    products: RwLock<Vec<Product>>,
    path: Option<PathBuf>,
}

impl ProductCatalog {
    pub fn in_memory() -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Open (or initialise) a catalog file
    ///
    /// Creates the parent directory and an empty `[]` file if they do not
    /// exist yet.
    ///
    /// # Errors
    /// * Returns an error if the file cannot be created, read or parsed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                create_dir_all(dir)?;
            }
        }
        if !path.exists() {
            fs::write(&path, b"[]")?;
        }

        let contents = fs::read_to_string(&path)?;
        let products: Vec<Product> = serde_json::from_str(&contents)?;
        info!("Loaded {} products from {}", products.len(), path.display());

        Ok(Self {
            products: RwLock::new(products),
            path: Some(path),
        })
    }

    fn persist(&self, products: &[Product]) -> Result<(), CatalogError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(products)?;
            fs::write(path, json)?;
        }
        Ok(())
    }
}

impl CatalogStore for ProductCatalog {
    fn list(&self, facility: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().map_err(|_| CatalogError::Poisoned)?;

        Ok(products
            .iter()
            .filter(|p| facility.is_none_or(|f| p.facility.as_deref() == Some(f)))
            .cloned()
            .collect())
    }

    fn get(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        let products = self.products.read().map_err(|_| CatalogError::Poisoned)?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    fn find_by_item_code(&self, item_code: &str) -> Result<Option<Product>, CatalogError> {
        let products = self.products.read().map_err(|_| CatalogError::Poisoned)?;
        Ok(products.iter().find(|p| p.item_code == item_code).cloned())
    }

    fn create(&self, new: NewProduct) -> Result<Product, CatalogError> {
        let mut products = self.products.write().map_err(|_| CatalogError::Poisoned)?;

        let product = Product::from_new(Uuid::new_v4().to_string(), new);
        products.push(product.clone());

        if let Err(e) = self.persist(&products) {
            products.pop();
            return Err(e);
        }

        debug!("Created product {} ({})", product.id, product.item_code);
        Ok(product)
    }

    fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, CatalogError> {
        let mut products = self.products.write().map_err(|_| CatalogError::Poisoned)?;

        let Some(index) = products.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        let previous = products[index].clone();
        products[index].apply(patch);

        if let Err(e) = self.persist(&products) {
            products[index] = previous;
            return Err(e);
        }

        debug!("Updated product {}", id);
        Ok(Some(products[index].clone()))
    }
}
