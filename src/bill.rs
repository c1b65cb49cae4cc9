use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, CatalogStore, resolve_product};
use crate::numeric::{NumberLike, lenient_key, present};

pub const DEFAULT_SHOP_NAME: &str = "Construction Cart";

#[derive(Error, Debug)]
pub enum BillError {
    #[error("Items required")]
    ItemsRequired,

    #[error("No valid items found for bill")]
    NoValidItems,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One requested line of a bill
///
/// A line either names a catalog product (`itemCode` or `id`) or describes
/// itself completely with `description`, `unit` and `price`. For those three
/// fields an explicit `null` still counts as sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLineRequest {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_key")]
    pub item_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_key")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub unit: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub price: Option<Option<NumberLike>>,
}

impl BillLineRequest {
    pub fn for_item(item_code: impl Into<String>, qty: f64) -> Self {
        Self {
            item_code: Some(item_code.into()),
            qty: Some(NumberLike::from(qty)),
            ..Default::default()
        }
    }

    pub fn is_self_described(&self) -> bool {
        self.description.is_some() || self.price.is_some() || self.unit.is_some()
    }

    /// `itemCode`, falling back to `id`; empty strings count as missing
    pub fn lookup_key(&self) -> Option<&str> {
        fn non_empty(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|s| !s.is_empty())
        }
        non_empty(&self.item_code).or_else(|| non_empty(&self.id))
    }

    /// `qty`, falling back to `quantity`; unusable values are 0
    pub fn requested_quantity(&self) -> f64 {
        self.qty
            .as_ref()
            .or(self.quantity.as_ref())
            .map_or(0.0, NumberLike::coerce)
    }
}

/// Optional invoice metadata supplied by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Metadata with every default applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillHeader {
    pub shop_name: String,
    pub invoice_no: String,
    pub customer: String,
    pub date: String,
}

impl BillHeader {
    /// Fill in missing metadata; empty strings are treated as missing
    pub fn resolve(meta: BillMeta, default_shop_name: &str) -> Self {
        let present = |s: Option<String>| s.filter(|s| !s.is_empty());
        Self {
            shop_name: present(meta.shop_name).unwrap_or_else(|| default_shop_name.to_string()),
            invoice_no: meta.invoice_no.unwrap_or_default(),
            customer: meta.customer.unwrap_or_default(),
            date: present(meta.date)
                .unwrap_or_else(|| chrono::Local::now().format("%d/%m/%Y").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub item_code: String,
    pub description: String,
    pub unit: String,
    pub price: f64,
    pub quantity: f64,
    pub total: f64,
}

impl BillItem {
    pub fn new(
        item_code: String,
        description: String,
        unit: String,
        price: f64,
        quantity: f64,
    ) -> Self {
        Self {
            item_code,
            description,
            unit,
            price,
            quantity,
            total: price * quantity,
        }
    }
}

/// A generated invoice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub header: BillHeader,
    items: Vec<BillItem>,
    grand_total: f64,
}

impl Bill {
    pub fn new(header: BillHeader, items: Vec<BillItem>) -> Self {
        let grand_total = items.iter().map(|item| item.total).sum();
        Self {
            header,
            items,
            grand_total,
        }
    }

    pub fn items(&self) -> &[BillItem] {
        &self.items
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }
}

/// Turn requested lines into a bill
///
/// Lines are processed in order. Self-described lines are priced from their
/// own fields; all others are resolved against the catalog and silently
/// dropped when no product matches.
///
/// # Errors
/// * [`BillError::ItemsRequired`] if `lines` is empty
/// * [`BillError::NoValidItems`] if every line was dropped
/// * [`BillError::Catalog`] if a lookup fails
pub fn generate_bill<S>(
    store: &S,
    lines: &[BillLineRequest],
    meta: BillMeta,
    default_shop_name: &str,
) -> Result<Bill, BillError>
where
    S: CatalogStore + ?Sized,
{
    if lines.is_empty() {
        return Err(BillError::ItemsRequired);
    }

    let mut items = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let quantity = line.requested_quantity();

        if line.is_self_described() {
            items.push(BillItem::new(
                line.lookup_key().unwrap_or_default().to_string(),
                line.description.clone().flatten().unwrap_or_default(),
                line.unit.clone().flatten().unwrap_or_default(),
                line.price.as_ref().and_then(Option::as_ref).map_or(0.0, NumberLike::coerce),
                quantity,
            ));
            continue;
        }

        let Some(key) = line.lookup_key() else {
            debug!("Skipping bill line {index}: no item code or id");
            continue;
        };

        let Some(product) = resolve_product(store, key)? else {
            debug!("Skipping bill line {index}: product {key} not found");
            continue;
        };

        let item_code = if product.item_code.is_empty() {
            product.id
        } else {
            product.item_code
        };

        items.push(BillItem::new(
            item_code,
            product.description,
            product.unit,
            product.price,
            quantity,
        ));
    }

    if items.is_empty() {
        return Err(BillError::NoValidItems);
    }

    Ok(Bill::new(BillHeader::resolve(meta, default_shop_name), items))
}
