use serde::Serialize;

use crate::bill::BillLineRequest;
use crate::numeric::NumberLike;
use crate::product::Product;
use crate::quantity::{QuantityInput, calculate_qty};

/// A product placed in the cart, with a snapshot of its catalog fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub item_code: String,
    pub description: String,
    pub unit: String,
    pub price: f64,
    pub quantity: u32,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            item_code: product.item_code.clone(),
            description: product.description.clone(),
            unit: product.unit.clone(),
            price: product.price,
            quantity: 1,
            length: None,
            width: None,
            height: None,
        }
    }

    pub fn total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Quantity sent to the bill, derived with [`calculate_qty`]
    pub fn effective_quantity(&self) -> f64 {
        calculate_qty(&QuantityInput {
            qty: Some(NumberLike::from(f64::from(self.quantity))),
            length: self.length.map(NumberLike::from),
            width: self.width.map(NumberLike::from),
            height: self.height.map(NumberLike::from),
            coefficient: None,
        })
    }
}

/// Client-side cart for one session
///
/// Indexes passed to the mutating methods refer to [`Cart::lines`];
/// out-of-range indexes are ignored.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`, merging with an existing line of the same item code
    pub fn add_product(&mut self, product: &Product) {
        match self
            .lines
            .iter_mut()
            .find(|line| line.item_code == product.item_code)
        {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine::from_product(product)),
        }
    }

    /// Add the catalog product with this item code; `false` if there is none
    pub fn add_by_item_code(&mut self, catalog: &[Product], item_code: &str) -> bool {
        if item_code.is_empty() {
            return false;
        }
        match catalog.iter().find(|p| p.item_code == item_code) {
            Some(product) => {
                self.add_product(product);
                true
            }
            None => false,
        }
    }

    /// Set a line's quantity; anything below 1 becomes 1
    pub fn set_quantity(&mut self, index: usize, quantity: i64) {
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity.clamp(1, i64::from(u32::MAX)) as u32;
        }
    }

    pub fn increment(&mut self, index: usize) {
        if let Some(line) = self.lines.get(index) {
            let next = i64::from(line.quantity) + 1;
            self.set_quantity(index, next);
        }
    }

    pub fn decrement(&mut self, index: usize) {
        if let Some(line) = self.lines.get(index) {
            let next = i64::from(line.quantity) - 1;
            self.set_quantity(index, next);
        }
    }

    pub fn set_dimensions(
        &mut self,
        index: usize,
        length: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) {
        if let Some(line) = self.lines.get_mut(index) {
            line.length = length;
            line.width = width;
            line.height = height;
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    pub fn line_total(&self, index: usize) -> Option<f64> {
        self.lines.get(index).map(CartLine::total)
    }

    pub fn grand_total(&self) -> f64 {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// The request lines sent to the bill endpoint
    pub fn bill_lines(&self) -> Vec<BillLineRequest> {
        self.lines
            .iter()
            .map(|line| {
                let key = if line.item_code.is_empty() {
                    &line.id
                } else {
                    &line.item_code
                };
                BillLineRequest::for_item(key.clone(), line.effective_quantity())
            })
            .collect()
    }
}
