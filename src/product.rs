use serde::{Deserialize, Serialize};

use crate::numeric::{lenient, lenient_opt, present};

/// A purchasable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identity assigned by the catalog
    pub id: String,

    /// Business key shown to users; not necessarily equal to `id`
    pub item_code: String,

    #[serde(default)]
    pub description: String,

    /// Unit label such as "kg", "pcs" or "sqft"
    #[serde(default)]
    pub unit: String,

    #[serde(default, deserialize_with = "lenient")]
    pub price: f64,

    /// Optional location tag used to filter the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
}

/// Payload for creating a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub item_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
}

/// Partial update; only the fields that are present change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt")]
    pub price: Option<f64>,
    /// `Some(None)` (an explicit `null`) removes the facility tag
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub facility: Option<Option<String>>,
}

impl Product {
    pub fn from_new(id: impl Into<String>, new: NewProduct) -> Self {
        Self {
            id: id.into(),
            item_code: new.item_code,
            description: new.description,
            unit: new.unit,
            price: new.price,
            facility: new.facility,
        }
    }

    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(item_code) = patch.item_code {
            self.item_code = item_code;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(facility) = patch.facility {
            self.facility = facility;
        }
    }

    /// The editable fields of this product, as sent by the admin screen
    pub fn to_patch(&self) -> ProductPatch {
        ProductPatch {
            item_code: Some(self.item_code.clone()),
            description: Some(self.description.clone()),
            unit: Some(self.unit.clone()),
            price: Some(self.price),
            facility: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_case_wire_names() {
        let p = Product {
            id: "p1".to_string(),
            item_code: "CEM-50".to_string(),
            description: "Cement 50kg".to_string(),
            unit: "bag".to_string(),
            price: 380.0,
            facility: None,
        };
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["itemCode"], "CEM-50");
        assert!(value.get("facility").is_none());
    }

    #[test]
    fn new_product_accepts_string_price() {
        let new: NewProduct =
            serde_json::from_value(json!({ "itemCode": "SND", "price": "42.5" })).unwrap();
        assert_eq!(new.price, 42.5);
        assert_eq!(new.description, "");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut p = Product::from_new(
            "p1",
            NewProduct {
                item_code: "TMT-8".to_string(),
                description: "TMT bar 8mm".to_string(),
                unit: "kg".to_string(),
                price: 64.0,
                facility: Some("north".to_string()),
            },
        );
        let patch: ProductPatch = serde_json::from_value(json!({ "price": "66" })).unwrap();
        p.apply(patch);

        assert_eq!(p.price, 66.0);
        assert_eq!(p.item_code, "TMT-8");
        assert_eq!(p.facility.as_deref(), Some("north"));
    }

    #[test]
    fn null_facility_clears_tag() {
        let mut p = Product::from_new(
            "p1",
            NewProduct {
                item_code: "SAND".to_string(),
                facility: Some("south".to_string()),
                ..Default::default()
            },
        );

        let patch: ProductPatch = serde_json::from_value(json!({ "facility": "east" })).unwrap();
        p.apply(patch);
        assert_eq!(p.facility.as_deref(), Some("east"));

        let patch: ProductPatch = serde_json::from_value(json!({ "facility": null })).unwrap();
        assert_eq!(patch.facility, Some(None));
        p.apply(patch);
        assert_eq!(p.facility, None);
    }
}
