use serde::{Deserialize, Serialize};

use crate::numeric::NumberLike;

/// Inputs to the quantity calculation
///
/// Every field is optional; a cart line either carries an explicit `qty` or
/// the dimensions of a piece that is sold by area or volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<NumberLike>,
}

/// Derive the effective quantity of a line
///
/// An explicit positive `qty` wins. Otherwise the result is
/// `length * width * height * coefficient`, where a missing value counts as
/// 1 and a present one is coerced as-is (so `width = 0` gives 0). When
/// neither `length` nor `width` is set the quantity cannot be determined and
/// 0 is returned.
///
/// # Examples
/// ```
/// use cart::numeric::NumberLike;
/// use cart::quantity::{QuantityInput, calculate_qty};
///
/// let input = QuantityInput {
///     length: Some(NumberLike::from(2.0)),
///     width: Some(NumberLike::from(3.0)),
///     ..Default::default()
/// };
/// assert_eq!(calculate_qty(&input), 6.0);
/// ```
pub fn calculate_qty(input: &QuantityInput) -> f64 {
    if let Some(qty) = input.qty.as_ref().filter(|q| q.is_truthy()) {
        let qty = qty.coerce();
        if qty > 0.0 {
            return qty;
        }
    }

    let unset = |v: &Option<NumberLike>| !v.as_ref().is_some_and(NumberLike::is_truthy);
    if unset(&input.length) && unset(&input.width) {
        return 0.0;
    }

    // Invalid strings coerce to 0 rather than the missing-value default of 1
    let dimension = |v: &Option<NumberLike>| v.as_ref().map_or(1.0, NumberLike::coerce);

    dimension(&input.length)
        * dimension(&input.width)
        * dimension(&input.height)
        * dimension(&input.coefficient)
}
