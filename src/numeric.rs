use serde::{Deserialize, Deserializer, Serialize};

/// A loosely typed numeric value as it arrives from a JSON form
///
/// Browser forms send numbers as JSON numbers, numeric strings (`"12.5"`) or
/// occasionally booleans. All three are accepted and coerced on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl NumberLike {
    /// Coerce to `f64`
    ///
    /// Empty or unparseable strings and NaN become `0.0`; booleans become
    /// `1.0` / `0.0`.
    pub fn coerce(&self) -> f64 {
        match self {
            NumberLike::Number(n) if n.is_nan() => 0.0,
            NumberLike::Number(n) => *n,
            NumberLike::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()).unwrap_or(0.0),
            NumberLike::Flag(true) => 1.0,
            NumberLike::Flag(false) => 0.0,
        }
    }

    /// Whether the raw value counts as "set"
    ///
    /// Zero, NaN, the empty string and `false` are unset. Note that the
    /// string `"0"` is set even though it coerces to zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            NumberLike::Number(n) => *n != 0.0 && !n.is_nan(),
            NumberLike::Text(s) => !s.is_empty(),
            NumberLike::Flag(b) => *b,
        }
    }
}

impl From<f64> for NumberLike {
    fn from(value: f64) -> Self {
        NumberLike::Number(value)
    }
}

impl From<&str> for NumberLike {
    fn from(value: &str) -> Self {
        NumberLike::Text(value.to_string())
    }
}

/// Deserialize any [`NumberLike`] into an `f64`; null becomes `0.0`
pub fn lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberLike>::deserialize(deserializer)?
        .map(|n| n.coerce())
        .unwrap_or(0.0))
}

/// Deserialize any [`NumberLike`] into an `Option<f64>`; null stays `None`
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberLike>::deserialize(deserializer)?.map(|n| n.coerce()))
}

/// Deserialize a field while remembering that it was sent
///
/// Use with `#[serde(default)]` on an `Option<Option<T>>`: a missing field is
/// `None`, an explicit `null` is `Some(None)`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize a business key that may arrive as a string or a number
///
/// Numbers keep their JSON spelling, so `1001` becomes `"1001"`. Booleans
/// never name a product and are dropped.
pub fn lenient_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberLike>::deserialize(deserializer)? {
        Some(NumberLike::Text(s)) => Some(s),
        Some(NumberLike::Number(n)) => Some(n.to_string()),
        Some(NumberLike::Flag(_)) | None => None,
    })
}
