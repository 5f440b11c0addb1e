use serde::{Serialize, Serializer};

use catalog_core::ValueObject;

/// Marker shown when the price per kg cannot be worked out.
pub const UNKNOWN_MARKER: &str = "—";

/// Price per kilogram of a product.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PricePerKg {
    Known(f64),
    /// Weight or price is missing (zero).
    Unknown,
}

impl PricePerKg {
    pub fn compute(price: f64, weight: f64) -> Self {
        if weight > 0.0 && price > 0.0 {
            PricePerKg::Known(price / weight)
        } else {
            PricePerKg::Unknown
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            PricePerKg::Known(v) => Some(v),
            PricePerKg::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, PricePerKg::Known(_))
    }
}

impl ValueObject for PricePerKg {}

impl core::fmt::Display for PricePerKg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PricePerKg::Known(v) => write!(f, "{v}"),
            PricePerKg::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

// Listings want a number or the marker, not a tagged enum.
impl Serialize for PricePerKg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PricePerKg::Known(v) => serializer.serialize_f64(*v),
            PricePerKg::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}
