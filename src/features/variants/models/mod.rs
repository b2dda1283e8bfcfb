mod variant_key;

pub use variant_key::{AxisSnapshot, AxisValue, SelectionSnapshot, VariantKey};
